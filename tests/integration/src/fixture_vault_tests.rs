//! Integration tests against the `garden` fixture vault
//!
//! The fixture exercises the whole filtering stack at once: a published root
//! folder, the default excalidraw exclusion plus a custom pattern, a
//! `publish: false` draft, hidden directories and files outside the root.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vault_core::{LocalVault, ProgressReporter, Publisher, StatusSource, Vault, VaultFile};
use vault_fs::NormalizedPath;
use vault_meta::{PublishSettings, SettingsLoader};
use vault_test_utils::{FakeSiteApi, Method};

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/vaults/garden")
}

fn fixture_settings() -> PublishSettings {
    let global = TempDir::new().unwrap();
    let mut settings = SettingsLoader::with_global_config_dir(
        NormalizedPath::new(fixture_root()),
        global.path().to_path_buf(),
    )
    .resolve()
    .unwrap();
    settings.access_token = "fs_pat_fixture".into();
    settings
}

fn publisher(api: &Arc<FakeSiteApi>) -> (Arc<LocalVault>, Publisher) {
    let vault = Arc::new(LocalVault::open(fixture_root()).unwrap());
    let publisher = Publisher::new(
        fixture_settings(),
        vault.clone(),
        api.clone(),
        ProgressReporter::new(),
    )
    .unwrap()
    .with_linger(Duration::ZERO);
    (vault, publisher)
}

async fn file(vault: &LocalVault, path: &str) -> VaultFile {
    vault
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("fixture is missing {path}"))
}

#[test]
fn test_fixture_settings() {
    let settings = fixture_settings();
    assert_eq!(settings.site_name, "garden");
    assert_eq!(settings.root_dir, "site");
    assert_eq!(settings.upload_concurrency, 2);
    assert_eq!(settings.exclude_patterns.len(), 2);
}

#[tokio::test]
async fn test_publishable_files_apply_every_filter() {
    let api = Arc::new(FakeSiteApi::new("gardener"));
    let (_, publisher) = publisher(&api);

    let paths: Vec<String> = publisher
        .publishable_files()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();

    assert_eq!(
        paths,
        vec![
            "site/assets/banner.png",
            "site/assets/compost bin.svg",
            "site/assets/garden-map.svg",
            "site/assets/seed-tray.svg",
            "site/index.md",
            "site/notes/compost.md",
            "site/notes/seeds.md",
        ]
    );
}

#[tokio::test]
async fn test_index_publishes_with_embed_and_cover_image() {
    let api = Arc::new(FakeSiteApi::new("gardener"));
    let (vault, publisher) = publisher(&api);

    let index = file(&vault, "site/index.md").await;
    let outcome = publisher
        .publish_single_note_with_embeds(&index, true)
        .await
        .unwrap();

    assert_eq!(outcome.files_published, 3);
    assert_eq!(outcome.site_url, "https://sites.test/@gardener/garden");
    assert_eq!(
        api.uploaded_paths(),
        vec!["assets/banner.png", "assets/garden-map.svg", "index.md"]
    );
}

#[tokio::test]
async fn test_fenced_and_excluded_embeds_are_skipped() {
    let api = Arc::new(FakeSiteApi::new("gardener").with_site("garden"));
    let (vault, publisher) = publisher(&api);

    let seeds = file(&vault, "site/notes/seeds.md").await;
    publisher
        .publish_single_note_with_embeds(&seeds, true)
        .await
        .unwrap();

    assert_eq!(
        api.uploaded_paths(),
        vec!["assets/seed-tray.svg", "notes/seeds.md"]
    );
}

#[tokio::test]
async fn test_relative_markdown_embed_with_encoded_space() {
    let api = Arc::new(FakeSiteApi::new("gardener").with_site("garden"));
    let (vault, publisher) = publisher(&api);

    let compost = file(&vault, "site/notes/compost.md").await;
    publisher
        .publish_single_note_with_embeds(&compost, true)
        .await
        .unwrap();

    assert_eq!(
        api.uploaded_paths(),
        vec!["assets/compost bin.svg", "notes/compost.md"]
    );
}

#[tokio::test]
async fn test_full_publish_then_clean_status() {
    let api = Arc::new(FakeSiteApi::new("gardener"));
    let (_, publisher) = publisher(&api);

    let before = publisher.get_publish_status().await;
    assert_eq!(before.source, StatusSource::NoSite);
    assert_eq!(before.new_files.len(), 7);

    let outcome = publisher.publish_all().await.unwrap().unwrap();
    assert_eq!(outcome.files_published, 7);
    assert_eq!(api.calls_to(Method::CreateSite), 1);
    assert!(
        api.stored_paths("garden")
            .iter()
            .all(|path| !path.starts_with("site/"))
    );

    let after = publisher.get_publish_status().await;
    assert_eq!(after.source, StatusSource::Remote);
    assert_eq!(after.unchanged.len(), 7);
    assert!(!after.has_differences());
}
