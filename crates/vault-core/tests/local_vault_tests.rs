//! End-to-end publishing from a vault on disk

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use vault_core::{ProgressPhase, ProgressReporter, Publisher, StatusSource, Vault};
use vault_fs::NormalizedPath;
use vault_meta::SettingsLoader;
use vault_test_utils::{FakeSiteApi, Method, TestVault};

fn garden() -> TestVault {
    TestVault::new()
        .write_config("site_name = \"garden\"\nroot_dir = \"site\"\n")
        .write_local_token("fs_pat_disk_token")
        .write("site/index.md", "---\ntitle: Home\nimage: cover.png\n---\n![[diagram.svg]]\n")
        .write("site/media/diagram.svg", "<svg/>")
        .write_bytes("site/media/cover.png", &[0x89, 0x50, 0x4e, 0x47])
        .write("site/drafts/wip.md", "---\npublish: false\n---\n")
        .write("private/journal.md", "# Journal\n")
        .write(".obsidian/app.json", "{}")
}

fn publisher(vault: &TestVault, api: &Arc<FakeSiteApi>) -> Publisher {
    let settings = SettingsLoader::with_global_config_dir(
        NormalizedPath::new(vault.root()),
        vault.path("no-global"),
    )
    .resolve()
    .expect("settings resolve");

    Publisher::new(settings, Arc::new(vault.open()), api.clone(), ProgressReporter::new())
        .expect("valid settings")
        .with_linger(Duration::ZERO)
}

#[tokio::test]
async fn test_settings_and_listing_come_from_disk() {
    let vault = garden();
    let api = Arc::new(FakeSiteApi::new("alice"));
    let publisher = publisher(&vault, &api);

    assert_eq!(publisher.settings().site_name, "garden");
    assert_eq!(publisher.policy().root_dir(), "site");

    let listed: Vec<String> = vault
        .open()
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert!(listed.iter().all(|p| !p.starts_with('.')));
    assert!(listed.contains(&"private/journal.md".to_string()));

    let publishable: Vec<String> = publisher
        .publishable_files()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(
        publishable,
        vec!["site/index.md", "site/media/cover.png", "site/media/diagram.svg"]
    );
}

#[tokio::test]
async fn test_publish_all_from_disk() {
    let vault = garden();
    let api = Arc::new(FakeSiteApi::new("alice"));
    let publisher = publisher(&vault, &api);

    assert_eq!(publisher.get_publish_status().await.source, StatusSource::NoSite);

    let outcome = publisher.publish_all().await.unwrap().expect("differences");
    assert_eq!(outcome.files_published, 3);
    assert_eq!(
        api.stored_paths("garden"),
        vec!["index.md", "media/cover.png", "media/diagram.svg"]
    );
    assert_eq!(
        publisher.progress().snapshot().phase,
        ProgressPhase::Idle
    );

    let status = publisher.get_publish_status().await;
    assert_eq!(status.source, StatusSource::Remote);
    assert!(!status.has_differences());
}

#[tokio::test]
async fn test_single_note_pulls_embeds_from_disk() {
    let vault = garden();
    let api = Arc::new(FakeSiteApi::new("alice").with_site("garden"));
    let publisher = publisher(&vault, &api);

    let note = vault
        .open()
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .find(|f| f.path == "site/index.md")
        .unwrap();
    let outcome = publisher
        .publish_single_note_with_embeds(&note, true)
        .await
        .unwrap();

    assert_eq!(outcome.files_published, 3);
    assert_eq!(api.calls_to(Method::UploadToStorage), 3);
    let (_, svg) = api
        .uploads()
        .into_iter()
        .find(|(path, _)| path == "media/diagram.svg")
        .unwrap();
    assert_eq!(svg, b"<svg/>".to_vec());
}
