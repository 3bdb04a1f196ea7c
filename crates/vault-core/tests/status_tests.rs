//! Tests for publish status and publish-everything

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vault_client::SyncResponse;
use vault_core::{
    Error, ProgressReporter, PublishStatus, Publisher, StatusSource, VaultFile, classify,
};
use vault_meta::PublishSettings;
use vault_test_utils::{ApiCall, FakeSiteApi, MemoryVault, Method};

fn publisher(settings: PublishSettings, vault: &MemoryVault, api: &Arc<FakeSiteApi>) -> Publisher {
    Publisher::new(
        settings,
        Arc::new(vault.clone()),
        api.clone(),
        ProgressReporter::new(),
    )
    .expect("valid settings")
    .with_linger(Duration::ZERO)
}

fn settings() -> PublishSettings {
    PublishSettings::new("fs_pat_test_token", "garden")
}

fn paths(files: &[VaultFile]) -> Vec<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

/// A vault with one file in each status bucket against `garden`.
fn diverged() -> (MemoryVault, Arc<FakeSiteApi>) {
    let vault = MemoryVault::new()
        .with_text("same.md", "same")
        .with_text("edited.md", "new text")
        .with_text("fresh.md", "fresh")
        .with_text("draft.md", "---\npublish: false\n---\n")
        .with_text("board.excalidraw.md", "{}");
    let api = Arc::new(
        FakeSiteApi::new("alice")
            .with_site("garden")
            .with_remote_file("garden", "same.md", b"same")
            .with_remote_file("garden", "edited.md", b"old text")
            .with_remote_file("garden", "gone.md", b"gone"),
    );
    (vault, api)
}

mod status {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_status_partitions_publishable_files() {
        let (vault, api) = diverged();
        let publisher = publisher(settings(), &vault, &api);

        let status = publisher.get_publish_status().await;

        assert_eq!(status.source, StatusSource::Remote);
        assert_eq!(paths(&status.unchanged), vec!["same.md"]);
        assert_eq!(paths(&status.changed), vec!["edited.md"]);
        assert_eq!(paths(&status.new_files), vec!["fresh.md"]);
        assert_eq!(status.deleted, vec!["gone.md"]);
        assert_eq!(status.local_count(), 3);
    }

    #[tokio::test]
    async fn test_status_is_a_dry_run() {
        let (vault, api) = diverged();
        let publisher = publisher(settings(), &vault, &api);

        publisher.get_publish_status().await;

        let syncs: Vec<ApiCall> = api
            .calls()
            .into_iter()
            .filter(|call| call.method() == Method::SyncFiles)
            .collect();
        assert_eq!(syncs.len(), 1);
        assert!(matches!(&syncs[0], ApiCall::SyncFiles { dry_run: true, .. }));
        assert_eq!(api.calls_to(Method::PublishFiles), 0);
        assert_eq!(
            api.stored_paths("garden"),
            vec!["edited.md", "gone.md", "same.md"]
        );
    }

    #[tokio::test]
    async fn test_missing_site_reports_everything_new_without_creating_it() {
        let vault = MemoryVault::new()
            .with_text("a.md", "a")
            .with_text("b.md", "b");
        let api = Arc::new(FakeSiteApi::new("alice"));
        let publisher = publisher(settings(), &vault, &api);

        let status = publisher.get_publish_status().await;

        assert_eq!(status.source, StatusSource::NoSite);
        assert_eq!(paths(&status.new_files), vec!["a.md", "b.md"]);
        assert_eq!(api.calls_to(Method::CreateSite), 0);
        assert_eq!(api.calls_to(Method::SyncFiles), 0);
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails_open() {
        let (vault, api) = diverged();
        api.fail_always(Method::SyncFiles, FakeSiteApi::network_error());
        let publisher = publisher(settings(), &vault, &api);

        let status = publisher.get_publish_status().await;

        assert_eq!(status.source, StatusSource::Unreachable);
        assert_eq!(
            paths(&status.new_files),
            vec!["edited.md", "fresh.md", "same.md"]
        );
        assert!(status.unchanged.is_empty());
        assert!(status.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_status_respects_root_dir() {
        let vault = MemoryVault::new()
            .with_text("blog/post.md", "post")
            .with_text("private/diary.md", "diary");
        let api = Arc::new(
            FakeSiteApi::new("alice")
                .with_site("garden")
                .with_remote_file("garden", "post.md", b"post"),
        );
        let publisher = publisher(settings().with_root_dir("blog"), &vault, &api);

        let status = publisher.get_publish_status().await;

        assert_eq!(paths(&status.unchanged), vec!["blog/post.md"]);
        assert!(status.new_files.is_empty());
        assert!(!status.has_differences());
    }

    #[tokio::test]
    async fn test_username_is_fetched_once() {
        let (vault, api) = diverged();
        let publisher = publisher(settings(), &vault, &api);

        publisher.get_publish_status().await;
        publisher.get_publish_status().await;

        assert_eq!(api.calls_to(Method::GetUserInfo), 1);
        assert_eq!(api.calls_to(Method::GetSiteByName), 1);
    }
}

mod publish_all {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_publish_all_reconciles_then_reports_up_to_date() {
        let (vault, api) = diverged();
        let publisher = publisher(settings(), &vault, &api);

        let outcome = publisher.publish_all().await.unwrap().expect("differences");

        assert_eq!(outcome.files_published, 3);
        assert!(outcome.failed_uploads.is_empty());
        assert_eq!(api.uploaded_paths(), vec!["edited.md", "fresh.md"]);
        assert_eq!(
            api.stored_paths("garden"),
            vec!["edited.md", "fresh.md", "same.md"]
        );

        assert_eq!(publisher.publish_all().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publish_all_deletes_remote_only_site_paths_under_root() {
        let vault = MemoryVault::new().with_text("blog/x.md", "live");
        let api = Arc::new(
            FakeSiteApi::new("alice")
                .with_site("garden")
                .with_remote_file("garden", "x.md", b"live")
                .with_remote_file("garden", "blog/x.md", b"stale"),
        );
        let publisher = publisher(settings().with_root_dir("blog"), &vault, &api);

        let status = publisher.get_publish_status().await;
        assert_eq!(status.deleted, vec!["blog/x.md"]);

        let outcome = publisher.publish_all().await.unwrap().expect("differences");

        assert_eq!(outcome.files_published, 1);
        let deletes: Vec<ApiCall> = api
            .calls()
            .into_iter()
            .filter(|call| call.method() == Method::DeleteFiles)
            .collect();
        assert_eq!(
            deletes,
            vec![ApiCall::DeleteFiles {
                site_id: "site-1".into(),
                paths: vec!["blog/x.md".into()],
            }]
        );
        assert_eq!(api.stored_paths("garden"), vec!["x.md"]);
        assert_eq!(publisher.publish_all().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publish_all_creates_missing_site() {
        let vault = MemoryVault::new().with_text("index.md", "# Home\n");
        let api = Arc::new(FakeSiteApi::new("alice"));
        let publisher = publisher(settings(), &vault, &api);

        let outcome = publisher.publish_all().await.unwrap().expect("differences");

        assert_eq!(outcome.files_published, 1);
        assert_eq!(api.calls_to(Method::CreateSite), 1);
        assert_eq!(api.stored_paths("garden"), vec!["index.md"]);
    }

    #[tokio::test]
    async fn test_publish_all_refuses_when_remote_unreachable() {
        let (vault, api) = diverged();
        api.fail_next(Method::SyncFiles, FakeSiteApi::network_error());
        let publisher = publisher(settings(), &vault, &api);

        let err = publisher.publish_all().await.unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(api.calls_to(Method::PublishFiles), 0);
        assert_eq!(api.calls_to(Method::DeleteFiles), 0);
    }
}

fn path_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,2}\\.md"
}

proptest! {
    #[test]
    fn prop_classify_places_each_local_file_once(
        local in prop::collection::btree_set(path_strategy(), 0..8),
        unchanged in prop::collection::vec(path_strategy(), 0..6),
        to_update in prop::collection::vec(path_strategy(), 0..6),
        deleted in prop::collection::vec(path_strategy(), 0..6),
    ) {
        let pairs: Vec<(VaultFile, String)> = local
            .iter()
            .map(|p| (VaultFile::new(p.as_str(), 1), p.clone()))
            .collect();
        let response = SyncResponse {
            unchanged,
            to_update,
            deleted,
            ..Default::default()
        };

        let status: PublishStatus = classify(pairs, &response);

        prop_assert_eq!(status.local_count(), local.len());
        let mut placed = HashSet::new();
        for file in status.unchanged.iter().chain(&status.changed).chain(&status.new_files) {
            prop_assert!(placed.insert(file.path.clone()));
        }
        for file in &status.changed {
            prop_assert!(!response.unchanged.contains(&file.path));
        }
        for path in &status.deleted {
            prop_assert!(!local.contains(path));
        }
        let unique: HashSet<&String> = status.deleted.iter().collect();
        prop_assert_eq!(unique.len(), status.deleted.len());
    }
}
