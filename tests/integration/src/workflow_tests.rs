//! Multi-step publishing workflows on a vault that changes between runs

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use vault_core::{ProgressPhase, ProgressReporter, PublishStatus, Publisher, Vault, VaultFile};
use vault_meta::PublishSettings;
use vault_test_utils::{FakeSiteApi, Method, TestVault};

fn publisher(vault: &TestVault, api: &Arc<FakeSiteApi>) -> Publisher {
    Publisher::new(
        PublishSettings::new("fs_pat_workflow", "notes"),
        Arc::new(vault.open()),
        api.clone(),
        ProgressReporter::new(),
    )
    .unwrap()
    .with_linger(Duration::ZERO)
}

fn paths(files: &[VaultFile]) -> Vec<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

fn summary(status: &PublishStatus) -> (usize, usize, usize, usize) {
    (
        status.unchanged.len(),
        status.changed.len(),
        status.new_files.len(),
        status.deleted.len(),
    )
}

#[tokio::test]
async fn test_edit_delete_and_unpublish_cycle() {
    let vault = TestVault::new()
        .write("a.md", "# A\n")
        .write("b.md", "# B\n")
        .write("c.md", "# C\n");
    let api = Arc::new(FakeSiteApi::new("writer"));
    let publisher = publisher(&vault, &api);

    publisher.publish_all().await.unwrap().unwrap();
    assert_eq!(summary(&publisher.get_publish_status().await), (3, 0, 0, 0));

    // Edit one note, remove another, opt a third out of publishing
    fs::write(vault.path("a.md"), "# A, revised\n").unwrap();
    fs::remove_file(vault.path("b.md")).unwrap();
    fs::write(vault.path("c.md"), "---\npublish: false\n---\n# C\n").unwrap();
    fs::write(vault.path("d.md"), "# D\n").unwrap();

    let status = publisher.get_publish_status().await;
    assert_eq!(paths(&status.changed), vec!["a.md"]);
    assert_eq!(paths(&status.new_files), vec!["d.md"]);
    assert_eq!(status.deleted, vec!["b.md", "c.md"]);

    let outcome = publisher.publish_all().await.unwrap().unwrap();
    assert_eq!(outcome.files_published, 4);
    assert_eq!(api.stored_paths("notes"), vec!["a.md", "d.md"]);

    assert_eq!(publisher.publish_all().await.unwrap(), None);
}

#[tokio::test]
async fn test_failed_upload_is_repaired_by_next_run() {
    let vault = TestVault::new()
        .write("a.md", "# A\n")
        .write("b.md", "# B\n");
    let api = Arc::new(FakeSiteApi::new("writer"));
    api.fail_next(Method::UploadToStorage, FakeSiteApi::storage_error(503));
    let publisher = publisher(&vault, &api);

    let first = publisher.publish_all().await.unwrap().unwrap();
    assert_eq!(first.failed_uploads.len(), 1);
    assert_eq!(first.files_published, 1);
    assert_eq!(
        publisher.progress().snapshot().phase,
        ProgressPhase::Idle
    );

    let status = publisher.get_publish_status().await;
    assert_eq!(summary(&status), (1, 0, 1, 0));

    let second = publisher.publish_all().await.unwrap().unwrap();
    assert!(second.failed_uploads.is_empty());
    assert_eq!(api.stored_paths("notes"), vec!["a.md", "b.md"]);
}

#[tokio::test]
async fn test_single_note_then_status_sees_rest_as_new() {
    let vault = TestVault::new()
        .write("post.md", "![[chart.svg]]\n")
        .write("chart.svg", "<svg/>")
        .write("other.md", "# Other\n");
    let api = Arc::new(FakeSiteApi::new("writer"));
    let publisher = publisher(&vault, &api);

    let post = vault
        .open()
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .find(|f| f.path == "post.md")
        .unwrap();
    publisher
        .publish_single_note_with_embeds(&post, true)
        .await
        .unwrap();

    let status = publisher.get_publish_status().await;
    assert_eq!(paths(&status.unchanged), vec!["chart.svg", "post.md"]);
    assert_eq!(paths(&status.new_files), vec!["other.md"]);
}
