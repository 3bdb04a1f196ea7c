//! The remote site capability

use async_trait::async_trait;

use crate::Result;
use crate::types::{DeleteResponse, FileRecord, Site, SyncResponse, UploadDirective, UserInfo};

/// Operations the reconciliation engine needs from the remote.
///
/// Each method is a single logical round-trip. Implementations decide their
/// own retry behavior for mutations.
#[async_trait]
pub trait SiteApi: Send + Sync {
    /// Identity of the token owner. Fails with `Auth` when the token is rejected.
    async fn get_user_info(&self) -> Result<UserInfo>;

    /// Look up a site by owner and name; `None` when it does not exist.
    async fn get_site_by_name(&self, owner: &str, name: &str) -> Result<Option<Site>>;

    async fn create_site(&self, name: &str) -> Result<Site>;

    /// Diff `files` against the stored site state.
    ///
    /// With `dry_run` the server must not change anything.
    async fn sync_files(
        &self,
        site_id: &str,
        files: &[FileRecord],
        dry_run: bool,
    ) -> Result<SyncResponse>;

    /// Register exactly `files` for publishing and get upload directives for
    /// those whose bytes the server does not already have.
    async fn publish_files(&self, site_id: &str, files: &[FileRecord])
    -> Result<Vec<UploadDirective>>;

    async fn delete_files(&self, site_id: &str, paths: &[String]) -> Result<DeleteResponse>;

    /// PUT raw bytes to a pre-signed storage URL.
    async fn upload_to_storage(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;
}
