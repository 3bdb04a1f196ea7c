//! Status queries and publish-everything

use super::{BatchOutcome, BatchRequest, Publisher};
use crate::records;
use crate::status::{PublishStatus, StatusSource, classify};
use crate::vault::VaultFile;
use crate::{Error, Result};

impl Publisher {
    pub(super) async fn is_publish_disabled(&self, file: &VaultFile) -> bool {
        match self.vault.front_matter(&file.path).await {
            Ok(front_matter) => front_matter.is_some_and(|fm| fm.is_publish_disabled()),
            Err(e) => {
                tracing::warn!(path = %file.path, error = %e, "Could not read front matter, treating note as publishable");
                false
            }
        }
    }

    /// Vault files that pass the root scope, exclusion patterns and
    /// front-matter opt-out, in that order.
    pub async fn publishable_files(&self) -> Result<Vec<VaultFile>> {
        let files = self.vault.list_files().await?;
        let total = files.len();

        let mut kept = Vec::with_capacity(total);
        for file in files {
            if self.policy.should_skip(&file.path, false) {
                continue;
            }
            if file.is_markdown() && self.is_publish_disabled(&file).await {
                continue;
            }
            kept.push(file);
        }

        tracing::debug!(total, publishable = kept.len(), "Filtered vault files");
        Ok(kept)
    }

    /// Classify publishable files against the remote site.
    ///
    /// Never fails. When the site does not exist yet every file is new and no
    /// diff is requested. When the remote cannot be queried every file is
    /// reported as new with [`StatusSource::Unreachable`].
    pub async fn get_publish_status(&self) -> PublishStatus {
        let files = match self.publishable_files().await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "Could not enumerate vault files");
                return PublishStatus::all_new(Vec::new(), StatusSource::Unreachable);
            }
        };

        match self.diff_status(&files).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "Publish status unavailable, reporting all files as new");
                PublishStatus::all_new(files, StatusSource::Unreachable)
            }
        }
    }

    async fn diff_status(&self, files: &[VaultFile]) -> Result<PublishStatus> {
        let Some(site) = self.find_site().await? else {
            tracing::debug!(site = %self.settings.site_name, "Site does not exist yet");
            return Ok(PublishStatus::all_new(files.to_vec(), StatusSource::NoSite));
        };

        let records = records::build_records(&*self.vault, &self.policy, files).await?;
        let response = self.api.sync_files(&site.id, &records, true).await?;

        let local = files
            .iter()
            .cloned()
            .zip(records.into_iter().map(|record| record.path))
            .collect();
        Ok(classify(local, &response))
    }

    /// Publish every changed and new file and delete every remote-only path.
    ///
    /// Returns `None` when the site already matches the vault.
    ///
    /// # Errors
    ///
    /// Refuses with [`Error::Validation`] when the remote status could not be
    /// determined, so an outage never turns into a full re-publish.
    pub async fn publish_all(&self) -> Result<Option<BatchOutcome>> {
        let status = self.get_publish_status().await;
        if status.source == StatusSource::Unreachable {
            return Err(Error::validation(
                "remote status is unavailable, refusing to publish everything",
            ));
        }
        if !status.has_differences() {
            tracing::info!(unchanged = status.unchanged.len(), "Site is up to date");
            return Ok(None);
        }

        let mut files_to_publish = status.changed;
        files_to_publish.extend(status.new_files);
        let files_to_delete = status
            .deleted
            .iter()
            .map(|site_path| self.policy.to_vault_path(site_path))
            .collect();
        let request = BatchRequest {
            files_to_publish,
            files_to_delete,
        };
        self.publish_batch(request).await.map(Some)
    }
}
