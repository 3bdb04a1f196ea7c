//! Batch publish and delete

use std::collections::{HashMap, HashSet};

use futures::{StreamExt, stream};
use vault_client::UploadDirective;

use super::{BatchOutcome, BatchRequest, FailedUpload, Phase, Publisher};
use crate::records;
use crate::vault::VaultFile;
use crate::{Error, Result};

impl Publisher {
    /// Publish one note, optionally together with everything it embeds.
    ///
    /// Embed targets and the front-matter cover image are resolved through the
    /// vault, deduplicated by resolved path, and dropped when the path policy
    /// skips them.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the note lies outside the root directory
    /// - [`Error::Policy`] if the note opted out with `publish: false` or is
    ///   excluded by pattern; no network call is made
    pub async fn publish_single_note_with_embeds(
        &self,
        file: &VaultFile,
        with_embeds: bool,
    ) -> Result<BatchOutcome> {
        if !self.policy.is_within_root(&file.path) {
            return Err(Error::validation(format!(
                "{} is outside the published root '{}'",
                file.path,
                self.policy.root_dir()
            )));
        }
        if self.policy.is_excluded(&file.path) {
            return Err(Error::Policy {
                path: file.path.clone(),
                message: "matches an exclusion pattern".into(),
            });
        }

        let front_matter = if file.is_markdown() {
            self.vault.front_matter(&file.path).await?
        } else {
            None
        };
        if front_matter
            .as_ref()
            .is_some_and(|fm| fm.is_publish_disabled())
        {
            return Err(Error::Policy {
                path: file.path.clone(),
                message: "front matter sets publish: false".into(),
            });
        }

        let mut files = vec![file.clone()];
        if with_embeds && file.is_markdown() {
            let mut links = self.vault.embeds(&file.path).await?;
            if let Some(image) = front_matter.as_ref().and_then(|fm| fm.image_link()) {
                links.push(image);
            }
            files.extend(self.resolve_embeds(file, &links).await?);
        }

        tracing::debug!(note = %file.path, files = files.len(), "Publishing note");
        self.publish_batch(BatchRequest::publish(files)).await
    }

    async fn resolve_embeds(&self, source: &VaultFile, links: &[String]) -> Result<Vec<VaultFile>> {
        let mut seen = HashSet::from([source.path.clone()]);
        let mut targets = Vec::new();

        for link in links {
            let Some(target) = self.vault.resolve_link(link, &source.path).await? else {
                tracing::debug!(link = %link, source = %source.path, "Embed target not found");
                continue;
            };
            if !seen.insert(target.path.clone()) {
                continue;
            }
            let disabled = target.is_markdown() && self.is_publish_disabled(&target).await;
            if self.policy.should_skip(&target.path, disabled) {
                tracing::debug!(path = %target.path, "Embed target skipped by policy");
                continue;
            }
            targets.push(target);
        }

        Ok(targets)
    }

    /// Publish and delete files in one batch.
    ///
    /// Deletions are applied first. Uploads run with bounded concurrency; a
    /// failed upload is recorded in the outcome and does not stop its
    /// siblings. Progress always reaches a terminal state.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if both lists are empty or a file lies outside
    ///   the root directory
    /// - [`Error::Reconciliation`] if the server reports a deletion target
    ///   as not found
    /// - [`Error::Client`] for remote failures other than single uploads
    pub async fn publish_batch(&self, request: BatchRequest) -> Result<BatchOutcome> {
        if request.is_empty() {
            return Err(Error::validation("batch has nothing to publish or delete"));
        }
        if let Some(outside) = request
            .files_to_publish
            .iter()
            .find(|file| !self.policy.is_within_root(&file.path))
        {
            return Err(Error::validation(format!(
                "{} is outside the published root '{}'",
                outside.path,
                self.policy.root_dir()
            )));
        }

        self.progress.start(
            request.files_to_publish.len(),
            request.files_to_delete.len(),
        );

        let result = self.run_batch(&request).await;
        match &result {
            Ok(outcome) => {
                tracing::info!(
                    site_url = %outcome.site_url,
                    files_published = outcome.files_published,
                    failed = outcome.failed_uploads.len(),
                    "Batch finished"
                );
                self.progress.finish(true, self.linger);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Batch failed");
                self.progress.finish(false, self.linger);
            }
        }
        self.enter(Phase::Done);
        result
    }

    async fn run_batch(&self, request: &BatchRequest) -> Result<BatchOutcome> {
        self.enter(Phase::SiteResolving);
        let site = self.ensure_site().await?;

        let mut deleted = 0;
        if !request.files_to_delete.is_empty() {
            self.enter(Phase::Deleting);
            deleted = self.delete_paths(&site.id, &request.files_to_delete).await?;
        }

        let mut published = 0;
        let mut failed_uploads = Vec::new();
        if !request.files_to_publish.is_empty() {
            self.enter(Phase::Publishing);
            (published, failed_uploads) = self
                .publish_files(&site.id, &request.files_to_publish)
                .await?;
        }

        self.enter(Phase::Finalizing);
        Ok(BatchOutcome {
            site_url: site.url.clone(),
            files_published: published + deleted,
            failed_uploads,
        })
    }

    async fn delete_paths(&self, site_id: &str, paths: &[String]) -> Result<usize> {
        let normalized: Vec<String> = paths.iter().map(|p| self.policy.normalize(p)).collect();
        tracing::debug!(site_id, paths = ?normalized, "Deleting files");

        let response = self.api.delete_files(site_id, &normalized).await?;
        if !response.not_found.is_empty() {
            return Err(Error::Reconciliation {
                paths: response.not_found,
            });
        }

        for _ in &response.deleted {
            self.progress.increment_delete();
        }
        Ok(response.deleted.len())
    }

    /// Register files, then upload the bytes the server asked for.
    ///
    /// Returns the number of files now current on the site and the uploads
    /// that failed.
    async fn publish_files(
        &self,
        site_id: &str,
        files: &[VaultFile],
    ) -> Result<(usize, Vec<FailedUpload>)> {
        let mut records = Vec::with_capacity(files.len());
        let mut contents: HashMap<String, Vec<u8>> = HashMap::with_capacity(files.len());
        for file in files {
            let (record, bytes) = records::build_record(&*self.vault, &self.policy, file).await?;
            if contents.insert(record.path.clone(), bytes).is_none() {
                records.push(record);
            }
        }

        let directives = self.api.publish_files(site_id, &records).await?;

        let mut uploads: Vec<(UploadDirective, Vec<u8>)> = Vec::with_capacity(directives.len());
        for directive in directives {
            // Directive paths are site paths and are already root-relative
            match contents.remove(directive.path.trim_start_matches('/')) {
                Some(bytes) => uploads.push((directive, bytes)),
                None => {
                    tracing::debug!(path = %directive.path, "No local file for upload directive, skipping")
                }
            }
        }

        // Whatever the server did not ask for already matches its stored hash
        let already_current = contents.len();
        for _ in 0..already_current {
            self.progress.increment_publish();
        }

        let results: Vec<(String, vault_client::Result<()>)> = stream::iter(uploads)
            .map(|(directive, bytes)| async move {
                let result = self
                    .api
                    .upload_to_storage(&directive.upload_url, bytes, &directive.content_type)
                    .await;
                if result.is_ok() {
                    self.progress.increment_publish();
                }
                (directive.path, result)
            })
            .buffer_unordered(self.settings.upload_concurrency)
            .collect()
            .await;

        let mut uploaded = 0;
        let mut failed = Vec::new();
        for (path, result) in results {
            match result {
                Ok(()) => uploaded += 1,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Upload failed");
                    failed.push(FailedUpload {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }
        failed.sort_by(|a, b| a.path.cmp(&b.path));

        Ok((already_current + uploaded, failed))
    }
}
