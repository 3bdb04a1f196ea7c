//! The reconciliation engine
//!
//! A [`Publisher`] is built from one snapshot of [`PublishSettings`]. It
//! memoizes the remote site and the token owner's username for its lifetime;
//! changing settings means building a new publisher.
//!
//! Each operation moves through [`Phase`]s:
//! `Idle -> SiteResolving -> (Deleting)? -> (Publishing)? -> Finalizing -> Done`.

mod batch;
mod diff;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::OnceCell;
use vault_client::{Site, SiteApi};
use vault_fs::PathPolicy;
use vault_meta::PublishSettings;

use crate::Result;
use crate::progress::{DEFAULT_LINGER, ProgressReporter};
use crate::vault::{Vault, VaultFile};

/// Operation phase, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SiteResolving,
    Deleting,
    Publishing,
    Finalizing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::SiteResolving => "site-resolving",
            Phase::Deleting => "deleting",
            Phase::Publishing => "publishing",
            Phase::Finalizing => "finalizing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Files to publish and vault paths to unpublish in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub files_to_publish: Vec<VaultFile>,
    pub files_to_delete: Vec<String>,
}

impl BatchRequest {
    pub fn publish(files: Vec<VaultFile>) -> Self {
        Self {
            files_to_publish: files,
            files_to_delete: Vec::new(),
        }
    }

    pub fn delete(paths: Vec<String>) -> Self {
        Self {
            files_to_publish: Vec::new(),
            files_to_delete: paths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files_to_publish.is_empty() && self.files_to_delete.is_empty()
    }
}

/// An upload that failed after retries; siblings were unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub path: String,
    pub message: String,
}

/// Result of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub site_url: String,
    /// Files now current on the site plus files deleted from it
    pub files_published: usize,
    pub failed_uploads: Vec<FailedUpload>,
}

/// Publishes a vault to its remote site.
pub struct Publisher {
    settings: PublishSettings,
    policy: PathPolicy,
    vault: Arc<dyn Vault>,
    api: Arc<dyn SiteApi>,
    progress: ProgressReporter,
    linger: Duration,
    username: OnceCell<String>,
    site: OnceCell<Site>,
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("settings", &self.settings)
            .field("site", &self.site.get())
            .finish_non_exhaustive()
    }
}

impl Publisher {
    /// Create a publisher.
    ///
    /// # Errors
    ///
    /// Returns a settings error if the token or site name is missing or
    /// malformed.
    pub fn new(
        settings: PublishSettings,
        vault: Arc<dyn Vault>,
        api: Arc<dyn SiteApi>,
        progress: ProgressReporter,
    ) -> Result<Self> {
        settings.validate()?;
        let policy = settings.path_policy();
        for invalid in policy.exclusions().invalid() {
            tracing::warn!(
                pattern = %invalid.pattern,
                error = %invalid.message,
                "Exclusion pattern will never match"
            );
        }

        Ok(Self {
            settings,
            policy,
            vault,
            api,
            progress,
            linger: DEFAULT_LINGER,
            username: OnceCell::new(),
            site: OnceCell::new(),
        })
    }

    /// Override how long finished progress stays visible.
    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    fn enter(&self, phase: Phase) {
        tracing::debug!(%phase, site = %self.settings.site_name, "Entering phase");
    }

    /// Username of the token owner, fetched once.
    pub async fn username(&self) -> Result<&str> {
        let username = self
            .username
            .get_or_try_init(|| self.fetch_username())
            .await?;
        Ok(username.as_str())
    }

    async fn fetch_username(&self) -> Result<String> {
        let user = self.api.get_user_info().await?;
        tracing::debug!(username = %user.username, "Resolved token owner");
        Ok(user.username)
    }

    /// Look up the site without creating it.
    pub async fn find_site(&self) -> Result<Option<Site>> {
        if let Some(site) = self.site.get() {
            return Ok(Some(site.clone()));
        }
        let owner = self.username().await?;
        let site = self
            .api
            .get_site_by_name(owner, &self.settings.site_name)
            .await?;
        if let Some(ref found) = site {
            // Losing a race with ensure_site leaves the same site cached
            let _ = self.site.set(found.clone());
        }
        Ok(site)
    }

    /// Resolve the site, creating it on first use.
    ///
    /// Concurrent callers share a single resolution; the site is never
    /// created twice by one publisher.
    pub async fn ensure_site(&self) -> Result<&Site> {
        self.site.get_or_try_init(|| self.resolve_site()).await
    }

    async fn resolve_site(&self) -> Result<Site> {
        let owner = self.username().await?;
        let name = &self.settings.site_name;
        if let Some(site) = self.api.get_site_by_name(owner, name).await? {
            tracing::debug!(site_id = %site.id, "Found existing site");
            return Ok(site);
        }
        tracing::info!(owner, name = %name, "Site not found, creating it");
        Ok(self.api.create_site(name).await?)
    }

    /// Identifier of the site, creating the site if needed.
    pub async fn site_id(&self) -> Result<String> {
        Ok(self.ensure_site().await?.id.clone())
    }
}
