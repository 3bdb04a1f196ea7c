//! Publish settings
//!
//! The configuration surface consumed by the publisher: credentials, the
//! target site, the root-directory scope and the exclusion patterns.

use std::fmt;

use serde::{Deserialize, Serialize};
use vault_fs::PathPolicy;

use crate::{Error, Result};

/// Every well-formed access token starts with this prefix.
pub const TOKEN_PREFIX: &str = "fs_pat_";

/// API endpoint used when no `api_url` is configured.
pub const DEFAULT_API_URL: &str = "https://cloud.flowershow.app";

/// Exclusion patterns applied when none are configured.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[r"\.excalidraw(\.(md|excalidraw))?$"];

/// Retry policy for remote mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt (0 disables retrying)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further one
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
}

fn default_max_retries() -> u32 {
    1
}

fn default_initial_interval_ms() -> u64 {
    500
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_interval_ms: default_initial_interval_ms(),
        }
    }
}

/// Fully resolved publish settings.
///
/// A publisher is built from one snapshot of these settings; changing them
/// means building a new publisher.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSettings {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub site_name: String,
    /// Vault folder published as the site root (empty publishes the whole vault)
    #[serde(default)]
    pub root_dir: String,
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Maximum number of storage uploads in flight
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_upload_concurrency() -> usize {
    4
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            site_name: String::new(),
            root_dir: String::new(),
            exclude_patterns: default_exclude_patterns(),
            api_url: default_api_url(),
            upload_concurrency: default_upload_concurrency(),
            retry: RetrySettings::default(),
        }
    }
}

impl fmt::Debug for PublishSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishSettings")
            .field("access_token", &redact(&self.access_token))
            .field("site_name", &self.site_name)
            .field("root_dir", &self.root_dir)
            .field("exclude_patterns", &self.exclude_patterns)
            .field("api_url", &self.api_url)
            .field("upload_concurrency", &self.upload_concurrency)
            .field("retry", &self.retry)
            .finish()
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() { "<unset>" } else { "<redacted>" }
}

impl PublishSettings {
    /// Create settings for a site with default policy values.
    pub fn new(access_token: impl Into<String>, site_name: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            site_name: site_name.into(),
            ..Self::default()
        }
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<String>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Check whether the token is present and carries the expected prefix.
    pub fn has_well_formed_token(&self) -> bool {
        self.access_token.starts_with(TOKEN_PREFIX) && self.access_token.len() > TOKEN_PREFIX.len()
    }

    /// Validate the settings required before any remote call.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a missing or malformed token, a
    /// missing site name, or an unusable upload concurrency.
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(Error::MissingSetting {
                name: "access_token".into(),
            });
        }
        if !self.has_well_formed_token() {
            return Err(Error::InvalidToken {
                prefix: TOKEN_PREFIX.into(),
            });
        }
        if self.site_name.trim().is_empty() {
            return Err(Error::MissingSetting {
                name: "site_name".into(),
            });
        }
        if self.upload_concurrency == 0 {
            return Err(Error::InvalidSetting {
                name: "upload_concurrency".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Compile the root scope and exclusion patterns.
    pub fn path_policy(&self) -> PathPolicy {
        PathPolicy::new(&self.root_dir, &self.exclude_patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_include_excalidraw_pattern() {
        let settings = PublishSettings::default();
        assert_eq!(settings.exclude_patterns.len(), 1);
        assert!(settings.path_policy().is_excluded("drawing.excalidraw.md"));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.retry.max_retries, 1);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let settings = PublishSettings::new("fs_pat_abc123", "garden");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let settings = PublishSettings::new("", "garden");
        assert!(matches!(
            settings.validate(),
            Err(Error::MissingSetting { name }) if name == "access_token"
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_prefix() {
        let settings = PublishSettings::new("ghp_abc123", "garden");
        assert!(matches!(settings.validate(), Err(Error::InvalidToken { .. })));

        let bare_prefix = PublishSettings::new(TOKEN_PREFIX, "garden");
        assert!(matches!(bare_prefix.validate(), Err(Error::InvalidToken { .. })));
    }

    #[test]
    fn test_validate_rejects_missing_site() {
        let settings = PublishSettings::new("fs_pat_abc123", "  ");
        assert!(matches!(
            settings.validate(),
            Err(Error::MissingSetting { name }) if name == "site_name"
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = PublishSettings::new("fs_pat_secret", "garden");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_path_policy_uses_root_dir() {
        let settings = PublishSettings::new("fs_pat_x", "garden").with_root_dir("/blog/");
        let policy = settings.path_policy();
        assert_eq!(policy.root_dir(), "blog");
        assert_eq!(policy.normalize("blog/old.md"), "old.md");
    }
}
