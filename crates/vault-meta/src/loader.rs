//! Layered settings resolution
//!
//! Settings are merged from these sources, later ones overriding earlier:
//!
//! 1. Global defaults (`<config_dir>/vaultpub/config.toml`)
//! 2. Vault config (`<vault>/.vaultpub/config.toml`)
//! 3. Local overrides (`<vault>/.vaultpub/config.local.toml`), kept out of
//!    version control and usually holding the access token
//!
//! Missing layers are skipped. A layer that fails to parse is an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vault_fs::{ConfigStore, NormalizedPath};

use crate::settings::{PublishSettings, RetrySettings};
use crate::Result;

/// Directory inside the vault holding publisher configuration.
pub const CONFIG_DIR: &str = ".vaultpub";

/// One configuration source. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySettings>,
}

impl SettingsLayer {
    /// Overlay `other` on top of this layer.
    ///
    /// Lists are replaced wholesale, not concatenated, so a vault can drop a
    /// globally configured exclusion.
    pub fn merge(&mut self, other: &SettingsLayer) {
        if other.access_token.is_some() {
            self.access_token = other.access_token.clone();
        }
        if other.site_name.is_some() {
            self.site_name = other.site_name.clone();
        }
        if other.root_dir.is_some() {
            self.root_dir = other.root_dir.clone();
        }
        if other.exclude_patterns.is_some() {
            self.exclude_patterns = other.exclude_patterns.clone();
        }
        if other.api_url.is_some() {
            self.api_url = other.api_url.clone();
        }
        if other.upload_concurrency.is_some() {
            self.upload_concurrency = other.upload_concurrency;
        }
        if other.retry.is_some() {
            self.retry = other.retry;
        }
    }

    /// Fill unset fields with defaults.
    pub fn into_settings(self) -> PublishSettings {
        let defaults = PublishSettings::default();
        PublishSettings {
            access_token: self.access_token.unwrap_or(defaults.access_token),
            site_name: self.site_name.unwrap_or(defaults.site_name),
            root_dir: self.root_dir.unwrap_or(defaults.root_dir),
            exclude_patterns: self.exclude_patterns.unwrap_or(defaults.exclude_patterns),
            api_url: self.api_url.unwrap_or(defaults.api_url),
            upload_concurrency: self
                .upload_concurrency
                .unwrap_or(defaults.upload_concurrency),
            retry: self.retry.unwrap_or(defaults.retry),
        }
    }
}

/// Resolves publish settings for a vault by merging config layers.
pub struct SettingsLoader {
    vault_root: NormalizedPath,
    /// Override for the global config directory (used for testing)
    global_config_dir_override: Option<PathBuf>,
    store: ConfigStore,
}

impl SettingsLoader {
    /// Create a loader for the vault rooted at `vault_root`.
    ///
    /// The global layer lives in the platform config directory:
    /// - Linux: `~/.config/vaultpub/`
    /// - macOS: `~/Library/Application Support/vaultpub/`
    /// - Windows: `%APPDATA%\vaultpub\`
    pub fn new(vault_root: NormalizedPath) -> Self {
        Self {
            vault_root,
            global_config_dir_override: None,
            store: ConfigStore::new(),
        }
    }

    /// Create a loader with a custom global config directory.
    pub fn with_global_config_dir(vault_root: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            vault_root,
            global_config_dir_override: Some(global_config_dir),
            store: ConfigStore::new(),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("vaultpub"))
    }

    /// Path of the vault-level config file.
    pub fn config_path(&self) -> NormalizedPath {
        self.vault_root.join(CONFIG_DIR).join("config.toml")
    }

    /// Path of the local override file.
    pub fn local_config_path(&self) -> NormalizedPath {
        self.vault_root.join(CONFIG_DIR).join("config.local.toml")
    }

    pub fn has_config(&self) -> bool {
        self.config_path().is_file()
    }

    /// Merge all available layers into publish settings.
    ///
    /// The result is not validated; call [`PublishSettings::validate`] before
    /// talking to the remote.
    pub fn resolve(&self) -> Result<PublishSettings> {
        let mut merged = SettingsLayer::default();

        if let Some(global_dir) = self.global_config_dir() {
            let global_path = NormalizedPath::new(global_dir.join("config.toml"));
            if global_path.is_file() {
                tracing::debug!(path = %global_path, "Loading global settings (layer 1)");
                merged.merge(&self.store.load(&global_path)?);
            } else {
                tracing::debug!(path = %global_path, "No global settings found (layer 1), skipping");
            }
        }

        let vault_path = self.config_path();
        if vault_path.is_file() {
            tracing::debug!(path = %vault_path, "Loading vault settings (layer 2)");
            merged.merge(&self.store.load(&vault_path)?);
        }

        let local_path = self.local_config_path();
        if local_path.is_file() {
            tracing::debug!(path = %local_path, "Loading local overrides (layer 3)");
            merged.merge(&self.store.load(&local_path)?);
        }

        Ok(merged.into_settings())
    }

    /// Write the vault-level config file, replacing any existing one.
    pub fn save(&self, layer: &SettingsLayer) -> Result<()> {
        let path = self.config_path();
        tracing::debug!(path = %path, "Writing vault settings");
        self.store.save(&path, layer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let mut base = SettingsLayer {
            site_name: Some("garden".into()),
            root_dir: Some("blog".into()),
            ..Default::default()
        };
        base.merge(&SettingsLayer {
            root_dir: Some("docs".into()),
            ..Default::default()
        });

        assert_eq!(base.site_name.as_deref(), Some("garden"));
        assert_eq!(base.root_dir.as_deref(), Some("docs"));
    }

    #[test]
    fn test_merge_replaces_pattern_list() {
        let mut base = SettingsLayer {
            exclude_patterns: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        base.merge(&SettingsLayer {
            exclude_patterns: Some(vec![]),
            ..Default::default()
        });
        assert_eq!(base.exclude_patterns, Some(vec![]));
    }

    #[test]
    fn test_empty_layer_yields_defaults() {
        let settings = SettingsLayer::default().into_settings();
        assert_eq!(settings, PublishSettings::default());
    }
}
