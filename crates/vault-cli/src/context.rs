//! Vault context detection
//!
//! Finds the vault root from any directory inside it, the way `git` finds
//! its repository, and resolves the settings commands run with.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vault_client::SiteClient;
use vault_core::{LocalVault, ProgressReporter, Publisher};
use vault_fs::NormalizedPath;
use vault_meta::{PublishSettings, SettingsLoader, loader::CONFIG_DIR};

use crate::error::{CliError, Result};

/// Walk up from `start` to the first directory holding `.vaultpub/`.
pub fn find_vault_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Where the vault is and how to reach its site.
pub struct VaultContext {
    root: PathBuf,
    loader: SettingsLoader,
    token: Option<String>,
}

impl VaultContext {
    /// Locate the vault.
    ///
    /// An explicit `vault` directory is used as is. Otherwise the current
    /// directory's nearest configured ancestor is used, falling back to the
    /// current directory itself.
    pub fn detect(
        vault: Option<&Path>,
        token: Option<&str>,
        global_config_dir: Option<&Path>,
    ) -> Result<Self> {
        let root = match vault {
            Some(dir) => dir.to_path_buf(),
            None => {
                let cwd = std::env::current_dir()?;
                find_vault_root(&cwd).unwrap_or(cwd)
            }
        };
        if !root.is_dir() {
            return Err(CliError::user(format!(
                "Vault directory does not exist: {}",
                root.display()
            )));
        }

        let normalized = NormalizedPath::new(&root);
        let loader = match global_config_dir {
            Some(dir) => SettingsLoader::with_global_config_dir(normalized, dir.to_path_buf()),
            None => SettingsLoader::new(normalized),
        };
        tracing::debug!(root = %root.display(), "Using vault");

        Ok(Self {
            root,
            loader,
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn loader(&self) -> &SettingsLoader {
        &self.loader
    }

    /// Resolved settings with the command-line token applied on top.
    pub fn settings(&self) -> Result<PublishSettings> {
        if !self.loader.has_config() {
            return Err(CliError::user(format!(
                "No vaultpub configuration found in {}. Run `vaultpub init --site <name>` first.",
                self.root.display()
            )));
        }
        let mut settings = self.loader.resolve()?;
        if let Some(ref token) = self.token {
            settings.access_token = token.clone();
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn client(&self) -> Result<SiteClient> {
        Ok(SiteClient::from_settings(&self.settings()?)?)
    }

    pub fn vault(&self) -> Result<Arc<LocalVault>> {
        Ok(Arc::new(LocalVault::open(&self.root)?))
    }

    /// Build a publisher over `vault` talking to the configured site.
    pub fn publisher(
        &self,
        vault: Arc<LocalVault>,
        progress: ProgressReporter,
    ) -> Result<Publisher> {
        let settings = self.settings()?;
        let client = SiteClient::from_settings(&settings)?;
        Ok(Publisher::new(settings, vault, Arc::new(client), progress)?)
    }
}
