//! The host vault capability
//!
//! The engine never touches the filesystem directly. Everything it needs from
//! the host (enumeration, reads, link resolution, note metadata) goes through
//! [`Vault`], so production and test hosts are interchangeable.

use async_trait::async_trait;
use serde::Serialize;
use vault_content::FrontMatter;
use vault_fs::constants::is_text_extension;

use crate::Result;

/// A file as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VaultFile {
    /// Vault-relative, slash-separated path
    pub path: String,
    /// Lowercase extension without the dot, empty when there is none
    pub extension: String,
    pub size: u64,
}

impl VaultFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            extension,
            size,
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }

    /// Whether the content is read as text rather than raw bytes.
    pub fn is_text(&self) -> bool {
        is_text_extension(&self.extension)
    }

    /// Final path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Final path segment without its extension.
    pub fn basename(&self) -> &str {
        let name = self.name();
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Read-only access to the host vault.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Every file in the vault.
    async fn list_files(&self) -> Result<Vec<VaultFile>>;

    async fn read_text(&self, path: &str) -> Result<String>;

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>>;

    /// Resolve a wiki-style link written in `source_path` to a vault file.
    async fn resolve_link(&self, link: &str, source_path: &str) -> Result<Option<VaultFile>>;

    /// Parsed front matter of a note, `None` when it has none.
    async fn front_matter(&self, path: &str) -> Result<Option<FrontMatter>>;

    /// Embedded resource links of a note, in document order.
    async fn embeds(&self, path: &str) -> Result<Vec<String>>;
}
