//! [`MemoryVault`]: an in-memory host vault.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use vault_content::{FrontMatter, Note};
use vault_core::{Error, Result, Vault, VaultFile, resolve_link};

/// A vault whose files live in a map. Clones share the same files.
///
/// # Example
///
/// ```rust
/// use vault_test_utils::MemoryVault;
///
/// let vault = MemoryVault::new()
///     .with_text("notes/a.md", "# A")
///     .with_file("img/logo.png", *b"\x89PNG");
/// assert_eq!(vault.file("notes/a.md").size, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.lock().expect("MemoryVault: poisoned lock")
    }

    /// Add a file with raw content.
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add a text file.
    pub fn with_text(self, path: &str, content: &str) -> Self {
        self.with_file(path, content.as_bytes())
    }

    /// Add or replace a file in place.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.files().insert(path.to_string(), content.into());
    }

    pub fn remove(&self, path: &str) {
        self.files().remove(path);
    }

    /// Descriptor of an existing file.
    ///
    /// # Panics
    ///
    /// Panics if the file does not exist.
    pub fn file(&self, path: &str) -> VaultFile {
        let size = self
            .files()
            .get(path)
            .map(|content| content.len() as u64)
            .unwrap_or_else(|| panic!("MemoryVault::file: no file at {}", path));
        VaultFile::new(path, size)
    }

    fn content(&self, path: &str) -> Result<Vec<u8>> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::vault(path, "no such file"))
    }

    fn note(&self, path: &str) -> Result<Option<Note>> {
        if !path.ends_with(".md") {
            return Ok(None);
        }
        let content = self.content(path)?;
        let text = String::from_utf8(content).map_err(|e| Error::vault(path, e))?;
        Ok(Some(Note::parse(&text)?))
    }
}

#[async_trait]
impl Vault for MemoryVault {
    async fn list_files(&self) -> Result<Vec<VaultFile>> {
        Ok(self
            .files()
            .iter()
            .map(|(path, content)| VaultFile::new(path.as_str(), content.len() as u64))
            .collect())
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        String::from_utf8(self.content(path)?).map_err(|e| Error::vault(path, e))
    }

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.content(path)
    }

    async fn resolve_link(&self, link: &str, source_path: &str) -> Result<Option<VaultFile>> {
        let files = self.list_files().await?;
        Ok(resolve_link(&files, link, source_path))
    }

    async fn front_matter(&self, path: &str) -> Result<Option<FrontMatter>> {
        Ok(self.note(path)?.and_then(|note| note.front_matter))
    }

    async fn embeds(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.note(path)?.map(|note| note.embeds).unwrap_or_default())
    }
}
