//! [`Vault`] over a plain directory on disk

use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use vault_content::{FrontMatter, Note};

use crate::links;
use crate::vault::{Vault, VaultFile};
use crate::{Error, Result};

/// A vault rooted at a local directory.
///
/// Hidden directories (`.obsidian`, `.git`, `.trash`, `.vaultpub`, ...) and
/// hidden files are not part of the vault.
#[derive(Debug, Clone)]
pub struct LocalVault {
    root: PathBuf,
}

impl LocalVault {
    /// Open the vault at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vault`] if the directory does not exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = dunce::canonicalize(root).map_err(|e| Error::vault(root.display().to_string(), e))?;
        if !root.is_dir() {
            return Err(Error::vault(root.display().to_string(), "not a directory"));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a vault path to a native path, refusing anything that escapes the root.
    fn native(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::vault(path, "path escapes the vault root"));
        }
        Ok(self.root.join(relative))
    }

    fn walk(&self, dir: &Path, prefix: &str, files: &mut Vec<VaultFile>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| Error::vault(dir.display().to_string(), e))?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::vault(dir.display().to_string(), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let path = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            let file_type = entry
                .file_type()
                .map_err(|e| Error::vault(path.clone(), e))?;

            if file_type.is_dir() {
                self.walk(&entry.path(), &path, files)?;
            } else if file_type.is_file() {
                let size = entry
                    .metadata()
                    .map_err(|e| Error::vault(path.clone(), e))?
                    .len();
                files.push(VaultFile::new(path, size));
            }
        }
        Ok(())
    }

    async fn read_note(&self, path: &str) -> Result<Option<Note>> {
        if !path.to_ascii_lowercase().ends_with(".md") {
            return Ok(None);
        }
        let text = self.read_text(path).await?;
        Ok(Some(Note::parse(&text)?))
    }
}

#[async_trait]
impl Vault for LocalVault {
    async fn list_files(&self) -> Result<Vec<VaultFile>> {
        let vault = self.clone();
        let mut files = tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            vault.walk(&vault.root, "", &mut files).map(|_| files)
        })
        .await
        .map_err(|e| Error::vault(self.root.display().to_string(), e))??;

        files.sort();
        tracing::debug!(root = %self.root.display(), files = files.len(), "Listed vault files");
        Ok(files)
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        let native = self.native(path)?;
        tokio::fs::read_to_string(&native)
            .await
            .map_err(|e| Error::vault(path, e))
    }

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let native = self.native(path)?;
        tokio::fs::read(&native).await.map_err(|e| Error::vault(path, e))
    }

    async fn resolve_link(&self, link: &str, source_path: &str) -> Result<Option<VaultFile>> {
        let files = self.list_files().await?;
        Ok(links::resolve_link(&files, link, source_path))
    }

    async fn front_matter(&self, path: &str) -> Result<Option<FrontMatter>> {
        Ok(self.read_note(path).await?.and_then(|note| note.front_matter))
    }

    async fn embeds(&self, path: &str) -> Result<Vec<String>> {
        Ok(self
            .read_note(path)
            .await?
            .map(|note| note.embeds)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn vault(temp: &assert_fs::TempDir) -> LocalVault {
        LocalVault::open(temp.path()).unwrap()
    }

    #[tokio::test]
    async fn test_list_skips_hidden_entries() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("notes/a.md").write_str("# A").unwrap();
        temp.child("assets/img.png").write_binary(&[1, 2, 3]).unwrap();
        temp.child(".obsidian/workspace.json").write_str("{}").unwrap();
        temp.child(".vaultpub/config.toml").write_str("").unwrap();
        temp.child("notes/.draft.md").write_str("x").unwrap();

        let files = vault(&temp).list_files().await.unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["assets/img.png", "notes/a.md"]);
        assert_eq!(files[0].size, 3);
        assert_eq!(files[0].extension, "png");
    }

    #[tokio::test]
    async fn test_read_rejects_escaping_paths() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = vault(&temp).read_text("../outside.md").await;
        assert!(matches!(result, Err(Error::Vault { .. })));
    }

    #[tokio::test]
    async fn test_front_matter_and_embeds() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("post.md")
            .write_str("---\npublish: false\n---\n![[pic.png]]\n")
            .unwrap();

        let vault = vault(&temp);
        let fm = vault.front_matter("post.md").await.unwrap().unwrap();
        assert!(fm.is_publish_disabled());
        assert_eq!(vault.embeds("post.md").await.unwrap(), vec!["pic.png"]);
    }

    #[tokio::test]
    async fn test_non_markdown_has_no_metadata() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("data.json").write_str("{}").unwrap();

        let vault = vault(&temp);
        assert_eq!(vault.front_matter("data.json").await.unwrap(), None);
        assert!(vault.embeds("data.json").await.unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = LocalVault::open(temp.path().join("missing"));
        assert!(matches!(result, Err(Error::Vault { .. })));
    }
}
