//! [`TestVault`] builder for on-disk vault scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vault_core::LocalVault;

/// A vault in a temporary directory, removed on drop.
///
/// # Example
///
/// ```rust
/// use vault_test_utils::TestVault;
///
/// let vault = TestVault::new()
///     .write("notes/a.md", "---\ntitle: A\n---\n# A\n")
///     .write_bytes("img/logo.png", &[0x89, 0x50, 0x4e, 0x47]);
/// vault.assert_file_exists("notes/a.md");
/// ```
pub struct TestVault {
    temp_dir: TempDir,
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

impl TestVault {
    /// Create an empty vault directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestVault::new: failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a text file, creating parent directories.
    pub fn write(self, relative: &str, content: &str) -> Self {
        self.write_bytes(relative, content.as_bytes())
    }

    /// Write a binary file, creating parent directories.
    pub fn write_bytes(self, relative: &str, content: &[u8]) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("TestVault::write_bytes: failed to create dirs");
        }
        fs::write(&path, content).expect("TestVault::write_bytes: failed to write file");
        self
    }

    /// Write `.vaultpub/config.toml` with the given TOML body.
    pub fn write_config(self, toml: &str) -> Self {
        self.write(".vaultpub/config.toml", toml)
    }

    /// Write `.vaultpub/config.local.toml` holding an access token.
    pub fn write_local_token(self, token: &str) -> Self {
        self.write(
            ".vaultpub/config.local.toml",
            &format!("access_token = \"{}\"\n", token),
        )
    }

    /// Open the directory as a [`LocalVault`].
    pub fn open(&self) -> LocalVault {
        LocalVault::open(self.root()).expect("TestVault::open: failed to open vault")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("TestVault::read: {}: {}", relative, e))
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.path(relative).is_file(),
            "expected file to exist: {}",
            relative
        );
    }

    pub fn assert_file_contains(&self, relative: &str, expected: &str) {
        let content = self.read(relative);
        assert!(
            content.contains(expected),
            "expected {} to contain {:?}, got:\n{}",
            relative,
            expected,
            content
        );
    }
}
