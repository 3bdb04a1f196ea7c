//! File record construction
//!
//! Records are rebuilt from the vault on every pass; nothing is cached.

use futures::{StreamExt, TryStreamExt, stream};
use vault_client::FileRecord;
use vault_fs::{PathPolicy, fingerprint};

use crate::Result;
use crate::vault::{Vault, VaultFile};

/// Concurrent reads while building records for a whole vault.
const READ_CONCURRENCY: usize = 8;

/// Read a file's bytes the way its extension dictates.
///
/// Text files are read as text and hashed over their UTF-8 encoding; every
/// other file is read as raw bytes. Both paths hash identical content the
/// same way.
pub async fn read_content(vault: &dyn Vault, file: &VaultFile) -> Result<Vec<u8>> {
    if file.is_text() {
        Ok(vault.read_text(&file.path).await?.into_bytes())
    } else {
        vault.read_binary(&file.path).await
    }
}

/// Build the wire record for one file, returning its content alongside.
///
/// The record path is normalized against the root directory.
pub async fn build_record(
    vault: &dyn Vault,
    policy: &PathPolicy,
    file: &VaultFile,
) -> Result<(FileRecord, Vec<u8>)> {
    let bytes = read_content(vault, file).await?;
    let record = FileRecord {
        path: policy.normalize(&file.path),
        size: bytes.len() as u64,
        sha: fingerprint(&bytes),
    };
    Ok((record, bytes))
}

/// Build records for many files, preserving input order.
pub async fn build_records(
    vault: &dyn Vault,
    policy: &PathPolicy,
    files: &[VaultFile],
) -> Result<Vec<FileRecord>> {
    stream::iter(files)
        .map(|file| async move {
            build_record(vault, policy, file)
                .await
                .map(|(record, _)| record)
        })
        .buffered(READ_CONCURRENCY)
        .try_collect()
        .await
}
