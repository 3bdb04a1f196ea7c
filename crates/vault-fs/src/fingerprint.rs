//! SHA-1 content fingerprints
//!
//! A fingerprint is the lowercase hex SHA-1 digest of a file's bytes. It is
//! the unit of change detection between the vault and the remote site, not a
//! security primitive.

use sha1::{Digest, Sha1};

/// Compute the fingerprint of raw bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Compute the fingerprint of text content over its UTF-8 bytes.
pub fn fingerprint_text(content: &str) -> String {
    fingerprint(content.as_bytes())
}
