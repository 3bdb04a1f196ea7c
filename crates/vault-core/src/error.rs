//! Error types for vault-core

/// Result type for vault-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during reconciliation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request was structurally invalid (empty batch, path outside the root)
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// The file opted out of publishing or is excluded by policy
    #[error("{path} is not publishable: {message}")]
    Policy { path: String, message: String },

    /// The server could not find paths that were explicitly deleted
    #[error("Remote state diverged, not found on the server: {}", .paths.join(", "))]
    Reconciliation { paths: Vec<String> },

    /// Host vault access failed
    #[error("Vault error at {path}: {message}")]
    Vault { path: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Remote API error, carried unchanged
    #[error(transparent)]
    Client(#[from] vault_client::Error),

    /// Settings error from vault-meta
    #[error(transparent)]
    Meta(#[from] vault_meta::Error),

    /// Note parsing error from vault-content
    #[error(transparent)]
    Content(#[from] vault_content::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn vault(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Vault {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
