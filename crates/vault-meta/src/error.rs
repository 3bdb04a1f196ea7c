//! Error types for vault-meta

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] vault_fs::Error),

    #[error("Missing required setting: {name}")]
    MissingSetting { name: String },

    #[error("Access token is malformed: expected a token starting with '{prefix}'")]
    InvalidToken { prefix: String },

    #[error("Invalid setting {name}: {message}")]
    InvalidSetting { name: String, message: String },
}
