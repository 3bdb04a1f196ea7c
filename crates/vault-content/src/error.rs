//! Error types for vault-content

/// Result type for vault-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing note content
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed front matter: {message}")]
    FrontMatter { message: String },
}

impl Error {
    pub fn front_matter(message: impl Into<String>) -> Self {
        Self::FrontMatter {
            message: message.into(),
        }
    }
}
