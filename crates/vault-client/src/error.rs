//! Error types for vault-client

/// Result type for vault-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the remote site API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Credential rejected by the remote
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Non-2xx API response not otherwise classified
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Storage PUT failed for a single file; `status` is absent when no
    /// response arrived
    #[error(
        "Upload failed{}: {message}",
        .status.map(|s| format!(" ({s})")).unwrap_or_default()
    )]
    Upload { status: Option<u16>, message: String },

    /// Connection, TLS or timeout failure before a response arrived
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Response body did not match the expected shape
    #[error("Malformed response: {message}")]
    Decode { message: String },

    #[error("Access token is malformed: expected a token starting with '{prefix}'")]
    InvalidToken { prefix: String },

    #[error("Invalid API URL: {url}")]
    InvalidUrl { url: String },
}

/// The kind of call a failed response belongs to; decides how a status code
/// is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Identity lookup: every failure means the credential was rejected
    Identity,
    /// Any other API call
    Api,
    /// Direct upload to a pre-signed storage URL
    Storage,
}

impl Error {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }

    /// Build the error for a non-2xx response.
    pub fn from_status(kind: CallKind, status: u16, body: &str) -> Self {
        let message = server_message(status, body);
        match kind {
            CallKind::Identity => Self::Auth { status, message },
            CallKind::Api if status == 401 || status == 403 => Self::Auth { status, message },
            CallKind::Api => Self::Remote { status, message },
            CallKind::Storage => Self::Upload {
                status: Some(status),
                message,
            },
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Transport failures, 5xx and 429 are transient. Credential and other
    /// client errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Upload { status: None, .. } => true,
            Self::Remote { status, .. }
            | Self::Upload {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Remote { status, .. } => Some(*status),
            Self::Upload { status, .. } => *status,
            _ => None,
        }
    }

    /// Reclassify a transport failure as a failed upload.
    ///
    /// Storage calls report every per-file failure as [`Error::Upload`].
    pub(crate) fn into_upload(self) -> Self {
        match self {
            Self::Transport { message } => Self::Upload {
                status: None,
                message,
            },
            other => other,
        }
    }
}

/// Pick the most useful message out of an error response body.
///
/// JSON bodies with an `error` or `message` string win, then a non-empty
/// plain body, then a generic message naming the status.
pub fn server_message(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(message)) = map.get(key)
                && !message.is_empty()
            {
                return message.clone();
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 500 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    format!("request failed with status {}", status)
}
