//! Publish settings for the vault publisher.
//!
//! This crate defines the configuration surface consumed by the
//! reconciliation engine and loads it from layered config files.

pub mod error;
pub mod loader;
pub mod settings;

pub use error::{Error, Result};
pub use loader::{SettingsLayer, SettingsLoader};
pub use settings::{
    DEFAULT_API_URL, DEFAULT_EXCLUDE_PATTERNS, PublishSettings, RetrySettings, TOKEN_PREFIX,
};
