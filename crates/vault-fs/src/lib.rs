//! Filesystem primitives for the vault publisher
//!
//! Provides path scoping and exclusion policy, content fingerprinting,
//! and format-agnostic configuration I/O.

pub mod config;
pub mod constants;
pub mod error;
pub mod fingerprint;
pub mod io;
pub mod path;
pub mod policy;

pub use config::ConfigStore;
pub use constants::{ContentKind, TEXT_EXTENSIONS};
pub use error::{Error, Result};
pub use fingerprint::{fingerprint, fingerprint_text};
pub use path::NormalizedPath;
pub use policy::{ExclusionSet, PathPolicy, is_excluded, is_within_root, normalize, should_skip};
