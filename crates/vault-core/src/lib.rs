//! Publish reconciliation engine for the vault publisher
//!
//! Scans a vault through the [`Vault`] capability, diffs it against the
//! remote site through [`vault_client::SiteApi`], and reconciles the two by
//! uploading new and changed files and deleting removed ones. Progress is
//! observable through a [`ProgressReporter`].

pub mod error;
pub mod links;
pub mod local;
pub mod progress;
pub mod publish;
pub mod records;
pub mod status;
pub mod vault;

pub use error::{Error, Result};
pub use links::resolve_link;
pub use local::LocalVault;
pub use progress::{DEFAULT_LINGER, ProgressPhase, ProgressReporter, ProgressSnapshot};
pub use publish::{BatchOutcome, BatchRequest, FailedUpload, Phase, Publisher};
pub use status::{PublishStatus, StatusSource, classify};
pub use vault::{Vault, VaultFile};
