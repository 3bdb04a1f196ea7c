//! Remote site client for the vault publisher
//!
//! [`SiteApi`] is the seam the reconciliation engine talks to; [`SiteClient`]
//! implements it over HTTPS with bearer-token authentication. Remote
//! mutations are retried according to a bounded [`RetryPolicy`].

pub mod api;
pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use api::SiteApi;
pub use client::SiteClient;
pub use error::{CallKind, Error, Result};
pub use retry::RetryPolicy;
pub use types::{
    DeleteResponse, FileRecord, Site, SyncResponse, SyncSummary, UploadDirective, UserInfo,
};
