//! Shared test utilities for the vault publisher workspace.
//!
//! This crate provides in-memory stand-ins for the two capability seams of
//! the engine and an on-disk vault builder. It is a dev-dependency only
//! and is never published.
//!
//! # Modules
//!
//! - [`vault`]: [`MemoryVault`], an in-memory [`vault_core::Vault`]
//! - [`site`]: [`FakeSiteApi`], a stateful in-memory remote with a call log
//!   and failure injection
//! - [`disk`]: [`TestVault`] builder over a temporary directory

pub mod disk;
pub mod site;
pub mod vault;

pub use disk::TestVault;
pub use site::{ApiCall, FakeSiteApi, Method};
pub use vault::MemoryVault;
