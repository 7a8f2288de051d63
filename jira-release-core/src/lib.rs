//! Jira Release Core - configuration and credentials for jira-release
//!
//! This crate loads the per-project release configuration and resolves
//! the credentials used to talk to the tracker.

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{Error, Result};
pub use secrets::{unwrap_secret, Credential, KeychainStore, KeyringStore, SecretStore};
