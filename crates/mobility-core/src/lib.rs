//! # Mobility Core
//!
//! Core library for Mobility - a confidentiality-preserving administrative
//! record store for travellers, scooters and the operators who manage them.
//!
//! This crate provides the domain logic, storage and security primitives
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: Field encryption (Age X25519) and salted secret hashing (Argon2id)
//! - **model**: Encrypted entities and their format validation
//! - **auth**: Exact-match role gate, management policy and login sessions
//! - **search**: Selective-decryption search over encrypted columns
//! - **backup**: Backup artifacts and the restore-code protocol
//! - **storage**: SQLite persistence adapter
//! - **service**: Guarded record operations and the audit log

pub mod auth;
pub mod backup;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod model;
pub mod search;
pub mod service;
pub mod storage;
mod vault;

pub use auth::{guard, AccessDenied, Actor, Session};
pub use backup::{IssuedCode, RestoreReport};
pub use config::VaultConfig;
pub use error::{MobilityError, Result};
pub use model::Role;
pub use search::{SearchQuery, SearchResults};
pub use vault::Vault;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render an operation result as the `(success, message)` pair shown to operators.
pub fn reply<T>(result: Result<T>, on_success: impl FnOnce(T) -> String) -> (bool, String) {
    match result {
        Ok(value) => (true, on_success(value)),
        Err(err) => (false, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reply_maps_errors_to_messages() {
        let ok: Result<i64> = Ok(7);
        assert_eq!(reply(ok, |id| format!("Created #{}", id)), (true, "Created #7".to_string()));

        let failed: Result<i64> = Err(MobilityError::NotFound("Backup #3".to_string()));
        let (success, message) = reply(failed, |_| String::new());
        assert!(!success);
        assert_eq!(message, "Not found: Backup #3");
    }
}
