//! Error types for Mobility core operations.
//!
//! Validation and decryption errors are raised close to the input. Access
//! denials and protocol outcomes (not found, invalid code, duplicate request)
//! are ordinary values returned to the caller; the CLI layer maps all of them
//! to operator-facing messages.

use thiserror::Error;

use crate::auth::AccessDenied;

/// Result type alias for Mobility operations.
pub type Result<T> = std::result::Result<T, MobilityError>;

/// Core error type for Mobility operations.
#[derive(Debug, Error)]
pub enum MobilityError {
    /// A field failed its presence, format, range or cross-field check
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Ciphertext is corrupt or was produced under a different key
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The process-wide field key could not be loaded
    #[error("Encryption key unavailable: {0}")]
    KeyUnavailable(String),

    /// Encryption or hashing failed
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// The acting identity is not permitted to run the operation
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No unused, unexpired restore code matched
    #[error("Invalid or expired restore code")]
    InvalidCode,

    /// A live request or code already exists for this (backup, requester) pair
    #[error("A restore request for backup #{backup_id} is already open")]
    AlreadyRequested { backup_id: i64 },

    /// Login failed
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Backup or restore I/O failed; the live store is left as it was
    #[error("Restore failed: {0}")]
    RestoreFailed(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MobilityError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        MobilityError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MobilityError {
    fn from(err: std::io::Error) -> Self {
        MobilityError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for MobilityError {
    fn from(err: rusqlite::Error) -> Self {
        MobilityError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = MobilityError::validation("zip_code", "must look like 1234AB");
        assert_eq!(err.to_string(), "Invalid zip_code: must look like 1234AB");
    }

    #[test]
    fn test_rusqlite_error_maps_to_storage() {
        let err: MobilityError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, MobilityError::Storage(_)));
    }
}
