//! Guarded record operations.
//!
//! Each public method takes the acting identity first, runs the role gate
//! with the literal set of roles the operation admits, and only then touches
//! the store. Successful mutations append an audit log entry.

mod audit;
mod scooters;
mod travellers;
mod users;

/// Fail with `NotFound` naming the missing record.
pub(crate) fn not_found(kind: &str, id: i64) -> crate::MobilityError {
    crate::MobilityError::NotFound(format!("{} #{}", kind, id))
}

/// Reject an update that changes nothing.
pub(crate) fn nothing_to_update() -> crate::MobilityError {
    crate::MobilityError::InvalidInput("Nothing to update".to_string())
}
