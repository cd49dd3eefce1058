//! Encrypted entity model.
//!
//! Every entity follows the same shape:
//! - `NewX`: the plain field bundle handed in by a collaborator
//! - `SealedX`: validated, with every sensitive field encrypted; the only
//!   form that reaches storage
//! - `X`: the fully decrypted view returned to callers
//! - `XUpdate`: a partial update, each field validated before persistence
//!
//! Sealing performs presence checks, format checks, cross-field checks and
//! then encryption, in that order. Any failed check is a
//! `MobilityError::Validation` naming the field; nothing partial is returned.

pub mod log;
pub mod restore;
pub mod role;
pub mod scooter;
pub mod traveller;
pub mod user;
pub mod validate;

use std::ops::Deref;

pub use log::{LogEntry, NewLogEntry, SealedLogEntry};
pub use restore::{Backup, RestoreCode, RestoreState};
pub use role::Role;
pub use scooter::{NewScooter, Scooter, ScooterUpdate, SealedScooter};
pub use traveller::{NewTraveller, SealedTraveller, Traveller, TravellerUpdate};
pub use user::{NewUser, ResetCode, SealedUser, User, UserUpdate};

/// A sealed record together with its storage identifier.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub id: i64,
    pub record: T,
}

impl<T> Stored<T> {
    pub fn new(id: i64, record: T) -> Self {
        Self { id, record }
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}
