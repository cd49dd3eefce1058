//! Backups and restore codes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::crypto::verify_secret;
use crate::error::{MobilityError, Result};

/// Metadata for one backup artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backup {
    pub id: i64,
    /// File name inside the backup directory
    pub file_name: String,
    /// `None` when created by the built-in super identity
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Backup {
    /// Whether this backup was taken strictly before `other`.
    pub fn is_older_than(&self, other: &Backup) -> bool {
        (self.created_at, self.id) < (other.created_at, other.id)
    }
}

/// Lifecycle of a restore request for one (backup, requester) pair.
///
/// ```text
/// (no row) --request--> Requested --issue--> CodeIssued --redeem--> Used
///                           |                    |
///                           +------cancel--------+--> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreState {
    Requested,
    CodeIssued,
    Used,
    Cancelled,
}

impl RestoreState {
    pub fn as_str(self) -> &'static str {
        match self {
            RestoreState::Requested => "requested",
            RestoreState::CodeIssued => "code_issued",
            RestoreState::Used => "used",
            RestoreState::Cancelled => "cancelled",
        }
    }

    /// Requested and issued rows block a new request for the same pair.
    pub fn is_live(self) -> bool {
        matches!(self, RestoreState::Requested | RestoreState::CodeIssued)
    }

    pub fn issue(self) -> Result<Self> {
        match self {
            RestoreState::Requested => Ok(RestoreState::CodeIssued),
            other => Err(Self::illegal(other, "issue a code")),
        }
    }

    pub fn redeem(self) -> Result<Self> {
        match self {
            RestoreState::CodeIssued => Ok(RestoreState::Used),
            _ => Err(MobilityError::InvalidCode),
        }
    }

    pub fn cancel(self) -> Result<Self> {
        if self.is_live() {
            Ok(RestoreState::Cancelled)
        } else {
            Err(Self::illegal(self, "cancel"))
        }
    }

    fn illegal(state: RestoreState, action: &str) -> MobilityError {
        MobilityError::InvalidInput(format!("Cannot {} for a request that is {}", action, state))
    }
}

impl fmt::Display for RestoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestoreState {
    type Err = MobilityError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "requested" => Ok(RestoreState::Requested),
            "code_issued" => Ok(RestoreState::CodeIssued),
            "used" => Ok(RestoreState::Used),
            "cancelled" => Ok(RestoreState::Cancelled),
            other => Err(MobilityError::Storage(format!(
                "Unknown restore state \"{}\"",
                other
            ))),
        }
    }
}

/// A restore request and, once issued, its hashed single-use code.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreCode {
    pub id: i64,
    pub backup_id: i64,
    pub requester_id: i64,
    #[serde(skip)]
    pub(crate) code_hash: Option<String>,
    pub state: RestoreState,
    pub requested_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
}

impl RestoreCode {
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.issued_at {
            Some(issued_at) => now - issued_at > ttl,
            None => false,
        }
    }

    /// True when `code` is this row's unused, unexpired secret.
    ///
    /// `code` must already be in normalized form.
    pub(crate) fn accepts(&self, code: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        if self.state != RestoreState::CodeIssued || self.is_expired(ttl, now) {
            return false;
        }
        self.code_hash
            .as_deref()
            .is_some_and(|hash| verify_secret(code, hash))
    }
}
