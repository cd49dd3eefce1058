//! Audit log entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crypto::FieldCipher;
use crate::error::Result;
use crate::model::Stored;

/// An event to append to the audit log.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub username: String,
    pub description: String,
    pub additional_info: String,
    pub suspicious: bool,
}

impl NewLogEntry {
    pub fn new(username: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            description: description.into(),
            additional_info: String::new(),
            suspicious: false,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = info.into();
        self
    }

    pub fn suspicious(mut self, suspicious: bool) -> Self {
        self.suspicious = suspicious;
        self
    }

    pub fn seal(&self, cipher: &FieldCipher) -> Result<SealedLogEntry> {
        Ok(SealedLogEntry {
            logged_at: Utc::now(),
            username: cipher.encrypt_field(&self.username)?,
            description: cipher.encrypt_field(&self.description)?,
            additional_info: cipher.encrypt_field(&self.additional_info)?,
            suspicious: self.suspicious,
            seen: false,
        })
    }
}

/// A log entry as persisted; the text columns are encrypted.
#[derive(Debug, Clone)]
pub struct SealedLogEntry {
    pub(crate) logged_at: DateTime<Utc>,
    pub(crate) username: Vec<u8>,
    pub(crate) description: Vec<u8>,
    pub(crate) additional_info: Vec<u8>,
    pub(crate) suspicious: bool,
    pub(crate) seen: bool,
}

impl Stored<SealedLogEntry> {
    pub fn open(&self, cipher: &FieldCipher) -> Result<LogEntry> {
        Ok(LogEntry {
            id: self.id,
            logged_at: self.logged_at,
            username: cipher.decrypt_field(&self.username)?,
            description: cipher.decrypt_field(&self.description)?,
            additional_info: cipher.decrypt_field(&self.additional_info)?,
            suspicious: self.suspicious,
            seen: self.seen,
        })
    }
}

/// Decrypted audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub logged_at: DateTime<Utc>,
    pub username: String,
    pub description: String,
    pub additional_info: String,
    pub suspicious: bool,
    pub seen: bool,
}
