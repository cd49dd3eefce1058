//! Vault configuration.
//!
//! A `VaultConfig` is constructed once at process start (the CLI reads it from
//! TOML) and handed to [`crate::Vault::open`]. Nothing in the core reads
//! configuration from globals or the environment.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{MobilityError, Result};

/// Default lifetime of an issued restore code.
pub const DEFAULT_RESTORE_CODE_TTL_MINUTES: i64 = 24 * 60;

/// Default lifetime of a temporary password reset code.
pub const DEFAULT_RESET_CODE_TTL_MINUTES: i64 = 60;

/// Consecutive failed logins after which attempts are flagged suspicious.
pub const DEFAULT_MAX_FAILED_LOGINS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Live SQLite store
    pub store_path: PathBuf,

    /// Directory holding encrypted backup artifacts and pre-restore snapshots
    pub backup_dir: PathBuf,

    /// Age identity file used for field encryption
    pub key_path: PathBuf,

    #[serde(default = "default_restore_code_ttl_minutes")]
    pub restore_code_ttl_minutes: i64,

    #[serde(default = "default_reset_code_ttl_minutes")]
    pub reset_code_ttl_minutes: i64,

    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: u32,

    /// The built-in super identity; never stored in the users table.
    pub super_admin: SuperAdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperAdminConfig {
    pub username: String,

    /// Argon2id PHC string
    pub password_hash: String,
}

impl VaultConfig {
    /// Lay out a vault under `data_dir` with default lifetimes.
    pub fn new(data_dir: &Path, key_path: PathBuf, super_admin: SuperAdminConfig) -> Self {
        Self {
            store_path: data_dir.join("mobility.db"),
            backup_dir: data_dir.join("backups"),
            key_path,
            restore_code_ttl_minutes: DEFAULT_RESTORE_CODE_TTL_MINUTES,
            reset_code_ttl_minutes: DEFAULT_RESET_CODE_TTL_MINUTES,
            max_failed_logins: DEFAULT_MAX_FAILED_LOGINS,
            super_admin,
        }
    }

    /// Reject lifetimes that are negative or too large to represent.
    ///
    /// [`crate::Vault`] runs this once when it opens.
    pub fn validate(&self) -> Result<()> {
        ttl("restore_code_ttl_minutes", self.restore_code_ttl_minutes)?;
        ttl("reset_code_ttl_minutes", self.reset_code_ttl_minutes)?;
        Ok(())
    }

    /// Zero for a lifetime that [`VaultConfig::validate`] would reject.
    pub fn restore_code_ttl(&self) -> Duration {
        ttl("restore_code_ttl_minutes", self.restore_code_ttl_minutes)
            .unwrap_or_else(|_| Duration::zero())
    }

    /// Zero for a lifetime that [`VaultConfig::validate`] would reject.
    pub fn reset_code_ttl(&self) -> Duration {
        ttl("reset_code_ttl_minutes", self.reset_code_ttl_minutes)
            .unwrap_or_else(|_| Duration::zero())
    }
}

fn ttl(name: &str, minutes: i64) -> Result<Duration> {
    if minutes < 0 {
        return Err(MobilityError::InvalidInput(format!(
            "{} must not be negative (got {})",
            name, minutes
        )));
    }
    Duration::try_minutes(minutes).ok_or_else(|| {
        MobilityError::InvalidInput(format!("{} is out of range (got {})", name, minutes))
    })
}

fn default_restore_code_ttl_minutes() -> i64 {
    DEFAULT_RESTORE_CODE_TTL_MINUTES
}

fn default_reset_code_ttl_minutes() -> i64 {
    DEFAULT_RESET_CODE_TTL_MINUTES
}

fn default_max_failed_logins() -> u32 {
    DEFAULT_MAX_FAILED_LOGINS
}
