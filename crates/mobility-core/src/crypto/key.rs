//! The process-wide field encryption key.
//!
//! The key is an Age X25519 identity kept in a file readable only by the
//! owner. It is loaded once at startup; any failure to load it surfaces as
//! `KeyUnavailable` and the process must not continue.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use age::secrecy::ExposeSecret;
use age::x25519::{Identity, Recipient};
use zeroize::Zeroizing;

use crate::error::{MobilityError, Result};

/// Field encryption key (Age X25519 identity).
#[derive(Clone)]
pub struct FieldKey {
    identity: Identity,
}

impl FieldKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            identity: Identity::generate(),
        }
    }

    /// Parse a key from its `AGE-SECRET-KEY-1...` encoding.
    ///
    /// Blank lines and `#` comments (as written by `age-keygen`) are skipped.
    pub fn parse(contents: &str) -> Result<Self> {
        let line = contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .ok_or_else(|| MobilityError::KeyUnavailable("Key file is empty".to_string()))?;
        let identity = Identity::from_str(line)
            .map_err(|e| MobilityError::KeyUnavailable(format!("Malformed key: {}", e)))?;
        Ok(Self { identity })
    }

    /// Load the key from `path`.
    ///
    /// # Errors
    ///
    /// Returns `MobilityError::KeyUnavailable` if the file is missing,
    /// unreadable or does not contain a valid identity.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map(Zeroizing::new).map_err(|e| {
            MobilityError::KeyUnavailable(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    /// Write the key to a new owner-only file at `path`.
    ///
    /// Refuses to overwrite an existing key file.
    pub fn write_new(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                MobilityError::Storage(format!("Cannot create key file {}: {}", path.display(), e))
            })?;
        crate::fs::restrict_permissions(path)?;

        let secret = self.identity.to_string();
        let contents = Zeroizing::new(format!(
            "# public key: {}\n{}\n",
            self.recipient(),
            secret.expose_secret()
        ));
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn recipient(&self) -> Recipient {
        self.identity.to_public()
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldKey")
            .field("identity", &"[REDACTED]")
            .finish()
    }
}
