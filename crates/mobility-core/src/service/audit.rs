//! The persisted audit log.

use tracing::warn;

use crate::auth::{guard, Actor, ADMINS};
use crate::error::Result;
use crate::model::{LogEntry, NewLogEntry};
use crate::Vault;

impl Vault {
    /// Append an entry. Failing to log never fails the logged operation.
    pub(crate) fn audit(&self, entry: NewLogEntry) {
        let stored = entry
            .seal(&self.cipher)
            .and_then(|sealed| self.store.insert_log(&sealed));
        if let Err(err) = stored {
            warn!(error = %err, "failed to append audit log entry");
        }
    }

    /// Decrypt the log, newest first, and mark everything returned as seen.
    pub fn list_logs(&self, actor: &Actor) -> Result<Vec<LogEntry>> {
        guard(actor, ADMINS, "read the audit log", || -> Result<_> {
            let sealed = self.store.list_logs()?;
            let mut entries = Vec::with_capacity(sealed.len());
            for stored in &sealed {
                match stored.open(&self.cipher) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => warn!(id = stored.id, error = %err, "skipping undecryptable log entry"),
                }
            }
            if let Some(newest) = sealed.first() {
                self.store.mark_logs_seen(newest.id)?;
            }
            Ok(entries)
        })?
    }

    /// Suspicious entries nobody has looked at yet.
    pub fn unseen_suspicious_count(&self, actor: &Actor) -> Result<u32> {
        guard(actor, ADMINS, "read the audit log", || -> Result<_> {
            self.store.unseen_suspicious_count()
        })?
    }
}
