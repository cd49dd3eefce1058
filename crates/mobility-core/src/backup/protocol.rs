use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::{guard, Actor, ADMINISTRATOR, ADMINS, SUPER_ADMINISTRATOR};
use crate::backup::artifact;
use crate::crypto::{generate_restore_code, hash_secret, normalize_code};
use crate::error::{MobilityError, Result};
use crate::model::{Backup, NewLogEntry, RestoreCode, RestoreState};
use crate::service::not_found;
use crate::Vault;

/// A freshly minted restore code. `code` is the only copy of the clear value.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCode {
    pub request: RestoreCode,
    pub code: String,
}

/// Outcome of a completed restore.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub backup_id: i64,
    /// Encrypted image of the store as it was just before the restore
    pub snapshot_path: PathBuf,
    /// Backups deleted by the cleanup policy
    pub removed_backups: Vec<i64>,
    /// Artifacts that could not be deleted; their metadata is gone regardless
    pub failed_artifact_removals: usize,
}

/// Which backups a restore deletes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cleanup {
    /// Only the backup that was restored (code-redeemed restore)
    RestoredBackup,
    /// Every backup strictly older than the restored one (direct restore)
    OlderBackups,
}

impl Vault {
    /// Serialize the live store into a new encrypted artifact.
    ///
    /// The artifact is written before the metadata row; if the row cannot be
    /// recorded the artifact is removed again.
    pub fn create_backup(&self, actor: &Actor) -> Result<Backup> {
        guard(actor, ADMINS, "create backup", || -> Result<_> {
            let created_at = Utc::now();
            let file_name = artifact::backup_file_name(created_at);
            let path = artifact::artifact_path(&self.config.backup_dir, &file_name)?;

            let image = self.store.snapshot()?;
            artifact::write(&self.cipher, &path, &image)?;

            let id = match self.store.insert_backup(&file_name, actor.user_id(), created_at) {
                Ok(id) => id,
                Err(err) => {
                    artifact::remove(&path);
                    return Err(err);
                }
            };
            let backup = self
                .store
                .get_backup(id)?
                .ok_or_else(|| not_found("Backup", id))?;

            info!(backup = id, "backup created");
            self.audit(
                NewLogEntry::new(actor.username(), "Backup created")
                    .with_info(format!("backup #{}", id)),
            );
            Ok(backup)
        })?
    }

    /// All backups, oldest first.
    pub fn list_backups(&self, actor: &Actor) -> Result<Vec<Backup>> {
        guard(actor, ADMINS, "list backups", || self.store.list_backups())?
    }

    /// Queue a request for a restore code bound to `backup_id` and the caller.
    pub fn request_restore(&self, actor: &Actor, backup_id: i64) -> Result<RestoreCode> {
        guard(actor, ADMINISTRATOR, "request a restore code", || -> Result<_> {
            let requester = Self::requester_id(actor)?;
            if self.store.get_backup(backup_id)?.is_none() {
                return Err(not_found("Backup", backup_id));
            }
            let id = self
                .store
                .insert_restore_request(backup_id, requester, Utc::now())?;

            debug!(request = id, backup = backup_id, "restore requested");
            self.audit(
                NewLogEntry::new(actor.username(), "Restore code requested")
                    .with_info(format!("backup #{}", backup_id)),
            );
            self.load_request(id)
        })?
    }

    /// The caller's own requests, in any state.
    pub fn my_restore_requests(&self, actor: &Actor) -> Result<Vec<RestoreCode>> {
        guard(actor, ADMINISTRATOR, "list restore requests", || -> Result<_> {
            let requester = Self::requester_id(actor)?;
            self.store.restore_codes_for(requester)
        })?
    }

    /// Withdraw one of the caller's own live requests.
    pub fn cancel_request(&self, actor: &Actor, request_id: i64) -> Result<()> {
        guard(actor, ADMINISTRATOR, "cancel a restore request", || -> Result<_> {
            let requester = Self::requester_id(actor)?;
            let request = self.load_request(request_id)?;
            if request.requester_id != requester {
                return Err(not_found("Restore request", request_id));
            }
            self.cancel(actor, request, "Restore request cancelled")
        })?
    }

    /// Requests waiting for a code.
    pub fn pending_requests(&self, actor: &Actor) -> Result<Vec<RestoreCode>> {
        guard(actor, SUPER_ADMINISTRATOR, "list pending restore requests", || {
            self.store.restore_codes_in_state(RestoreState::Requested)
        })?
    }

    /// Mint the code for a pending request and return it in clear, once.
    pub fn issue_code(&self, actor: &Actor, request_id: i64) -> Result<IssuedCode> {
        guard(actor, SUPER_ADMINISTRATOR, "issue a restore code", || -> Result<_> {
            let request = self.load_request(request_id)?;
            request.state.issue()?;

            let code = generate_restore_code();
            let code_hash = hash_secret(&normalize_code(&code))?;
            if !self
                .store
                .issue_restore_code(request_id, &code_hash, Utc::now())?
            {
                return Err(MobilityError::InvalidInput(format!(
                    "Restore request #{} is no longer pending",
                    request_id
                )));
            }

            debug!(request = request_id, "restore code issued");
            self.audit(
                NewLogEntry::new(actor.username(), "Restore code issued").with_info(format!(
                    "request #{} for backup #{}",
                    request_id, request.backup_id
                )),
            );
            Ok(IssuedCode {
                request: self.load_request(request_id)?,
                code,
            })
        })?
    }

    /// Cancel a pending request or an unredeemed code.
    pub fn revoke_code(&self, actor: &Actor, request_id: i64) -> Result<()> {
        guard(actor, SUPER_ADMINISTRATOR, "revoke a restore code", || -> Result<_> {
            let request = self.load_request(request_id)?;
            self.cancel(actor, request, "Restore code revoked")
        })?
    }

    /// Verify `code` against the caller's issued codes and consume the match.
    ///
    /// Returns the bound backup id. The code is marked used here, before any
    /// restore runs, so it can never be replayed.
    pub fn redeem_code(&self, actor: &Actor, code: &str) -> Result<i64> {
        guard(actor, ADMINISTRATOR, "redeem a restore code", || -> Result<_> {
            let requester = Self::requester_id(actor)?;
            let normalized = normalize_code(code);
            let now = Utc::now();
            let ttl = self.config.restore_code_ttl();

            let matched = self
                .store
                .restore_codes_for(requester)?
                .into_iter()
                .find(|candidate| candidate.accepts(&normalized, ttl, now));

            let Some(matched) = matched else {
                self.audit(
                    NewLogEntry::new(actor.username(), "Invalid restore code entered")
                        .suspicious(true),
                );
                return Err(MobilityError::InvalidCode);
            };
            matched.state.redeem()?;
            if !self.store.consume_restore_code(matched.id, now)? {
                return Err(MobilityError::InvalidCode);
            }

            debug!(request = matched.id, backup = matched.backup_id, "restore code redeemed");
            self.audit(
                NewLogEntry::new(actor.username(), "Restore code redeemed")
                    .with_info(format!("backup #{}", matched.backup_id)),
            );
            Ok(matched.backup_id)
        })?
    }

    /// Redeem `code` and restore the backup it is bound to.
    ///
    /// Afterwards that backup and its codes are deleted.
    pub fn restore_with_code(&self, actor: &Actor, code: &str) -> Result<RestoreReport> {
        let backup_id = self.redeem_code(actor, code)?;
        self.perform_restore(actor, backup_id, Cleanup::RestoredBackup)
    }

    /// Restore a backup without a code.
    ///
    /// Afterwards every backup older than the restored one is deleted.
    pub fn restore_backup(&self, actor: &Actor, backup_id: i64) -> Result<RestoreReport> {
        guard(actor, SUPER_ADMINISTRATOR, "restore a backup directly", || {
            self.perform_restore(actor, backup_id, Cleanup::OlderBackups)
        })?
    }

    fn perform_restore(&self, actor: &Actor, backup_id: i64, cleanup: Cleanup) -> Result<RestoreReport> {
        let backup = self
            .store
            .get_backup(backup_id)?
            .ok_or_else(|| not_found("Backup", backup_id))?;
        let backup_dir = &self.config.backup_dir;
        let image = artifact::read(
            &self.cipher,
            &artifact::artifact_path(backup_dir, &backup.file_name)?,
        )?;

        let taken_at = Utc::now();
        let snapshot_path = backup_dir.join(artifact::snapshot_file_name(taken_at));
        artifact::write(&self.cipher, &snapshot_path, &self.store.snapshot()?)?;

        let staged = artifact::stage(backup_dir, &image)?;
        self.store.replace_data_from(staged.path()).map_err(|e| {
            MobilityError::RestoreFailed(format!(
                "{}; the live store is unchanged and a snapshot is at {}",
                e,
                snapshot_path.display()
            ))
        })?;
        drop(staged);

        let doomed: Vec<Backup> = match cleanup {
            Cleanup::RestoredBackup => vec![backup.clone()],
            Cleanup::OlderBackups => self
                .store
                .list_backups()?
                .into_iter()
                .filter(|candidate| candidate.is_older_than(&backup))
                .collect(),
        };
        let removed_backups: Vec<i64> = doomed.iter().map(|b| b.id).collect();
        self.store.delete_backups(&removed_backups)?;

        let mut failed_artifact_removals = 0;
        for doomed in &doomed {
            let removed = artifact::artifact_path(backup_dir, &doomed.file_name)
                .map(|path| artifact::remove(&path))
                .unwrap_or(false);
            if !removed {
                failed_artifact_removals += 1;
            }
        }

        info!(
            backup = backup_id,
            removed = removed_backups.len(),
            "restore completed"
        );
        self.audit(
            NewLogEntry::new(actor.username(), "Backup restored").with_info(format!(
                "backup #{}, removed backups: {:?}",
                backup_id, removed_backups
            )),
        );
        Ok(RestoreReport {
            backup_id,
            snapshot_path,
            removed_backups,
            failed_artifact_removals,
        })
    }

    fn cancel(&self, actor: &Actor, request: RestoreCode, description: &str) -> Result<()> {
        request.state.cancel()?;
        if !self.store.cancel_restore_code(request.id)? {
            return Err(MobilityError::InvalidInput(format!(
                "Restore request #{} is no longer open",
                request.id
            )));
        }
        debug!(request = request.id, "restore request cancelled");
        self.audit(
            NewLogEntry::new(actor.username(), description)
                .with_info(format!("request #{} for backup #{}", request.id, request.backup_id)),
        );
        Ok(())
    }

    fn load_request(&self, id: i64) -> Result<RestoreCode> {
        self.store
            .get_restore_code(id)?
            .ok_or_else(|| not_found("Restore request", id))
    }

    /// Restore codes are bound to a stored identity; the built-in identity has none.
    fn requester_id(actor: &Actor) -> Result<i64> {
        actor.user_id().ok_or_else(|| {
            MobilityError::InvalidInput(
                "Restore codes can only be requested by a stored Administrator".to_string(),
            )
        })
    }
}
