//! `backups`, `restore_codes` and `reset_codes` tables.
//!
//! State changes on restore codes are compare-and-swap updates: each one
//! names the state it expects to leave and reports whether a row moved, so
//! two callers racing on the same code cannot both succeed.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, ToSql};

use super::row::{BackupRow, ResetCodeRow, RestoreCodeRow};
use super::{placeholders, Store};
use crate::error::{MobilityError, Result};
use crate::model::{Backup, ResetCode, RestoreCode, RestoreState};

impl Store {
    pub fn insert_backup(
        &self,
        file_name: &str,
        created_by: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO backups (file_name, created_by, created_at) VALUES (?, ?, ?)",
            (
                file_name,
                created_by,
                created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ),
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_backup(&self, id: i64) -> Result<Option<Backup>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM backups WHERE id = ?", BackupRow::COLUMNS),
                [id],
                BackupRow::read,
            )
            .optional()?;
        row.map(Backup::try_from).transpose()
    }

    /// All backups, oldest first.
    pub fn list_backups(&self) -> Result<Vec<Backup>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM backups ORDER BY created_at, id",
            BackupRow::COLUMNS
        ))?;
        let rows = stmt.query_map([], BackupRow::read)?;
        let mut backups = Vec::new();
        for row in rows {
            backups.push(Backup::try_from(row?)?);
        }
        Ok(backups)
    }

    /// Delete backup rows; their restore codes go with them.
    pub fn delete_backups(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            &format!("DELETE FROM backups WHERE id IN ({})", placeholders(ids.len())),
            rusqlite::params_from_iter(ids.iter()),
        )?;
        Ok(deleted)
    }

    /// Queue a restore request with no secret yet.
    ///
    /// Fails with `AlreadyRequested` while the pair has a live request or code.
    pub fn insert_restore_request(
        &self,
        backup_id: i64,
        requester_id: i64,
        requested_at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.lock_conn()?;
        let inserted = conn.execute(
            "INSERT INTO restore_codes (backup_id, requester_id, state, requested_at) VALUES (?, ?, ?, ?)",
            (
                backup_id,
                requester_id,
                RestoreState::Requested.as_str(),
                requested_at.to_rfc3339(),
            ),
        );
        match inserted {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(MobilityError::AlreadyRequested { backup_id })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn get_restore_code(&self, id: i64) -> Result<Option<RestoreCode>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM restore_codes WHERE id = ?", RestoreCodeRow::COLUMNS),
                [id],
                RestoreCodeRow::read,
            )
            .optional()?;
        row.map(RestoreCode::try_from).transpose()
    }

    /// Restore codes in `state`, oldest request first.
    pub fn restore_codes_in_state(&self, state: RestoreState) -> Result<Vec<RestoreCode>> {
        self.query_restore_codes("state = ?", &[&state.as_str()])
    }

    /// Every request `requester_id` has made, oldest first.
    pub fn restore_codes_for(&self, requester_id: i64) -> Result<Vec<RestoreCode>> {
        self.query_restore_codes("requester_id = ?", &[&requester_id])
    }

    fn query_restore_codes(&self, filter: &str, params: &[&dyn ToSql]) -> Result<Vec<RestoreCode>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM restore_codes WHERE {} ORDER BY requested_at, id",
            RestoreCodeRow::COLUMNS,
            filter
        ))?;
        let rows = stmt.query_map(params, RestoreCodeRow::read)?;
        let mut codes = Vec::new();
        for row in rows {
            codes.push(RestoreCode::try_from(row?)?);
        }
        Ok(codes)
    }

    /// Attach a code hash to a pending request. False if it was not pending.
    pub fn issue_restore_code(&self, id: i64, code_hash: &str, issued_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE restore_codes SET state = ?, code_hash = ?, issued_at = ? WHERE id = ? AND state = ?",
            (
                RestoreState::CodeIssued.as_str(),
                code_hash,
                issued_at.to_rfc3339(),
                id,
                RestoreState::Requested.as_str(),
            ),
        )?;
        Ok(changed == 1)
    }

    /// Mark an issued code used. False if it was no longer issued.
    pub fn consume_restore_code(&self, id: i64, used_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE restore_codes SET state = ?, used_at = ? WHERE id = ? AND state = ?",
            (
                RestoreState::Used.as_str(),
                used_at.to_rfc3339(),
                id,
                RestoreState::CodeIssued.as_str(),
            ),
        )?;
        Ok(changed == 1)
    }

    /// Cancel a live request or code. False if it was not live.
    pub fn cancel_restore_code(&self, id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE restore_codes SET state = ? WHERE id = ? AND state IN (?, ?)",
            (
                RestoreState::Cancelled.as_str(),
                id,
                RestoreState::Requested.as_str(),
                RestoreState::CodeIssued.as_str(),
            ),
        )?;
        Ok(changed == 1)
    }

    /// Store a fresh reset code for `user_id`, replacing any previous one.
    pub fn upsert_reset_code(&self, user_id: i64, code_hash: &str, created_at: DateTime<Utc>) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO reset_codes (user_id, code_hash, created_at, used) VALUES (?, ?, ?, 0)
            ON CONFLICT (user_id) DO UPDATE SET
                code_hash = excluded.code_hash,
                created_at = excluded.created_at,
                used = 0
            "#,
            (user_id, code_hash, created_at.to_rfc3339()),
        )?;
        Ok(())
    }

    pub fn get_reset_code(&self, user_id: i64) -> Result<Option<ResetCode>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT user_id, code_hash, created_at, used FROM reset_codes WHERE user_id = ?",
                [user_id],
                ResetCodeRow::read,
            )
            .optional()?;
        row.map(ResetCode::try_from).transpose()
    }

    /// Mark the reset code used. False if there was no unused code.
    pub fn consume_reset_code(&self, user_id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE reset_codes SET used = 1 WHERE user_id = ? AND used = 0",
            [user_id],
        )?;
        Ok(changed == 1)
    }
}
