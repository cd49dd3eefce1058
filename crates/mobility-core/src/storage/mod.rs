//! SQLite persistence adapter.
//!
//! A single `Store` owns the connection to the live database file. Table
//! operations are grouped per entity in submodules as `impl Store` blocks;
//! they move sealed records in and out and never see plaintext.

mod backups;
mod logs;
mod row;
pub(crate) mod schema;
mod scooters;
mod travellers;
mod users;

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, DatabaseName};
use tracing::debug;

use crate::error::{MobilityError, Result};

pub(crate) use row::parse_timestamp;

/// One scanned row: its id and the requested columns, in request order.
pub(crate) type ScannedRow<'a> = (i64, &'a [Option<Vec<u8>>]);

/// The live record store.
pub struct Store {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let created = !path.exists();
        let conn = Connection::open(path)?;
        if created {
            crate::fs::restrict_permissions(path)?;
        }
        Self::init(path.to_path_buf(), conn)
    }

    /// A throwaway store, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(PathBuf::from(":memory:"), Connection::open_in_memory()?)
    }

    fn init(path: PathBuf, conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::initialize(&conn)?;
        debug!(path = %path.display(), "store opened");
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    pub(crate) fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MobilityError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Serialize the whole database into an in-memory SQLite image.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let conn = self.lock_conn()?;
        let data = conn.serialize(DatabaseName::Main)?;
        Ok(data.to_vec())
    }

    /// Stream `columns` of every row of `table` where at least one of them is
    /// non-null, in id order, until `visit` breaks.
    ///
    /// Only the named columns are read. Returns the number of rows visited.
    pub(crate) fn scan_columns<F>(&self, table: &str, columns: &[&str], mut visit: F) -> Result<usize>
    where
        F: FnMut(ScannedRow<'_>) -> ControlFlow<()>,
    {
        if columns.is_empty() {
            return Ok(0);
        }
        let filter: Vec<String> = columns
            .iter()
            .map(|column| format!("{} IS NOT NULL", column))
            .collect();
        let sql = format!(
            "SELECT id, {} FROM {} WHERE {} ORDER BY id",
            columns.join(", "),
            table,
            filter.join(" OR ")
        );

        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut visited = 0;
        let mut values = Vec::with_capacity(columns.len());
        while let Some(row) = rows.next()? {
            visited += 1;
            let id: i64 = row.get("id")?;
            values.clear();
            for column in columns {
                values.push(row.get::<_, Option<Vec<u8>>>(*column)?);
            }
            if visit((id, values.as_slice())).is_break() {
                break;
            }
        }
        Ok(visited)
    }

    /// Replace every data table with the contents of the SQLite file at `image`.
    ///
    /// Runs in one transaction: either all data tables are replaced or none.
    /// Live reset codes are kept for users that still exist afterwards.
    pub(crate) fn replace_data_from(&self, image: &Path) -> Result<()> {
        let image = image
            .to_str()
            .ok_or_else(|| MobilityError::RestoreFailed("Non UTF-8 image path".to_string()))?;
        let mut conn = self.lock_conn()?;
        conn.execute("ATTACH DATABASE ?1 AS restored", [image])?;
        let copied = Self::copy_data_tables(&mut conn);
        let detached = conn.execute_batch("DETACH DATABASE restored");
        copied?;
        detached?;
        Ok(())
    }

    fn copy_data_tables(conn: &mut Connection) -> Result<()> {
        schema::check_format_version(conn, "restored")?;
        let tx = conn.transaction()?;
        // Deleting users cascades to reset_codes, so park the live rows first
        tx.execute_batch(
            "DROP TABLE IF EXISTS temp.kept_reset_codes;
             CREATE TEMP TABLE kept_reset_codes AS
                 SELECT user_id, code_hash, created_at, used FROM main.reset_codes;",
        )?;
        for table in schema::DATA_TABLES.iter().rev() {
            tx.execute(&format!("DELETE FROM main.{}", table.name), [])?;
        }
        for table in schema::DATA_TABLES {
            tx.execute(
                &format!(
                    "INSERT INTO main.{0} ({1}) SELECT {1} FROM restored.{0}",
                    table.name, table.columns
                ),
                [],
            )?;
        }
        tx.execute_batch(
            "INSERT INTO main.reset_codes (user_id, code_hash, created_at, used)
                 SELECT user_id, code_hash, created_at, used FROM temp.kept_reset_codes
                 WHERE user_id IN (SELECT id FROM main.users);
             DROP TABLE temp.kept_reset_codes;",
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// `?, ?, ?` for an `IN` list of `count` values.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Put `records` into the order of `ids`, dropping ids with no record.
fn in_id_order<T>(ids: &[i64], mut records: Vec<(i64, T)>) -> Vec<T> {
    let mut ordered = Vec::with_capacity(records.len());
    for id in ids {
        if let Some(pos) = records.iter().position(|(record_id, _)| record_id == id) {
            ordered.push(records.swap_remove(pos).1);
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_schema_and_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mobility.db");
        let store = Store::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), path);
        let conn = store.lock_conn().unwrap();
        let version: String = conn
            .query_row("SELECT value FROM meta WHERE key = 'format_version'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, schema::FORMAT_VERSION);
    }

    #[test]
    fn test_reopen_keeps_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mobility.db");
        drop(Store::open(&path).unwrap());
        assert!(Store::open(&path).is_ok());
    }

    #[test]
    fn test_snapshot_is_sqlite_image() {
        let store = Store::open_in_memory().unwrap();
        let image = store.snapshot().unwrap();
        assert!(image.starts_with(b"SQLite format 3\0"));
    }

    #[test]
    fn test_in_id_order() {
        let records = vec![(3, "c"), (1, "a"), (2, "b")];
        assert_eq!(in_id_order(&[2, 9, 3, 1], records), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
