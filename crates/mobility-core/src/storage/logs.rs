//! `logs` table.

use super::row::LogRow;
use super::Store;
use crate::error::Result;
use crate::model::{SealedLogEntry, Stored};

impl Store {
    pub fn insert_log(&self, entry: &SealedLogEntry) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO logs (logged_at, username, description, additional_info, suspicious, seen)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            (
                entry.logged_at.to_rfc3339(),
                &entry.username,
                &entry.description,
                &entry.additional_info,
                entry.suspicious,
                entry.seen,
            ),
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All entries, newest first.
    pub fn list_logs(&self) -> Result<Vec<Stored<SealedLogEntry>>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM logs ORDER BY id DESC",
            LogRow::COLUMNS
        ))?;
        let rows = stmt.query_map([], LogRow::read)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(Stored::try_from(row?)?);
        }
        Ok(entries)
    }

    /// Mark entries up to and including `up_to` as seen.
    pub fn mark_logs_seen(&self, up_to: i64) -> Result<usize> {
        let conn = self.lock_conn()?;
        Ok(conn.execute(
            "UPDATE logs SET seen = 1 WHERE id <= ? AND seen = 0",
            [up_to],
        )?)
    }

    pub fn unseen_suspicious_count(&self) -> Result<u32> {
        let conn = self.lock_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM logs WHERE suspicious = 1 AND seen = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto::{FieldCipher, FieldKey};
    use crate::model::NewLogEntry;
    use crate::storage::Store;

    #[test]
    fn test_logs_newest_first_and_seen_tracking() {
        let cipher = FieldCipher::new(FieldKey::generate());
        let store = Store::open_in_memory().unwrap();
        let first = NewLogEntry::new("operator1", "Logged in").seal(&cipher).unwrap();
        let second = NewLogEntry::new("unknown", "Unsuccessful login")
            .suspicious(true)
            .seal(&cipher)
            .unwrap();
        store.insert_log(&first).unwrap();
        let last = store.insert_log(&second).unwrap();

        let entries = store.list_logs().unwrap();
        assert_eq!(entries[0].id, last);
        assert_eq!(entries[0].open(&cipher).unwrap().description, "Unsuccessful login");
        assert_eq!(store.unseen_suspicious_count().unwrap(), 1);

        assert_eq!(store.mark_logs_seen(last).unwrap(), 2);
        assert_eq!(store.unseen_suspicious_count().unwrap(), 0);
    }
}
