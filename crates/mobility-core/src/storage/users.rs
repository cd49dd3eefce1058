//! `users` table.

use rusqlite::OptionalExtension;

use super::row::UserRow;
use super::{in_id_order, placeholders, Store};
use crate::error::{MobilityError, Result};
use crate::model::{SealedUser, Stored};

impl Store {
    pub fn insert_user(&self, user: &SealedUser) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (username, password_hash, role, first_name, last_name, registered_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            (
                &user.username,
                &user.password_hash,
                user.role.as_str(),
                &user.first_name,
                &user.last_name,
                user.registered_at.to_rfc3339(),
            ),
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_user(&self, id: i64) -> Result<Option<Stored<SealedUser>>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", UserRow::COLUMNS),
                [id],
                UserRow::read,
            )
            .optional()?;
        row.map(Stored::try_from).transpose()
    }

    pub fn list_users(&self) -> Result<Vec<Stored<SealedUser>>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY id",
            UserRow::COLUMNS
        ))?;
        let rows = stmt.query_map([], UserRow::read)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(Stored::try_from(row?)?);
        }
        Ok(users)
    }

    /// Fetch users by id, in the order given.
    pub fn fetch_users(&self, ids: &[i64]) -> Result<Vec<Stored<SealedUser>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE id IN ({})",
            UserRow::COLUMNS,
            placeholders(ids.len())
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), UserRow::read)?;
        let mut users = Vec::new();
        for row in rows {
            let user = Stored::try_from(row?)?;
            users.push((user.id, user));
        }
        Ok(in_id_order(ids, users))
    }

    /// Overwrite the profile columns; the password hash is left alone.
    pub fn update_user(&self, id: i64, user: &SealedUser) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE users SET username = ?, role = ?, first_name = ?, last_name = ? WHERE id = ?",
            (
                &user.username,
                user.role.as_str(),
                &user.first_name,
                &user.last_name,
                id,
            ),
        )?;
        if changed == 0 {
            return Err(MobilityError::NotFound(format!("User #{}", id)));
        }
        Ok(())
    }

    pub fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            (password_hash, id),
        )?;
        if changed == 0 {
            return Err(MobilityError::NotFound(format!("User #{}", id)));
        }
        Ok(())
    }

    /// Delete a user and cancel any restore request it still has open.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE restore_codes SET state = 'cancelled' \
             WHERE requester_id = ? AND state IN ('requested', 'code_issued')",
            [id],
        )?;
        let deleted = tx.execute("DELETE FROM users WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Count a failed login; returns the consecutive failure count.
    pub fn record_failed_login(&self, id: i64) -> Result<u32> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE users SET failed_logins = failed_logins + 1 WHERE id = ?",
            [id],
        )?;
        let count = conn.query_row(
            "SELECT failed_logins FROM users WHERE id = ?",
            [id],
            |row| row.get("failed_logins"),
        )?;
        Ok(count)
    }

    pub fn clear_failed_logins(&self, id: i64) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("UPDATE users SET failed_logins = 0 WHERE id = ?", [id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto::{FieldCipher, FieldKey};
    use crate::model::{NewUser, Role};
    use crate::storage::Store;

    fn sealed(cipher: &FieldCipher, username: &str) -> crate::model::SealedUser {
        NewUser::new(username, "Str0ng!Password", "Jan", "Smit", Role::Operator)
            .seal(cipher)
            .unwrap()
    }

    #[test]
    fn test_insert_get_update_delete() {
        let cipher = FieldCipher::new(FieldKey::generate());
        let store = Store::open_in_memory().unwrap();

        let id = store.insert_user(&sealed(&cipher, "operator1")).unwrap();
        let mut user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.username(&cipher).unwrap(), "operator1");

        user.record.role = Role::Administrator;
        store.update_user(id, &user.record).unwrap();
        assert_eq!(store.get_user(id).unwrap().unwrap().role(), Role::Administrator);

        assert!(store.delete_user(id).unwrap());
        assert!(store.get_user(id).unwrap().is_none());
        assert!(!store.delete_user(id).unwrap());
    }

    #[test]
    fn test_fetch_users_preserves_requested_order() {
        let cipher = FieldCipher::new(FieldKey::generate());
        let store = Store::open_in_memory().unwrap();
        let first = store.insert_user(&sealed(&cipher, "operator1")).unwrap();
        let second = store.insert_user(&sealed(&cipher, "operator2")).unwrap();

        let users = store.fetch_users(&[second, first]).unwrap();
        let ids: Vec<i64> = users.iter().map(|user| user.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_failed_login_counter() {
        let cipher = FieldCipher::new(FieldKey::generate());
        let store = Store::open_in_memory().unwrap();
        let id = store.insert_user(&sealed(&cipher, "operator1")).unwrap();

        assert_eq!(store.record_failed_login(id).unwrap(), 1);
        assert_eq!(store.record_failed_login(id).unwrap(), 2);
        store.clear_failed_logins(id).unwrap();
        assert_eq!(store.record_failed_login(id).unwrap(), 1);
    }
}
