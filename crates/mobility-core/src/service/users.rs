//! Identity management.

use std::ops::ControlFlow;

use tracing::warn;

use crate::auth::{guard, policy, Actor, ADMINS};
use crate::error::{MobilityError, Result};
use crate::model::{validate, NewLogEntry, NewUser, User, UserUpdate};
use crate::search::{SearchQuery, SearchResults};
use crate::service::{not_found, nothing_to_update};
use crate::Vault;

impl Vault {
    /// Find a stored identity by username, decrypting the username column.
    pub(crate) fn find_user_id(&self, username: &str) -> Result<Option<i64>> {
        let wanted = username.trim().to_lowercase();
        let mut found = None;
        self.store.scan_columns("users", &["username"], |(id, values)| {
            let Some(Some(ciphertext)) = values.first() else {
                return ControlFlow::Continue(());
            };
            match self.cipher.decrypt_field(ciphertext) {
                Ok(name) if name == wanted => {
                    found = Some(id);
                    ControlFlow::Break(())
                }
                Ok(_) => ControlFlow::Continue(()),
                Err(err) => {
                    warn!(id, error = %err, "skipping undecryptable username");
                    ControlFlow::Continue(())
                }
            }
        })?;
        Ok(found)
    }

    /// Usernames are unique case-insensitively, including the built-in one.
    fn ensure_username_free(&self, username: &str, except: Option<i64>) -> Result<()> {
        let taken_by_super = username == self.config.super_admin.username.to_lowercase();
        let taken_by_user = match self.find_user_id(username)? {
            Some(id) => Some(id) != except,
            None => false,
        };
        if taken_by_super || taken_by_user {
            return Err(MobilityError::validation("username", "is already taken"));
        }
        Ok(())
    }

    pub fn create_user(&self, actor: &Actor, new: &NewUser) -> Result<User> {
        guard(actor, ADMINS, "create user", || -> Result<_> {
            policy::check_assign(actor, None, new.role, "create user")?;
            let sealed = new.seal(&self.cipher)?;
            self.ensure_username_free(&validate::username(&new.username)?, None)?;

            let id = self.store.insert_user(&sealed)?;
            let user = self.load_user(id)?;
            self.audit(
                NewLogEntry::new(actor.username(), "New user created")
                    .with_info(format!("username: {}, role: {}", user.username, user.role)),
            );
            Ok(user)
        })?
    }

    pub fn get_user(&self, actor: &Actor, id: i64) -> Result<User> {
        guard(actor, ADMINS, "view user", || self.load_user(id))?
    }

    pub fn list_users(&self, actor: &Actor) -> Result<Vec<User>> {
        guard(actor, ADMINS, "list users", || -> Result<_> {
            let mut users = Vec::new();
            for stored in self.store.list_users()? {
                match stored.open(&self.cipher) {
                    Ok(user) => users.push(user),
                    Err(err) => warn!(id = stored.id, error = %err, "skipping undecryptable user"),
                }
            }
            Ok(users)
        })?
    }

    pub fn update_user(&self, actor: &Actor, id: i64, update: &UserUpdate) -> Result<User> {
        guard(actor, ADMINS, "update user", || -> Result<_> {
            let stored = self.store.get_user(id)?.ok_or_else(|| not_found("User", id))?;
            policy::check_manage(actor, id, stored.role(), "update user")?;
            if let Some(role) = update.role {
                policy::check_assign(actor, Some((id, stored.role())), role, "update user")?;
            }
            if update.is_empty() {
                return Err(nothing_to_update());
            }

            let mut sealed = stored.record.clone();
            if let Some(username) = update.apply(&mut sealed, &self.cipher)? {
                self.ensure_username_free(&username, Some(id))?;
            }
            self.store.update_user(id, &sealed)?;

            let user = self.load_user(id)?;
            self.audit(
                NewLogEntry::new(actor.username(), "User profile updated")
                    .with_info(format!("user #{} ({})", id, user.username)),
            );
            Ok(user)
        })?
    }

    pub fn delete_user(&self, actor: &Actor, id: i64) -> Result<()> {
        guard(actor, ADMINS, "delete user", || -> Result<_> {
            let stored = self.store.get_user(id)?.ok_or_else(|| not_found("User", id))?;
            policy::check_manage(actor, id, stored.role(), "delete user")?;
            if !self.store.delete_user(id)? {
                return Err(not_found("User", id));
            }
            self.audit(
                NewLogEntry::new(actor.username(), "User deleted")
                    .with_info(format!("user #{} ({})", id, stored.role())),
            );
            Ok(())
        })?
    }

    pub fn search_users(&self, actor: &Actor, query: &SearchQuery) -> Result<SearchResults<User>> {
        guard(actor, ADMINS, "search users", || self.search_engine().search(query))?
    }

    fn load_user(&self, id: i64) -> Result<User> {
        self.store
            .get_user(id)?
            .ok_or_else(|| not_found("User", id))?
            .open(&self.cipher)
    }
}
