//! Login sessions and password resets.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{guard, policy, Actor, ADMINS};
use crate::crypto::{generate_temporary_password, hash_secret, verify_secret};
use crate::error::{MobilityError, Result};
use crate::model::{validate, NewLogEntry};
use crate::service::not_found;
use crate::Vault;

/// An authenticated identity for the duration of one operator session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    actor: Actor,
    /// Set when the login used a temporary reset password
    must_change_password: bool,
}

impl Session {
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn must_change_password(&self) -> bool {
        self.must_change_password
    }
}

impl Vault {
    /// Authenticate by username and password.
    ///
    /// The built-in super identity is checked against the configured hash.
    /// Stored identities also accept an unused, unexpired reset code once.
    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim().to_lowercase();
        let super_admin = &self.config.super_admin;

        if username == super_admin.username.to_lowercase() {
            if verify_secret(password, &super_admin.password_hash) {
                self.audit(NewLogEntry::new(&username, "Logged in"));
                return Ok(Session {
                    actor: Actor::super_admin(super_admin.username.clone()),
                    must_change_password: false,
                });
            }
            self.audit(
                NewLogEntry::new(&username, "Unsuccessful login").with_info("Wrong password"),
            );
            return Err(MobilityError::InvalidCredentials);
        }

        let Some(id) = self.find_user_id(&username)? else {
            self.audit(
                NewLogEntry::new(&username, "Unsuccessful login")
                    .with_info("Unknown username")
                    .suspicious(true),
            );
            return Err(MobilityError::InvalidCredentials);
        };
        let user = self.store.get_user(id)?.ok_or_else(|| not_found("User", id))?;
        let actor = Actor::stored(id, user.role(), username.clone());

        if user.verify_password(password) {
            self.store.clear_failed_logins(id)?;
            self.audit(NewLogEntry::new(&username, "Logged in"));
            return Ok(Session {
                actor,
                must_change_password: false,
            });
        }

        if self.redeem_reset_code(id, password)? {
            self.store.clear_failed_logins(id)?;
            self.audit(
                NewLogEntry::new(&username, "Logged in").with_info("Used a temporary password"),
            );
            return Ok(Session {
                actor,
                must_change_password: true,
            });
        }

        let failures = self.store.record_failed_login(id)?;
        let suspicious = failures >= self.config.max_failed_logins;
        if suspicious {
            warn!(failures, "repeated failed logins");
        }
        self.audit(
            NewLogEntry::new(&username, "Unsuccessful login")
                .with_info(format!("{} consecutive failures", failures))
                .suspicious(suspicious),
        );
        Err(MobilityError::InvalidCredentials)
    }

    fn redeem_reset_code(&self, user_id: i64, secret: &str) -> Result<bool> {
        let Some(code) = self.store.get_reset_code(user_id)? else {
            return Ok(false);
        };
        if !code.accepts(secret, self.config.reset_code_ttl(), Utc::now()) {
            return Ok(false);
        }
        // Single use: only the caller that flips the flag gets in
        self.store.consume_reset_code(user_id)
    }

    /// Change the session's own password.
    ///
    /// `current` may be omitted only right after logging in with a
    /// temporary password.
    pub fn change_own_password(
        &self,
        session: &mut Session,
        current: Option<&str>,
        new_password: &str,
    ) -> Result<()> {
        let Some(id) = session.actor.user_id() else {
            return Err(MobilityError::InvalidInput(
                "The built-in super administrator password is set in the configuration file"
                    .to_string(),
            ));
        };
        let user = self.store.get_user(id)?.ok_or_else(|| not_found("User", id))?;

        if !session.must_change_password {
            let current = current.ok_or_else(|| {
                MobilityError::validation("current_password", "is required")
            })?;
            if !user.verify_password(current) {
                return Err(MobilityError::InvalidCredentials);
            }
        }
        validate::password(new_password)?;
        if user.verify_password(new_password) {
            return Err(MobilityError::validation(
                "password",
                "must differ from the current password",
            ));
        }

        self.store.update_password(id, &hash_secret(new_password)?)?;
        self.store.consume_reset_code(id)?;
        session.must_change_password = false;
        self.audit(NewLogEntry::new(session.actor.username(), "Password changed"));
        debug!(user = id, "password changed");
        Ok(())
    }

    /// Mint a temporary password for `user_id`, replacing any earlier one.
    ///
    /// The clear value is returned once; only its hash is stored.
    pub fn reset_password(&self, actor: &Actor, user_id: i64) -> Result<String> {
        guard(actor, ADMINS, "reset password", || -> Result<_> {
            let user = self
                .store
                .get_user(user_id)?
                .ok_or_else(|| not_found("User", user_id))?;
            policy::check_manage(actor, user_id, user.role(), "reset password")?;
            if actor.is(user_id) {
                return Err(MobilityError::InvalidInput(
                    "Use a password change to replace your own password".to_string(),
                ));
            }

            let temporary = generate_temporary_password();
            self.store
                .upsert_reset_code(user_id, &hash_secret(&temporary)?, Utc::now())?;
            self.audit(
                NewLogEntry::new(actor.username(), "Password reset")
                    .with_info(format!("user #{}", user_id)),
            );
            Ok(temporary)
        })?
    }
}
