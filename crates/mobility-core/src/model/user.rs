//! Operator identities.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::crypto::{hash_secret, verify_secret, FieldCipher};
use crate::error::Result;
use crate::model::role::Role;
use crate::model::validate;
use crate::model::Stored;

/// Field bundle for creating an identity.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
        }
    }

    /// Validate every field, hash the password and encrypt the rest.
    pub fn seal(&self, cipher: &FieldCipher) -> Result<SealedUser> {
        let username = validate::username(&self.username)?;
        validate::password(&self.password)?;
        let first_name = validate::person_name("first_name", &self.first_name)?;
        let last_name = validate::person_name("last_name", &self.last_name)?;

        Ok(SealedUser {
            username: cipher.encrypt_field(&username)?,
            password_hash: hash_secret(&self.password)?,
            role: self.role,
            first_name: cipher.encrypt_field(&first_name)?,
            last_name: cipher.encrypt_field(&last_name)?,
            registered_at: Utc::now(),
        })
    }
}

/// An identity as persisted: username and names encrypted, password hashed.
#[derive(Debug, Clone)]
pub struct SealedUser {
    pub(crate) username: Vec<u8>,
    pub(crate) password_hash: String,
    pub(crate) role: Role,
    pub(crate) first_name: Vec<u8>,
    pub(crate) last_name: Vec<u8>,
    pub(crate) registered_at: DateTime<Utc>,
}

impl SealedUser {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn username(&self, cipher: &FieldCipher) -> Result<String> {
        cipher.decrypt_field(&self.username)
    }

    pub fn first_name(&self, cipher: &FieldCipher) -> Result<String> {
        cipher.decrypt_field(&self.first_name)
    }

    pub fn last_name(&self, cipher: &FieldCipher) -> Result<String> {
        cipher.decrypt_field(&self.last_name)
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_secret(password, &self.password_hash)
    }
}

impl Stored<SealedUser> {
    /// Decrypt into the profile view; the password hash is never exposed.
    pub fn open(&self, cipher: &FieldCipher) -> Result<User> {
        Ok(User {
            id: self.id,
            username: self.username(cipher)?,
            first_name: self.first_name(cipher)?,
            last_name: self.last_name(cipher)?,
            role: self.role,
            registered_at: self.registered_at,
        })
    }
}

/// Decrypted identity profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub registered_at: DateTime<Utc>,
}

/// Partial update of an identity's profile.
///
/// Passwords are changed through the dedicated password operations, never here.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
    }

    /// Validate and encrypt each present field onto `sealed`.
    ///
    /// Returns the canonical new username when it changes so the caller can
    /// check uniqueness before persisting.
    pub(crate) fn apply(
        &self,
        sealed: &mut SealedUser,
        cipher: &FieldCipher,
    ) -> Result<Option<String>> {
        let username = self
            .username
            .as_deref()
            .map(validate::username)
            .transpose()?;
        let first_name = self
            .first_name
            .as_deref()
            .map(|value| validate::person_name("first_name", value))
            .transpose()?;
        let last_name = self
            .last_name
            .as_deref()
            .map(|value| validate::person_name("last_name", value))
            .transpose()?;

        if let Some(ref value) = username {
            sealed.username = cipher.encrypt_field(value)?;
        }
        if let Some(value) = first_name {
            sealed.first_name = cipher.encrypt_field(&value)?;
        }
        if let Some(value) = last_name {
            sealed.last_name = cipher.encrypt_field(&value)?;
        }
        if let Some(role) = self.role {
            sealed.role = role;
        }
        Ok(username)
    }
}

/// A temporary password minted by a password reset, hashed like a password.
///
/// One row per identity; issuing a new code replaces the previous one.
#[derive(Debug, Clone)]
pub struct ResetCode {
    pub user_id: i64,
    pub(crate) code_hash: String,
    pub created_at: DateTime<Utc>,
    pub used: bool,
}

impl ResetCode {
    /// True when `secret` matches and the code is unused and within `ttl`.
    pub(crate) fn accepts(&self, secret: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        !self.used && now - self.created_at <= ttl && verify_secret(secret, &self.code_hash)
    }
}
