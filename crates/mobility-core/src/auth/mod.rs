//! Authorization: acting identities, the role gate and management policy.
//!
//! Every guarded operation names its literal allowed-role set at the call
//! site. The gate compares by set membership, never by rank, so a role that
//! outranks every listed role is still refused when it is not listed.

pub mod guard;
pub mod policy;
pub mod session;

use serde::Serialize;

use crate::model::Role;

pub use guard::{authorize, guard, AccessDenied};
pub use session::Session;

/// Administrator and SuperAdministrator.
pub const ADMINS: &[Role] = &[Role::Administrator, Role::SuperAdministrator];

/// Every role.
pub const EVERYONE: &[Role] = &Role::ALL;

/// Only Administrator; the restore-request side of the protocol.
pub const ADMINISTRATOR: &[Role] = &[Role::Administrator];

/// Only SuperAdministrator.
pub const SUPER_ADMINISTRATOR: &[Role] = &[Role::SuperAdministrator];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ActorKind {
    /// The configured super identity; not a row in the users table.
    BuiltIn,
    Stored { id: i64, role: Role },
}

/// The identity an operation is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    kind: ActorKind,
    username: String,
}

impl Actor {
    /// The built-in super identity, which bypasses the role gate.
    pub fn super_admin(username: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::BuiltIn,
            username: username.into(),
        }
    }

    pub fn stored(id: i64, role: Role, username: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Stored { id, role },
            username: username.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self.kind {
            ActorKind::BuiltIn => Role::SuperAdministrator,
            ActorKind::Stored { role, .. } => role,
        }
    }

    /// Row id in the users table; `None` for the built-in identity.
    pub fn user_id(&self) -> Option<i64> {
        match self.kind {
            ActorKind::BuiltIn => None,
            ActorKind::Stored { id, .. } => Some(id),
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self.kind, ActorKind::BuiltIn)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn is(&self, user_id: i64) -> bool {
        self.user_id() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_actor_is_super_administrator_without_id() {
        let actor = Actor::super_admin("super_admin");
        assert_eq!(actor.role(), Role::SuperAdministrator);
        assert_eq!(actor.user_id(), None);
        assert!(actor.is_built_in());
    }

    #[test]
    fn test_stored_actor_reports_its_row() {
        let actor = Actor::stored(4, Role::Operator, "operator1");
        assert_eq!(actor.role(), Role::Operator);
        assert!(actor.is(4));
        assert!(!actor.is(5));
        assert_eq!(actor.username(), "operator1");
    }
}
