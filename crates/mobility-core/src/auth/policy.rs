//! Who may manage which identities.
//!
//! - An Administrator manages Operators and its own profile.
//! - A SuperAdministrator manages Administrators and Operators.
//! - Nobody changes their own role.
//! - The SuperAdministrator role belongs to the built-in identity alone, so
//!   no stored SuperAdministrator can be created, modified or deleted.

use crate::auth::{AccessDenied, Actor, ADMINS, SUPER_ADMINISTRATOR};
use crate::model::Role;

/// Roles admitted to manage an identity that holds `target`.
pub fn managers_of(target: Role) -> &'static [Role] {
    match target {
        Role::Operator => ADMINS,
        Role::Administrator => SUPER_ADMINISTRATOR,
        Role::SuperAdministrator => &[],
    }
}

/// Check that `actor` may act on the identity `target_id` holding `target_role`.
pub fn check_manage(
    actor: &Actor,
    target_id: i64,
    target_role: Role,
    operation: &'static str,
) -> Result<(), AccessDenied> {
    if target_role == Role::SuperAdministrator {
        return Err(AccessDenied::new(actor.role(), &[], operation));
    }
    if actor.is(target_id) {
        return Ok(());
    }
    admit(actor, managers_of(target_role), operation)
}

/// Check that `actor` may give `new_role` to an identity.
///
/// `target` is the identity being changed and its current role, or `None`
/// when creating a new identity.
pub fn check_assign(
    actor: &Actor,
    target: Option<(i64, Role)>,
    new_role: Role,
    operation: &'static str,
) -> Result<(), AccessDenied> {
    if let Some((id, current)) = target {
        if actor.is(id) && current != new_role {
            return Err(AccessDenied::new(actor.role(), &[], "change their own role"));
        }
        check_manage(actor, id, current, operation)?;
        if current == new_role {
            return Ok(());
        }
    }
    if new_role == Role::SuperAdministrator {
        return Err(AccessDenied::new(actor.role(), &[], operation));
    }
    admit(actor, managers_of(new_role), operation)
}

fn admit(actor: &Actor, allowed: &[Role], operation: &'static str) -> Result<(), AccessDenied> {
    if actor.is_built_in() || allowed.contains(&actor.role()) {
        Ok(())
    } else {
        Err(AccessDenied::new(actor.role(), allowed, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::stored(10, Role::Administrator, "admin_001")
    }

    #[test]
    fn test_admin_manages_operators_and_self_only() {
        assert!(check_manage(&admin(), 11, Role::Operator, "update user").is_ok());
        assert!(check_manage(&admin(), 10, Role::Administrator, "update user").is_ok());

        let denied = check_manage(&admin(), 12, Role::Administrator, "delete user").unwrap_err();
        assert_eq!(denied.allowed, vec![Role::SuperAdministrator]);
    }

    #[test]
    fn test_super_admin_manages_admins() {
        let actor = Actor::super_admin("super_admin");
        assert!(check_manage(&actor, 12, Role::Administrator, "delete user").is_ok());
        assert!(check_assign(&actor, None, Role::Administrator, "create user").is_ok());
    }

    #[test]
    fn test_nobody_manages_a_super_administrator() {
        let actor = Actor::super_admin("super_admin");
        let denied = check_manage(&actor, 12, Role::SuperAdministrator, "delete user").unwrap_err();
        assert!(denied.allowed.is_empty());
        assert!(check_assign(&actor, None, Role::SuperAdministrator, "create user").is_err());
    }

    #[test]
    fn test_admin_cannot_grant_administrator() {
        assert!(check_assign(&admin(), None, Role::Operator, "create user").is_ok());
        assert!(check_assign(&admin(), None, Role::Administrator, "create user").is_err());
        assert!(check_assign(&admin(), Some((11, Role::Operator)), Role::Administrator, "update user").is_err());
    }

    #[test]
    fn test_no_self_role_change() {
        let denied = check_assign(&admin(), Some((10, Role::Administrator)), Role::Operator, "update user")
            .unwrap_err();
        assert_eq!(denied.operation, "change their own role");
        assert!(check_assign(&admin(), Some((10, Role::Administrator)), Role::Administrator, "update user").is_ok());
    }
}
