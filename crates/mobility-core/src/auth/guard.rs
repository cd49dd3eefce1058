//! The exact-match role gate.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::auth::Actor;
use crate::model::Role;

/// A refused operation. Returned as a value; the guarded operation never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDenied {
    /// Role of the acting identity
    pub role: Role,
    /// Roles that would have been admitted; empty when no role may do this
    pub allowed: Vec<Role>,
    pub operation: &'static str,
}

impl AccessDenied {
    pub fn new(role: Role, allowed: &[Role], operation: &'static str) -> Self {
        Self {
            role,
            allowed: allowed.to_vec(),
            operation,
        }
    }
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.allowed.is_empty() {
            return write!(
                f,
                "Access denied: {} may not {}",
                self.role, self.operation
            );
        }
        let allowed: Vec<&str> = self.allowed.iter().map(|role| role.as_str()).collect();
        write!(
            f,
            "Access denied: {} requires {} (acting role: {})",
            self.operation,
            allowed.join(" or "),
            self.role
        )
    }
}

impl std::error::Error for AccessDenied {}

/// Run `operation` only if the actor's role is literally in `allowed`.
///
/// The built-in super identity is admitted unconditionally. On denial the
/// closure is dropped without being called.
pub fn guard<T>(
    actor: &Actor,
    allowed: &[Role],
    operation: &'static str,
    run: impl FnOnce() -> T,
) -> Result<T, AccessDenied> {
    if actor.is_built_in() || allowed.contains(&actor.role()) {
        return Ok(run());
    }
    warn!(
        role = %actor.role(),
        operation,
        "access denied"
    );
    Err(AccessDenied::new(actor.role(), allowed, operation))
}

/// [`guard`] for call sites that only need the check.
pub fn authorize(actor: &Actor, allowed: &[Role], operation: &'static str) -> Result<(), AccessDenied> {
    guard(actor, allowed, operation, || ())
}
