//! Operator roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MobilityError;

/// Operator role.
///
/// Roles form a total order (`Operator < Administrator < SuperAdministrator`),
/// but access checks never compare ranks: each operation lists the exact roles
/// it admits (see [`crate::auth::guard`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    Administrator,
    SuperAdministrator,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::Operator,
        Role::Administrator,
        Role::SuperAdministrator,
    ];

    /// Position in the hierarchy, lowest first.
    pub fn rank(self) -> u8 {
        match self {
            Role::Operator => 1,
            Role::Administrator => 2,
            Role::SuperAdministrator => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Administrator => "administrator",
            Role::SuperAdministrator => "super_administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MobilityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "operator" | "service_engineer" => Ok(Role::Operator),
            "administrator" | "admin" | "system_administrator" => Ok(Role::Administrator),
            "super_administrator" | "super_admin" => Ok(Role::SuperAdministrator),
            other => Err(MobilityError::validation(
                "role",
                format!("unknown role \"{}\"", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(Role::Operator < Role::Administrator);
        assert!(Role::Administrator < Role::SuperAdministrator);
        assert!(Role::ALL.windows(2).all(|w| w[0].rank() < w[1].rank()));
    }

    #[test]
    fn test_parse_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("Service-Engineer".parse::<Role>().unwrap(), Role::Operator);
        assert!("root".parse::<Role>().is_err());
    }
}
