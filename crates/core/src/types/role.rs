//! User roles.

use serde::{Deserialize, Serialize};

/// A role assignable to a user.
///
/// Roles are static reference data. Role names are embedded into issued
/// tokens as claims, so renaming a variant is a breaking change for any
/// token still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access to catalog management, order status, and review moderation.
    Admin,
    /// Default role assigned at registration.
    User,
}

impl Role {
    /// All roles, in the order they are provisioned.
    pub const ALL: [Self; 2] = [Self::Admin, Self::User];

    /// The role assigned to every newly registered user.
    pub const DEFAULT: Self = Self::User;

    /// The role's claim name as embedded in tokens.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "User" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in Role::ALL {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("SuperUser".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_role() {
        assert_eq!(Role::DEFAULT, Role::User);
    }
}
