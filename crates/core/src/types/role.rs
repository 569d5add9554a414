//! User roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a role name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected Admin or User)")]
pub struct RoleParseError(pub String);

/// Authorization role carried by every account and every issued token.
///
/// Persisted as a small integer: `1` is an administrator, any other value
/// is a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including catalog and account management.
    Admin,
    /// A customer account.
    #[default]
    User,
}

impl Role {
    /// Storage code for [`Role::Admin`].
    pub const ADMIN_CODE: i32 = 1;
    /// Storage code for [`Role::User`].
    pub const USER_CODE: i32 = 0;

    /// Decode the stored integer.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        if code == Self::ADMIN_CODE {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Integer written to the database.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Admin => Self::ADMIN_CODE,
            Self::User => Self::USER_CODE,
        }
    }

    /// Name used in tokens and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Admin" | "admin" | "1" => Ok(Self::Admin),
            "User" | "user" | "0" => Ok(Self::User),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Role::from_code(1), Role::Admin);
        assert_eq!(Role::from_code(0), Role::User);
        assert_eq!(Role::from_code(7), Role::User);
    }

    #[test]
    fn test_code_roundtrip() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(Role::from_code(role.code()), role);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("1".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_role_name() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        let role: Role = serde_json::from_str("\"User\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
