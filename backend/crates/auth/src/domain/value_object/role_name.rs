//! Role Name Value Object
//!
//! Wire names are upper case (`ADMIN`, `SALES`, ...) in JSON, tokens and
//! the `roles.name` column alike.

use kernel::error::app_error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of role names. Created once at bootstrap, never edited.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Admin,
    Registration,
    Sales,
    Customer,
}

impl RoleName {
    /// Every role, in bootstrap order
    pub const ALL: [RoleName; 4] = [
        RoleName::Admin,
        RoleName::Registration,
        RoleName::Sales,
        RoleName::Customer,
    ];

    /// Role given to self-registered identities
    pub const DEFAULT: RoleName = RoleName::Customer;

    #[inline]
    pub const fn code(&self) -> &'static str {
        use RoleName::*;
        match self {
            Admin => "ADMIN",
            Registration => "REGISTRATION",
            Sales => "SALES",
            Customer => "CUSTOMER",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| AppError::bad_request(format!("Unknown role: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_from_code() {
        assert_eq!(RoleName::from_code("ADMIN"), Some(RoleName::Admin));
        assert_eq!(RoleName::from_code("REGISTRATION"), Some(RoleName::Registration));
        assert_eq!(RoleName::from_code("SALES"), Some(RoleName::Sales));
        assert_eq!(RoleName::from_code("CUSTOMER"), Some(RoleName::Customer));
        assert_eq!(RoleName::from_code("admin"), None);
        assert_eq!(RoleName::from_code("ROOT"), None);
    }

    #[test]
    fn test_role_name_display_matches_serde() {
        for role in RoleName::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
        }
    }

    #[test]
    fn test_role_name_parse_error() {
        let err = "JANITOR".parse::<RoleName>().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
