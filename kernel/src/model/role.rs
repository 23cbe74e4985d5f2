use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Teacher,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(Role::from_str("ADMIN").ok(), Some(Role::Admin));
        assert_eq!(Role::from_str("admin").ok(), Some(Role::Admin));
        assert_eq!(Role::from_str("Teacher").ok(), Some(Role::Teacher));
        assert!(Role::from_str("librarian").is_err());
    }

    #[test]
    fn role_renders_screaming_snake_case() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Teacher.to_string(), "TEACHER");
    }
}
