use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SecurityError;

/// Role attached to every user account.
///
/// `Admin` is the role shortcut: it satisfies any permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
    Moderator,
    ContentCreator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Admin, Role::Moderator, Role::ContentCreator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::ContentCreator => "content_creator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SecurityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SecurityError::UnknownRole(s.to_string()))
    }
}
