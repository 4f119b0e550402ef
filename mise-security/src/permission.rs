use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SecurityError;

/// Resource names the application grants permissions on.
pub mod resources {
    pub const RECIPES: &str = "recipes";
    pub const USERS: &str = "users";
    pub const CONTENT: &str = "content";
    pub const ANALYTICS: &str = "analytics";
    pub const SYSTEM: &str = "system";

    pub const KNOWN: &[&str] = &[RECIPES, USERS, CONTENT, ANALYTICS, SYSTEM];
}

/// Action names the application grants permissions for.
pub mod actions {
    pub const VIEW: &str = "view";
    pub const CREATE: &str = "create";
    pub const EDIT_OWN: &str = "edit_own";
    pub const EDIT_ANY: &str = "edit_any";
    pub const DELETE_OWN: &str = "delete_own";
    pub const DELETE_ANY: &str = "delete_any";
    pub const MODERATE: &str = "moderate";
    pub const MANAGE: &str = "manage";

    pub const KNOWN: &[&str] = &[
        VIEW, CREATE, EDIT_OWN, EDIT_ANY, DELETE_OWN, DELETE_ANY, MODERATE, MANAGE,
    ];
}

/// An explicit grant attached to a user record.
///
/// Only `resource` and `action` take part in evaluation; the other fields
/// are descriptive and come from the backend's permission table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    /// Exact, case-sensitive match on both fields.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}

/// A requested `{resource, action}` capability.
///
/// Construction trims both parts and rejects empty ones. Names outside the
/// [`resources`] / [`actions`] vocabulary are accepted; [`is_known`] tells
/// them apart.
///
/// [`is_known`]: PermissionCheck::is_known
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PermissionCheck {
    resource: String,
    action: String,
}

impl PermissionCheck {
    pub fn new(resource: &str, action: &str) -> Result<Self, SecurityError> {
        let resource = resource.trim();
        let action = action.trim();
        if resource.is_empty() || action.is_empty() {
            return Err(SecurityError::InvalidPermission(format!(
                "resource and action must be non-empty (got '{resource}:{action}')"
            )));
        }
        Ok(Self {
            resource: resource.to_string(),
            action: action.to_string(),
        })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn is_known(&self) -> bool {
        resources::KNOWN.contains(&self.resource.as_str())
            && actions::KNOWN.contains(&self.action.as_str())
    }
}

impl std::fmt::Display for PermissionCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

/// Parses the `resource:action` form used on the command line.
impl FromStr for PermissionCheck {
    type Err = SecurityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s.split_once(':').ok_or_else(|| {
            SecurityError::InvalidPermission(format!("expected 'resource:action', got '{s}'"))
        })?;
        Self::new(resource, action)
    }
}

impl From<&Permission> for PermissionCheck {
    fn from(grant: &Permission) -> Self {
        Self {
            resource: grant.resource.clone(),
            action: grant.action.clone(),
        }
    }
}
