use crate::permission::PermissionCheck;
use crate::permissions::{has_permission, RoleBasedIdentity};
use crate::role::Role;
use mise_core::Identity;

/// What a navigation target demands from the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequirement {
    pub require_auth: bool,
    pub required_role: Option<Role>,
    pub required_permission: Option<PermissionCheck>,
    /// Redirect target when a role or permission check fails.
    pub fallback_path: String,
    /// Redirect target when authentication is required and missing.
    pub login_path: String,
}

impl Default for RouteRequirement {
    fn default() -> Self {
        Self {
            require_auth: true,
            required_role: None,
            required_permission: None,
            fallback_path: "/".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

impl RouteRequirement {
    /// Signed-in users only, no further checks.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Reachable by anyone once the session has resolved.
    pub fn public() -> Self {
        Self {
            require_auth: false,
            ..Self::default()
        }
    }

    /// Admin area. Anonymous visitors go back to `/` rather than to the
    /// login page.
    pub fn admin() -> Self {
        Self::default().with_role(Role::Admin).with_login_path("/")
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    pub fn with_permission(mut self, check: PermissionCheck) -> Self {
        self.required_permission = Some(check);
        self
    }

    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = path.into();
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }
}

/// Read access to the auth session the guard decides against.
pub trait SessionView {
    type User: RoleBasedIdentity;

    /// True until the initial session lookup has finished.
    fn is_loading(&self) -> bool;

    fn current_user(&self) -> Option<&Self::User>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The session is still resolving; render a loading state.
    Pending,
    Allowed,
    Denied { redirect: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            AccessDecision::Denied { redirect } => Some(redirect),
            _ => None,
        }
    }
}

/// Decides whether a route is reachable for the current session.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check<S: SessionView + ?Sized>(
        requirement: &RouteRequirement,
        session: &S,
    ) -> AccessDecision {
        if session.is_loading() {
            return AccessDecision::Pending;
        }

        let user = session.current_user().filter(|_| session.is_authenticated());
        let Some(user) = user else {
            if requirement.require_auth {
                tracing::debug!(redirect = %requirement.login_path, "route requires authentication");
                return deny(&requirement.login_path);
            }
            // Anonymous visitors hold no role and no grant.
            if requirement.required_role.is_some() || requirement.required_permission.is_some() {
                return deny(&requirement.fallback_path);
            }
            return AccessDecision::Allowed;
        };

        if let Some(role) = requirement.required_role {
            let role_ok = user.role() == role || user.role() == Role::Admin;
            if !role_ok {
                tracing::debug!(user = user.sub(), required = %role, "route role check failed");
                return deny(&requirement.fallback_path);
            }
        }

        if let Some(check) = &requirement.required_permission {
            if !has_permission(Some(user), check.resource(), check.action()) {
                tracing::debug!(user = user.sub(), permission = %check, "route permission check failed");
                return deny(&requirement.fallback_path);
            }
        }

        AccessDecision::Allowed
    }
}

fn deny(path: &str) -> AccessDecision {
    AccessDecision::Denied {
        redirect: path.to_string(),
    }
}
