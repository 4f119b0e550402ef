use mise_core::Identity;

use crate::permission::{actions, resources, Permission, PermissionCheck};
use crate::role::Role;

/// Extension of [`Identity`] for role-based access control.
///
/// Implement this on user types that carry a role and explicit grants.
/// `mise_data::User` implements it; tests use small hand-written types.
pub trait RoleBasedIdentity: Identity {
    fn role(&self) -> Role;

    /// Explicit grants, checked by exact match.
    fn permissions(&self) -> &[Permission];

    fn has_role(&self, role: Role) -> bool {
        self.role() == role
    }
}

/// Whether `user` may perform `action` on `resource`.
///
/// No user means no access. The `admin` role passes every check, whatever
/// its grants. Anyone else needs a grant matching both fields exactly.
pub fn has_permission<U>(user: Option<&U>, resource: &str, action: &str) -> bool
where
    U: RoleBasedIdentity + ?Sized,
{
    let Some(user) = user else {
        return false;
    };
    if user.role() == Role::Admin {
        return true;
    }
    user.permissions()
        .iter()
        .any(|grant| grant.grants(resource, action))
}

/// True when at least one check passes. An empty list is `false`.
pub fn has_any_permission<U>(user: Option<&U>, checks: &[PermissionCheck]) -> bool
where
    U: RoleBasedIdentity + ?Sized,
{
    checks
        .iter()
        .any(|check| has_permission(user, check.resource(), check.action()))
}

/// True when every check passes. An empty list is `true`.
pub fn has_all_permissions<U>(user: Option<&U>, checks: &[PermissionCheck]) -> bool
where
    U: RoleBasedIdentity + ?Sized,
{
    checks
        .iter()
        .all(|check| has_permission(user, check.resource(), check.action()))
}

/// Capability view over an optional signed-in user.
///
/// Bundles the evaluator functions with the derived predicates the UI asks
/// for. Each predicate is an explicit grant OR'ed with a fixed list of role
/// shortcuts, so some of them pass for roles the plain evaluator would deny
/// (a moderator can moderate without holding `content:moderate`).
pub struct Permissions<'a, U: ?Sized> {
    user: Option<&'a U>,
}

impl<U: ?Sized> Clone for Permissions<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U: ?Sized> Copy for Permissions<'_, U> {}

impl<'a, U: RoleBasedIdentity + ?Sized> Permissions<'a, U> {
    pub fn new(user: Option<&'a U>) -> Self {
        Self { user }
    }

    pub fn user(&self) -> Option<&'a U> {
        self.user
    }

    /// Grants of the current user, empty without one.
    pub fn grants(&self) -> &'a [Permission] {
        self.user.map(|u| u.permissions()).unwrap_or(&[])
    }

    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        has_permission(self.user, resource, action)
    }

    pub fn has_any_permission(&self, checks: &[PermissionCheck]) -> bool {
        has_any_permission(self.user, checks)
    }

    pub fn has_all_permissions(&self, checks: &[PermissionCheck]) -> bool {
        has_all_permissions(self.user, checks)
    }

    fn is(&self, role: Role) -> bool {
        self.user.is_some_and(|u| u.has_role(role))
    }

    pub fn can_manage_users(&self) -> bool {
        self.has_permission(resources::USERS, actions::MANAGE) || self.is(Role::Admin)
    }

    pub fn can_moderate_content(&self) -> bool {
        self.has_permission(resources::CONTENT, actions::MODERATE)
            || self.is(Role::Admin)
            || self.is(Role::Moderator)
    }

    pub fn can_create_content(&self) -> bool {
        self.has_permission(resources::RECIPES, actions::CREATE)
            || self.is(Role::ContentCreator)
            || self.is(Role::Admin)
    }

    pub fn can_edit_own_content(&self) -> bool {
        self.has_permission(resources::RECIPES, actions::EDIT_OWN) || self.can_create_content()
    }

    pub fn can_edit_any_content(&self) -> bool {
        self.has_permission(resources::RECIPES, actions::EDIT_ANY) || self.is(Role::Admin)
    }

    pub fn can_delete_own_content(&self) -> bool {
        self.has_permission(resources::RECIPES, actions::DELETE_OWN) || self.can_create_content()
    }

    pub fn can_delete_any_content(&self) -> bool {
        self.has_permission(resources::RECIPES, actions::DELETE_ANY) || self.is(Role::Admin)
    }

    pub fn can_view_analytics(&self) -> bool {
        self.has_permission(resources::ANALYTICS, actions::VIEW)
            || self.is(Role::Admin)
            || self.is(Role::ContentCreator)
    }

    pub fn can_manage_system(&self) -> bool {
        self.has_permission(resources::SYSTEM, actions::MANAGE) || self.is(Role::Admin)
    }
}
