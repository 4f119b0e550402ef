pub mod error;
pub mod permission;
pub mod permissions;
pub mod role;
pub mod route;

pub use error::SecurityError;
pub use permission::{actions, resources, Permission, PermissionCheck};
pub use permissions::{
    has_all_permissions, has_any_permission, has_permission, Permissions, RoleBasedIdentity,
};
pub use role::Role;
pub use route::{AccessDecision, RouteGuard, RouteRequirement, SessionView};

pub mod prelude {
    //! Re-exports of the most commonly used security types.
    pub use crate::{
        AccessDecision, Permission, PermissionCheck, Permissions, Role, RoleBasedIdentity,
        RouteGuard, RouteRequirement, SessionView,
    };
}
