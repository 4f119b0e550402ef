use colored::Colorize;
use mise::mise_security::{Permission, PermissionCheck, Permissions, Role, RoleBasedIdentity};
use mise::{AppError, Identity};

type CliResult = Result<(), AppError>;

/// Stand-in user assembled from command-line flags.
struct CliUser {
    role: Role,
    grants: Vec<Permission>,
}

impl Identity for CliUser {
    fn sub(&self) -> &str {
        "cli"
    }
}

impl RoleBasedIdentity for CliUser {
    fn role(&self) -> Role {
        self.role
    }

    fn permissions(&self) -> &[Permission] {
        &self.grants
    }
}

pub fn can(role: &str, grants: &[String], resource: &str, action: &str) -> CliResult {
    let role: Role = role.parse()?;
    let grants = grants
        .iter()
        .map(|g| g.parse::<PermissionCheck>().map(|c| Permission::new(c.resource(), c.action())))
        .collect::<Result<Vec<_>, _>>()?;
    let check = PermissionCheck::new(resource, action)?;
    if !check.is_known() {
        println!("{} '{}' is not a known permission", "!".yellow(), check);
    }

    let user = CliUser { role, grants };
    let perms = Permissions::new(Some(&user));
    let verdict = if perms.has_permission(check.resource(), check.action()) {
        "allowed".green()
    } else {
        "denied".red()
    };
    println!("{role} {check}: {verdict}");

    let derived = [
        ("manage users", perms.can_manage_users()),
        ("moderate content", perms.can_moderate_content()),
        ("create content", perms.can_create_content()),
        ("edit own content", perms.can_edit_own_content()),
        ("edit any content", perms.can_edit_any_content()),
        ("delete own content", perms.can_delete_own_content()),
        ("delete any content", perms.can_delete_any_content()),
        ("view analytics", perms.can_view_analytics()),
        ("manage system", perms.can_manage_system()),
    ];
    for (label, allowed) in derived {
        let mark = if allowed { "✓".green() } else { "✗".red() };
        println!("  {mark} {label}");
    }
    Ok(())
}
