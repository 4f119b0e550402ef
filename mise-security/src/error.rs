/// Errors raised while building security values from untrusted strings.
///
/// Access denial is never an error: evaluators answer `false` and guards
/// answer [`AccessDecision::Denied`](crate::AccessDecision::Denied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// A permission check had an empty resource or action.
    InvalidPermission(String),

    /// The role name is not one of the known roles.
    UnknownRole(String),
}

impl std::fmt::Display for SecurityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityError::InvalidPermission(msg) => write!(f, "Invalid permission: {msg}"),
            SecurityError::UnknownRole(role) => write!(f, "Unknown role: {role}"),
        }
    }
}

impl std::error::Error for SecurityError {}

impl From<SecurityError> for mise_core::AppError {
    fn from(err: SecurityError) -> Self {
        mise_core::AppError::BadRequest(err.to_string())
    }
}
