use mise_cache::CacheError;

/// Errors that can occur in the data layer.
///
/// `Clone` so a deduplicated fetch can hand the same failure to every
/// waiting caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// No backend is configured; the gateway is serving offline data.
    NotConfigured,
    NotFound(String),
    /// The request never produced an HTTP response.
    Transport(String),
    /// The backend answered with a non-success status.
    Backend { status: u16, message: String },
    /// A payload could not be (de)serialized.
    Decode(String),
    /// A uniqueness rule was violated, e.g. a taken username.
    Conflict(String),
    /// The operation needs a signed-in user.
    Unauthenticated,
}

impl DataError {
    /// Transport failures and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Transport(_) => true,
            DataError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            DataError::NotConfigured => "Database not configured".to_string(),
            DataError::NotFound(what) => format!("{what} not found"),
            DataError::Transport(_) => "Could not reach the server".to_string(),
            DataError::Backend { message, .. } => message.clone(),
            DataError::Decode(_) => "Unexpected response from the server".to_string(),
            DataError::Conflict(msg) => msg.clone(),
            DataError::Unauthenticated => "You need to sign in first".to_string(),
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotConfigured => write!(f, "Backend not configured"),
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Transport(msg) => write!(f, "Transport error: {msg}"),
            DataError::Backend { status, message } => {
                write!(f, "Backend error ({status}): {message}")
            }
            DataError::Decode(msg) => write!(f, "Decode error: {msg}"),
            DataError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            DataError::Unauthenticated => write!(f, "Not authenticated"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<CacheError> for DataError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Aborted(_) => DataError::Transport(err.to_string()),
            CacheError::Encode(_) | CacheError::Decode(_) => DataError::Decode(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::Decode(err.to_string())
        } else {
            DataError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Decode(err.to_string())
    }
}

impl From<DataError> for mise_core::AppError {
    fn from(err: DataError) -> Self {
        use mise_core::AppError;
        match err {
            DataError::NotConfigured => AppError::Unavailable(err.to_string()),
            DataError::NotFound(msg) => AppError::NotFound(msg),
            DataError::Transport(msg) => AppError::Unavailable(msg),
            DataError::Backend { status: 401, message } => AppError::Unauthorized(message),
            DataError::Backend { status: 403, message } => AppError::Forbidden(message),
            DataError::Backend { status, message } if (400..500).contains(&status) => {
                AppError::BadRequest(message)
            }
            DataError::Backend { message, .. } => AppError::Internal(message),
            DataError::Decode(msg) => AppError::Internal(msg),
            DataError::Conflict(msg) => AppError::BadRequest(msg),
            DataError::Unauthenticated => AppError::Unauthorized(err.to_string()),
        }
    }
}
