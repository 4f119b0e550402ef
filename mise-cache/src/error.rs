/// Failures while moving values in or out of the cache, or while the
/// background fetch behind a deduplicated key runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    Encode(String),
    Decode(String),
    /// The fetch task panicked or was cancelled by runtime shutdown.
    Aborted(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Encode(msg) => write!(f, "Cache encode error: {msg}"),
            CacheError::Decode(msg) => write!(f, "Cache decode error: {msg}"),
            CacheError::Aborted(msg) => write!(f, "Fetch aborted: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}
