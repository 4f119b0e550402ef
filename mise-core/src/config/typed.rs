use super::{ConfigError, MiseConfig};

/// Metadata about one property of a typed section.
#[derive(Debug, Clone)]
pub struct PropertyMeta {
    /// Absolute key (e.g. `"backend.url"`).
    pub key: &'static str,
    pub type_name: &'static str,
    pub description: &'static str,
}

impl PropertyMeta {
    /// Environment variable that overrides this key.
    pub fn env_var(&self) -> String {
        self.key.to_uppercase().replace('.', "_")
    }
}

/// A strongly-typed configuration section read from a [`MiseConfig`].
///
/// ```ignore
/// impl ConfigProperties for RetryPolicy {
///     fn prefix() -> &'static str { "retry" }
///     fn properties_metadata() -> Vec<PropertyMeta> { ... }
///     fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
///         Ok(RetryPolicy { max_attempts: config.get_or("retry.max.attempts", 3), ... })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    fn prefix() -> &'static str;

    fn properties_metadata() -> Vec<PropertyMeta>;

    fn from_config(config: &MiseConfig) -> Result<Self, ConfigError>;
}
