mod loader;
pub mod secrets;
pub mod typed;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use typed::{ConfigProperties, PropertyMeta};
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "MISE_PROFILE";

/// A single validation failure reported by a typed section.
#[derive(Debug, Clone)]
pub struct ConfigValidationDetail {
    pub key: String,
    pub message: String,
}

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
    /// A typed section rejected its values.
    Validation(Vec<ConfigValidationDetail>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Validation(details) => {
                write!(f, "Config validation errors:")?;
                for detail in details {
                    write!(f, "\n  - {}: {}", detail.key, detail.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from YAML files, `.env` files and the
/// process environment.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env`, then `.env.{profile}` (loaded into the environment, never
///    overwriting variables that are already set)
/// 4. environment variables (`BACKEND_URL` overrides `backend.url`)
///
/// `${...}` placeholders in YAML strings are resolved before the
/// environment overlay. The profile comes from `MISE_PROFILE`, then the
/// argument passed to [`MiseConfig::load`].
///
/// Typed sections read themselves out of it through
/// [`ConfigProperties::from_config`].
#[derive(Debug, Clone)]
pub struct MiseConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl MiseConfig {
    /// Load from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile, &DefaultSecretResolver)
    }

    /// Load from `dir` with an explicit secret resolver.
    pub fn load_from(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let active_profile =
            std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut values = HashMap::new();
        loader::load_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::load_yaml_file(
            &dir.join(format!("application-{active_profile}.yaml")),
            &mut values,
        )?;

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{active_profile}")));

        resolve_string_values(&mut values, resolver)?;
        loader::overlay_env(&mut values);

        tracing::debug!(profile = %active_profile, keys = values.len(), "configuration loaded");

        Ok(MiseConfig {
            values,
            profile: active_profile,
        })
    }

    /// Build a config from a YAML string, without touching the environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(MiseConfig {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn empty() -> Self {
        MiseConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Read the value under a dot-separated key.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Read a value, falling back to `default` when the key is missing or
    /// cannot be converted.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Read an optional value: `Ok(None)` when the key is missing or blank.
    pub fn get_opt<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        match self.values.get(key) {
            None | Some(ConfigValue::Null) => Ok(None),
            Some(ConfigValue::String(s)) if s.trim().is_empty() => Ok(None),
            Some(value) => V::from_config_value(value, key).map(Some),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    for value in values.values_mut() {
        if let ConfigValue::String(s) = value {
            if s.contains("${") {
                *s = secrets::resolve_placeholders(s, resolver)?;
            }
        }
    }
    Ok(())
}
