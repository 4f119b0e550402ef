use std::time::Duration;

use mise_core::config::{ConfigError, ConfigProperties, MiseConfig, PropertyMeta};

/// Values shipped in the sample `.env` that mean "not set up yet".
pub const PLACEHOLDER_URL: &str = "https://your-project-id.supabase.co";
pub const PLACEHOLDER_KEY: &str = "your-anon-key-here";
/// Every hosted backend URL lives under this domain.
pub const HOSTED_DOMAIN: &str = ".supabase.co";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: Option<String>,
    /// Public (anon) API key.
    pub key: Option<String>,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl BackendConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// A usable backend needs a real URL on the hosted domain and a real
    /// key. Anything else selects offline mode.
    pub fn is_valid(&self) -> bool {
        let (Some(url), Some(key)) = (self.url.as_deref(), self.key.as_deref()) else {
            return false;
        };
        let url = url.trim();
        let key = key.trim();
        !url.is_empty()
            && !key.is_empty()
            && url != PLACEHOLDER_URL
            && key != PLACEHOLDER_KEY
            && url.contains(HOSTED_DOMAIN)
    }
}

impl ConfigProperties for BackendConfig {
    fn prefix() -> &'static str {
        "backend"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![
            PropertyMeta {
                key: "backend.url",
                type_name: "String",
                description: "Base URL of the hosted backend",
            },
            PropertyMeta {
                key: "backend.key",
                type_name: "String",
                description: "Public API key sent with every request",
            },
            PropertyMeta {
                key: "backend.timeout.secs",
                type_name: "u64",
                description: "HTTP request timeout in seconds",
            },
        ]
    }

    fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            url: config.get_opt("backend.url")?,
            key: config.get_opt("backend.key")?,
            timeout: config
                .get_opt::<u64>("backend.timeout.secs")?
                .map(Duration::from_secs)
                .unwrap_or(Self::DEFAULT_TIMEOUT),
        })
    }
}
