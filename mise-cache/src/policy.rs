use std::time::Duration;

use mise_core::config::{ConfigError, ConfigProperties, MiseConfig, PropertyMeta};

/// Time-to-live per data category.
///
/// The cache does not enforce these; callers pick the category that matches
/// the data they store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Paged recipe listings.
    pub list: Duration,
    /// Collections scoped to one user (authored, saved).
    pub user: Duration,
    /// Featured / curated lists.
    pub featured: Duration,
    /// Free-text search results.
    pub search: Duration,
    /// Single recipe detail.
    pub detail: Duration,
}

impl TtlPolicy {
    pub const DEFAULT_LIST: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_USER: Duration = Duration::from_secs(10 * 60);
    pub const DEFAULT_FEATURED: Duration = Duration::from_secs(15 * 60);
    pub const DEFAULT_SEARCH: Duration = Duration::from_secs(2 * 60);
    pub const DEFAULT_DETAIL: Duration = Duration::from_secs(5 * 60);

    /// Same TTL for every category (handy in tests).
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            list: ttl,
            user: ttl,
            featured: ttl,
            search: ttl,
            detail: ttl,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            list: Self::DEFAULT_LIST,
            user: Self::DEFAULT_USER,
            featured: Self::DEFAULT_FEATURED,
            search: Self::DEFAULT_SEARCH,
            detail: Self::DEFAULT_DETAIL,
        }
    }
}

fn secs(config: &MiseConfig, key: &str, default: Duration) -> Result<Duration, ConfigError> {
    Ok(config
        .get_opt::<u64>(key)?
        .map(Duration::from_secs)
        .unwrap_or(default))
}

impl ConfigProperties for TtlPolicy {
    fn prefix() -> &'static str {
        "cache.ttl"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        [
            ("cache.ttl.list.secs", "TTL of paged recipe listings"),
            ("cache.ttl.user.secs", "TTL of per-user collections"),
            ("cache.ttl.featured.secs", "TTL of featured recipes"),
            ("cache.ttl.search.secs", "TTL of search results"),
            ("cache.ttl.detail.secs", "TTL of a single recipe"),
        ]
        .into_iter()
        .map(|(key, description)| PropertyMeta {
            key,
            type_name: "u64",
            description,
        })
        .collect()
    }

    fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            list: secs(config, "cache.ttl.list.secs", Self::DEFAULT_LIST)?,
            user: secs(config, "cache.ttl.user.secs", Self::DEFAULT_USER)?,
            featured: secs(config, "cache.ttl.featured.secs", Self::DEFAULT_FEATURED)?,
            search: secs(config, "cache.ttl.search.secs", Self::DEFAULT_SEARCH)?,
            detail: secs(config, "cache.ttl.detail.secs", Self::DEFAULT_DETAIL)?,
        })
    }
}
