use mise_core::config::{ConfigError, ConfigProperties, MiseConfig, PropertyMeta};

/// Sizes used by the recipe store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Recipes per listing page.
    pub page_size: u32,
    /// How many featured recipes to show.
    pub featured_limit: u32,
}

impl StoreConfig {
    pub const DEFAULT_PAGE_SIZE: u32 = 12;
    pub const DEFAULT_FEATURED_LIMIT: u32 = 6;
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            featured_limit: Self::DEFAULT_FEATURED_LIMIT,
        }
    }
}

impl ConfigProperties for StoreConfig {
    fn prefix() -> &'static str {
        "recipes"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![
            PropertyMeta {
                key: "recipes.page.size",
                type_name: "u32",
                description: "Recipes per listing page",
            },
            PropertyMeta {
                key: "recipes.featured.limit",
                type_name: "u32",
                description: "Number of featured recipes",
            },
        ]
    }

    fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
        let page_size = config
            .get_opt("recipes.page.size")?
            .unwrap_or(Self::DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::Validation(vec![
                mise_core::ConfigValidationDetail {
                    key: "recipes.page.size".into(),
                    message: "must be at least 1".into(),
                },
            ]));
        }
        Ok(Self {
            page_size,
            featured_limit: config
                .get_opt("recipes.featured.limit")?
                .unwrap_or(Self::DEFAULT_FEATURED_LIMIT),
        })
    }
}
