use std::sync::Arc;

use mise_cache::{Deduplicator, ResultCache, TtlPolicy};
use mise_core::config::{ConfigError, ConfigProperties, MiseConfig, PropertyMeta};
use mise_data::{BackendConfig, DataError, DataGateway, Gateway, GatewayMode, RetryPolicy};
use mise_store::{AuthSession, NoticeReceiver, Notifier, RecipeStore, StoreConfig};

/// Everything an application needs, wired from configuration.
///
/// One gateway, one cache and one notice channel are shared by the recipe
/// store and the auth session.
pub struct MiseApp {
    gateway: Arc<Gateway>,
    recipes: RecipeStore<Gateway>,
    auth: AuthSession<Gateway>,
    notifier: Notifier,
}

impl MiseApp {
    /// Build from the `backend`, `retry`, `cache.ttl` and `recipes` sections.
    /// A missing or placeholder backend selects offline mode.
    pub fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
        let backend = BackendConfig::from_config(config)?;
        let retry = RetryPolicy::from_config(config)?;
        let gateway = Gateway::from_config(&backend, &retry);
        let app = Self::with_gateway(
            gateway,
            TtlPolicy::from_config(config)?,
            StoreConfig::from_config(config)?,
        );
        tracing::info!(mode = %app.mode(), profile = config.profile(), "mise ready");
        Ok(app)
    }

    /// Every setting [`from_config`](MiseApp::from_config) reads, section by
    /// section.
    pub fn settings() -> Vec<PropertyMeta> {
        [
            BackendConfig::properties_metadata(),
            RetryPolicy::properties_metadata(),
            TtlPolicy::properties_metadata(),
            StoreConfig::properties_metadata(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Offline app over the bundled sample recipes, with default settings.
    pub fn offline() -> Self {
        Self::with_gateway(
            Gateway::Offline(Default::default()),
            TtlPolicy::default(),
            StoreConfig::default(),
        )
    }

    fn with_gateway(gateway: Gateway, ttl: TtlPolicy, store: StoreConfig) -> Self {
        let gateway = Arc::new(gateway);
        let notifier = Notifier::default();
        let dedup = Deduplicator::<DataError>::new(ResultCache::new());
        let recipes = RecipeStore::new(Arc::clone(&gateway))
            .with_dedup(dedup)
            .with_ttl(ttl)
            .with_config(store)
            .with_notifier(notifier.clone());
        let auth = AuthSession::new(Arc::clone(&gateway)).with_notifier(notifier.clone());
        Self {
            gateway,
            recipes,
            auth,
            notifier,
        }
    }

    pub fn mode(&self) -> GatewayMode {
        self.gateway.mode()
    }

    pub fn recipes(&self) -> &RecipeStore<Gateway> {
        &self.recipes
    }

    pub fn auth(&self) -> &AuthSession<Gateway> {
        &self.auth
    }

    /// Notices from both the recipe store and the auth session.
    pub fn subscribe(&self) -> NoticeReceiver {
        self.notifier.subscribe()
    }
}
