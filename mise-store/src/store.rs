use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mise_cache::{Deduplicator, ResultCache, TtlPolicy};
use mise_data::{
    DataError, DataGateway, Gateway, NewRecipe, OfflineGateway, Recipe, RecipePage, RecipePatch,
    RecipeQuery, ReviewInput, SearchParams,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::keys;
use crate::notice::{NoticeReceiver, Notifier};
use crate::state::{FilterUpdate, Pagination, RecipeFilters, RecipeState};

/// Write operations, each with its own wording in notices.
#[derive(Debug, Clone, Copy)]
enum Mutation {
    Add,
    Update,
    Delete,
    Save,
    Unsave,
    Rate,
}

impl Mutation {
    fn not_configured(self) -> String {
        let what = match self {
            Mutation::Add => "add recipes",
            Mutation::Update => "update recipes",
            Mutation::Delete => "delete recipes",
            Mutation::Save => "save recipes",
            Mutation::Unsave => "unsave recipes",
            Mutation::Rate => "rate recipes",
        };
        format!("Database not configured. Please set up Supabase to {what}.")
    }

    fn failed(self) -> String {
        let what = match self {
            Mutation::Add => "add recipe",
            Mutation::Update => "update recipe",
            Mutation::Delete => "delete recipe",
            Mutation::Save => "save recipe",
            Mutation::Unsave => "remove recipe from saved",
            Mutation::Rate => "submit review",
        };
        format!("Failed to {what}. Please check your database connection.")
    }

    fn succeeded(self) -> &'static str {
        match self {
            Mutation::Add => "Recipe added successfully!",
            Mutation::Update => "Recipe updated successfully!",
            Mutation::Delete => "Recipe deleted successfully!",
            Mutation::Save => "Recipe saved!",
            Mutation::Unsave => "Recipe removed from saved",
            Mutation::Rate => "Review submitted!",
        }
    }
}

/// Recipe data for the application: cached reads with an offline fallback,
/// and mutations that keep the cache honest.
///
/// Reads go cache, then in-flight request, then gateway. A failed gateway
/// read is answered from the bundled sample data instead, and that answer
/// is cached like any other. Reads therefore never fail, apart from
/// [`fetch_recipe`](RecipeStore::fetch_recipe) on an id nobody knows.
///
/// Mutations return the gateway's result and publish a [`Notice`] either
/// way.
///
/// [`Notice`]: crate::Notice
pub struct RecipeStore<G: DataGateway = Gateway> {
    gateway: Arc<G>,
    offline: OfflineGateway,
    dedup: Deduplicator<DataError>,
    ttl: TtlPolicy,
    config: StoreConfig,
    state: RwLock<RecipeState>,
    notifier: Notifier,
}

impl<G: DataGateway> RecipeStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let config = StoreConfig::default();
        Self {
            gateway,
            offline: OfflineGateway::new(),
            dedup: Deduplicator::new(ResultCache::new()),
            ttl: TtlPolicy::default(),
            config,
            state: RwLock::new(RecipeState::new(config.page_size)),
            notifier: Notifier::default(),
        }
    }

    /// Share an existing cache (and its in-flight table).
    pub fn with_dedup(mut self, dedup: Deduplicator<DataError>) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_ttl(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self.state = RwLock::new(RecipeState::new(config.page_size));
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Dataset used when the gateway fails a read.
    pub fn with_offline(mut self, offline: OfflineGateway) -> Self {
        self.offline = offline;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &ResultCache {
        self.dedup.cache()
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    pub fn subscribe(&self) -> NoticeReceiver {
        self.notifier.subscribe()
    }

    /// Copy of the current state.
    pub async fn state(&self) -> RecipeState {
        self.state.read().await.clone()
    }

    // ── Reads ──

    /// Load one page of the main listing. Page 1 replaces the list, later
    /// pages append to it.
    pub async fn fetch_recipes(&self, page: u32) -> RecipePage {
        let query = RecipeQuery::new(page, self.config.page_size);
        self.set_loading().await;

        let gateway = Arc::clone(&self.gateway);
        let result = self
            .read(
                &keys::page(query.page, query.limit),
                self.ttl.list,
                async move { gateway.list_recipes(query).await },
                move |offline| offline.page(&query),
            )
            .await;

        let mut state = self.state.write().await;
        if result.page <= 1 {
            state.recipes = result.items.clone();
        } else {
            state.recipes.extend(result.items.iter().cloned());
        }
        state.pagination = Pagination {
            page: result.page,
            limit: result.limit,
            total: result.total,
            has_more: result.has_more,
        };
        state.is_loading = false;
        drop(state);
        result
    }

    /// Load the page after the last one loaded, if there may be one.
    pub async fn fetch_next_page(&self) -> Option<RecipePage> {
        let pagination = self.state.read().await.pagination.clone();
        if !pagination.has_more {
            return None;
        }
        Some(self.fetch_recipes(pagination.page + 1).await)
    }

    pub async fn fetch_featured_recipes(&self) -> Vec<Recipe> {
        let limit = self.config.featured_limit;
        let gateway = Arc::clone(&self.gateway);
        let featured = self
            .read(
                &keys::featured(limit),
                self.ttl.featured,
                async move { gateway.featured_recipes(limit).await },
                move |offline| offline.featured(limit),
            )
            .await;
        self.state.write().await.featured_recipes = featured.clone();
        featured
    }

    pub async fn fetch_user_recipes(&self, user_id: &str) -> Vec<Recipe> {
        self.set_loading().await;
        let gateway = Arc::clone(&self.gateway);
        let (owner, fallback_owner) = (user_id.to_string(), user_id.to_string());
        let recipes = self
            .read(
                &keys::user_recipes(user_id),
                self.ttl.user,
                async move { gateway.user_recipes(&owner).await },
                move |offline| offline.by_author(&fallback_owner),
            )
            .await;
        let mut state = self.state.write().await;
        state.user_recipes = recipes.clone();
        state.is_loading = false;
        drop(state);
        recipes
    }

    pub async fn fetch_saved_recipes(&self, user_id: &str) -> Vec<Recipe> {
        let gateway = Arc::clone(&self.gateway);
        let owner = user_id.to_string();
        let saved = self
            .read(
                &keys::saved_recipes(user_id),
                self.ttl.user,
                async move { gateway.saved_recipes(&owner).await },
                |offline| offline.saved(),
            )
            .await;
        self.state.write().await.saved_recipes = saved.clone();
        saved
    }

    /// Search with the current filters. The results replace the main
    /// listing.
    pub async fn search_recipes(&self, query: &str) -> Vec<Recipe> {
        let params = {
            let mut state = self.state.write().await;
            state.search_query = query.to_string();
            state.is_loading = true;
            SearchParams::new(query).with_filters(state.filters.to_search_filters())
        };

        let gateway = Arc::clone(&self.gateway);
        let key = keys::search(&params);
        let fallback_params = params.clone();
        let results = self
            .read(
                &key,
                self.ttl.search,
                async move { gateway.search_recipes(&params).await },
                move |offline| offline.search(&fallback_params),
            )
            .await;

        let mut state = self.state.write().await;
        state.recipes = results.clone();
        state.is_loading = false;
        drop(state);
        results
    }

    /// Load a single recipe into `current_recipe`.
    ///
    /// A `NotFound` from the gateway is returned as is. Other failures fall
    /// back to the sample data, which may not know the id either.
    pub async fn fetch_recipe(&self, id: &str) -> Result<Recipe, DataError> {
        let gateway = Arc::clone(&self.gateway);
        let owned_id = id.to_string();
        let fallback_id = id.to_string();
        let recipe = self
            .load(
                &keys::recipe(id),
                self.ttl.detail,
                async move { gateway.get_recipe(&owned_id).await },
                move |offline| offline.find(&fallback_id),
            )
            .await?;
        self.state.write().await.current_recipe = Some(recipe.clone());
        Ok(recipe)
    }

    // ── Mutations ──

    pub async fn add_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, DataError> {
        let result = self.gateway.create_recipe(recipe).await;
        if let Ok(created) = &result {
            self.invalidate_recipe(&created.id);
        }
        self.report(Mutation::Add, result)
    }

    pub async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<(), DataError> {
        let result = self.gateway.update_recipe(id, patch).await;
        if result.is_ok() {
            self.invalidate_recipe(id);
        }
        self.report(Mutation::Update, result)
    }

    pub async fn delete_recipe(&self, id: &str) -> Result<(), DataError> {
        let result = self.gateway.delete_recipe(id).await;
        if result.is_ok() {
            self.invalidate_recipe(id);
            let mut state = self.state.write().await;
            state.user_recipes.retain(|r| r.id != id);
            if state.current_recipe.as_ref().is_some_and(|r| r.id == id) {
                state.current_recipe = None;
            }
        }
        self.report(Mutation::Delete, result)
    }

    pub async fn save_recipe(&self, recipe_id: &str, user_id: &str) -> Result<(), DataError> {
        let result = self.gateway.save_recipe(recipe_id, user_id).await;
        if result.is_ok() {
            self.cache().invalidate(Some(keys::saved_recipes(user_id).as_str()));
        }
        self.report(Mutation::Save, result)
    }

    pub async fn unsave_recipe(&self, recipe_id: &str, user_id: &str) -> Result<(), DataError> {
        let result = self.gateway.unsave_recipe(recipe_id, user_id).await;
        if result.is_ok() {
            self.cache().invalidate(Some(keys::saved_recipes(user_id).as_str()));
            self.state
                .write()
                .await
                .saved_recipes
                .retain(|r| r.id != recipe_id);
        }
        self.report(Mutation::Unsave, result)
    }

    /// Submit or replace the user's rating of a recipe.
    pub async fn rate_recipe(
        &self,
        recipe_id: &str,
        user_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(), DataError> {
        let review = ReviewInput {
            recipe_id: recipe_id.to_string(),
            user_id: user_id.to_string(),
            rating,
            comment,
        };
        let result = self.gateway.rate_recipe(&review).await;
        if result.is_ok() {
            self.invalidate_recipe(recipe_id);
        }
        self.report(Mutation::Rate, result)
    }

    // ── Local state ──

    pub async fn set_search_query(&self, query: &str) {
        self.state.write().await.search_query = query.to_string();
    }

    pub async fn set_filters(&self, update: FilterUpdate) {
        self.state.write().await.filters.merge(update);
    }

    pub async fn clear_filters(&self) {
        self.state.write().await.filters = RecipeFilters::default();
    }

    // ── Internals ──

    async fn set_loading(&self) {
        self.state.write().await.is_loading = true;
    }

    fn invalidate_recipe(&self, id: &str) {
        let cache = self.cache();
        cache.invalidate(Some(keys::RECIPES));
        cache.invalidate(Some(keys::SEARCH));
        cache.invalidate(Some(keys::recipe(id).as_str()));
    }

    fn report<T>(&self, mutation: Mutation, result: Result<T, DataError>) -> Result<T, DataError> {
        match &result {
            Ok(_) => self.notifier.success(mutation.succeeded()),
            Err(DataError::NotConfigured) => self.notifier.error(mutation.not_configured()),
            Err(err) => {
                tracing::error!(?mutation, error = %err, "recipe mutation failed");
                self.notifier.error(mutation.failed());
            }
        }
        result
    }

    /// Deduplicated, cached read. Gateway failures other than `NotFound`
    /// are answered by `fallback` against the sample data.
    async fn load<T, Fut, F>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: Fut,
        fallback: F,
    ) -> Result<T, DataError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        Fut: Future<Output = Result<T, DataError>> + Send + 'static,
        F: FnOnce(&OfflineGateway) -> Result<T, DataError> + Send + 'static,
    {
        let offline = self.offline.clone();
        let owned_key = key.to_string();
        self.dedup
            .request_and_cache(key, ttl, move || async move {
                match fetch.await {
                    Err(DataError::NotFound(what)) => Err(DataError::NotFound(what)),
                    Err(err) => {
                        tracing::warn!(key = %owned_key, error = %err, "backend read failed, serving sample data");
                        fallback(&offline)
                    }
                    ok => ok,
                }
            })
            .await
    }

    /// [`load`](Self::load) for reads whose fallback always succeeds.
    async fn read<T, Fut, F>(&self, key: &str, ttl: Duration, fetch: Fut, fallback: F) -> T
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        Fut: Future<Output = Result<T, DataError>> + Send + 'static,
        F: Fn(&OfflineGateway) -> T + Clone + Send + 'static,
    {
        let cached_fallback = fallback.clone();
        match self
            .load(key, ttl, fetch, move |offline| Ok(cached_fallback(offline)))
            .await
        {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(key, error = %err, "read failed, serving sample data");
                fallback(&self.offline)
            }
        }
    }
}
