use std::future::Future;

use crate::config::BackendConfig;
use crate::error::DataError;
use crate::model::{
    NewRecipe, NewUser, Recipe, RecipePatch, Review, ReviewInput, SearchParams, Session, User,
    UserPatch,
};
use crate::offline::OfflineGateway;
use crate::page::{RecipeQuery, RecipePage};
use crate::remote::RemoteGateway;
use crate::retry::RetryPolicy;

/// Which backend a gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Remote,
    Offline,
}

impl std::fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayMode::Remote => write!(f, "remote"),
            GatewayMode::Offline => write!(f, "offline"),
        }
    }
}

/// Request/response contract with the recipe backend.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait`
/// needed. Every returned future is `Send` so callers can share it across
/// tasks.
pub trait DataGateway: Send + Sync + 'static {
    fn mode(&self) -> GatewayMode;

    // ── Recipes ──

    fn list_recipes(
        &self,
        query: RecipeQuery,
    ) -> impl Future<Output = Result<RecipePage, DataError>> + Send;
    fn featured_recipes(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Recipe>, DataError>> + Send;
    fn user_recipes(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Recipe>, DataError>> + Send;
    fn saved_recipes(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Recipe>, DataError>> + Send;
    fn search_recipes(
        &self,
        params: &SearchParams,
    ) -> impl Future<Output = Result<Vec<Recipe>, DataError>> + Send;
    /// Fails with [`DataError::NotFound`] for an unknown id.
    fn get_recipe(&self, id: &str) -> impl Future<Output = Result<Recipe, DataError>> + Send;
    fn create_recipe(
        &self,
        recipe: &NewRecipe,
    ) -> impl Future<Output = Result<Recipe, DataError>> + Send;
    fn update_recipe(
        &self,
        id: &str,
        patch: &RecipePatch,
    ) -> impl Future<Output = Result<(), DataError>> + Send;
    fn delete_recipe(&self, id: &str) -> impl Future<Output = Result<(), DataError>> + Send;

    // ── Saved recipes & reviews ──

    fn save_recipe(
        &self,
        recipe_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<(), DataError>> + Send;
    fn unsave_recipe(
        &self,
        recipe_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<(), DataError>> + Send;
    /// Insert or replace the user's review of a recipe.
    fn rate_recipe(&self, review: &ReviewInput)
        -> impl Future<Output = Result<(), DataError>> + Send;
    fn recipe_reviews(
        &self,
        recipe_id: &str,
    ) -> impl Future<Output = Result<Vec<Review>, DataError>> + Send;

    // ── Users ──

    /// Fails with [`DataError::NotFound`] for an unknown id.
    fn get_user(&self, id: &str) -> impl Future<Output = Result<User, DataError>> + Send;
    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, DataError>> + Send;
    fn create_user(&self, user: &NewUser) -> impl Future<Output = Result<User, DataError>> + Send;
    fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> impl Future<Output = Result<(), DataError>> + Send;

    // ── Auth ──

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, DataError>> + Send;
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, DataError>> + Send;
    fn sign_out(&self) -> impl Future<Output = Result<(), DataError>> + Send;
    /// Current session, `None` when signed out.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, DataError>> + Send;
}

/// The gateway selected at startup.
pub enum Gateway {
    Remote(RemoteGateway),
    Offline(OfflineGateway),
}

impl Gateway {
    /// Pick the remote gateway when `backend` is usable, offline otherwise.
    pub fn from_config(backend: &BackendConfig, retry: &RetryPolicy) -> Self {
        if !backend.is_valid() {
            tracing::warn!("backend not configured, serving offline sample data");
            return Gateway::Offline(OfflineGateway::new());
        }
        match RemoteGateway::new(backend, *retry) {
            Ok(remote) => {
                tracing::info!(url = remote.base_url(), "using remote backend");
                Gateway::Remote(remote)
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not build backend client, serving offline sample data");
                Gateway::Offline(OfflineGateway::new())
            }
        }
    }
}

macro_rules! delegate {
    ($self:ident, $gw:ident => $call:expr) => {
        match $self {
            Gateway::Remote($gw) => $call.await,
            Gateway::Offline($gw) => $call.await,
        }
    };
}

impl DataGateway for Gateway {
    fn mode(&self) -> GatewayMode {
        match self {
            Gateway::Remote(_) => GatewayMode::Remote,
            Gateway::Offline(_) => GatewayMode::Offline,
        }
    }

    async fn list_recipes(&self, query: RecipeQuery) -> Result<RecipePage, DataError> {
        delegate!(self, gw => gw.list_recipes(query))
    }

    async fn featured_recipes(&self, limit: u32) -> Result<Vec<Recipe>, DataError> {
        delegate!(self, gw => gw.featured_recipes(limit))
    }

    async fn user_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DataError> {
        delegate!(self, gw => gw.user_recipes(user_id))
    }

    async fn saved_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DataError> {
        delegate!(self, gw => gw.saved_recipes(user_id))
    }

    async fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>, DataError> {
        delegate!(self, gw => gw.search_recipes(params))
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, DataError> {
        delegate!(self, gw => gw.get_recipe(id))
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, DataError> {
        delegate!(self, gw => gw.create_recipe(recipe))
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<(), DataError> {
        delegate!(self, gw => gw.update_recipe(id, patch))
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), DataError> {
        delegate!(self, gw => gw.delete_recipe(id))
    }

    async fn save_recipe(&self, recipe_id: &str, user_id: &str) -> Result<(), DataError> {
        delegate!(self, gw => gw.save_recipe(recipe_id, user_id))
    }

    async fn unsave_recipe(&self, recipe_id: &str, user_id: &str) -> Result<(), DataError> {
        delegate!(self, gw => gw.unsave_recipe(recipe_id, user_id))
    }

    async fn rate_recipe(&self, review: &ReviewInput) -> Result<(), DataError> {
        delegate!(self, gw => gw.rate_recipe(review))
    }

    async fn recipe_reviews(&self, recipe_id: &str) -> Result<Vec<Review>, DataError> {
        delegate!(self, gw => gw.recipe_reviews(recipe_id))
    }

    async fn get_user(&self, id: &str) -> Result<User, DataError> {
        delegate!(self, gw => gw.get_user(id))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DataError> {
        delegate!(self, gw => gw.find_user_by_username(username))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DataError> {
        delegate!(self, gw => gw.create_user(user))
    }

    async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<(), DataError> {
        delegate!(self, gw => gw.update_user(id, patch))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DataError> {
        delegate!(self, gw => gw.sign_in(email, password))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, DataError> {
        delegate!(self, gw => gw.sign_up(email, password))
    }

    async fn sign_out(&self) -> Result<(), DataError> {
        delegate!(self, gw => gw.sign_out())
    }

    async fn get_session(&self) -> Result<Option<Session>, DataError> {
        delegate!(self, gw => gw.get_session())
    }
}
