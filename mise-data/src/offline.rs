use std::sync::{Arc, OnceLock};

use crate::error::DataError;
use crate::gateway::{DataGateway, GatewayMode};
use crate::model::{
    NewRecipe, NewUser, Recipe, RecipePatch, Review, ReviewInput, SearchParams, Session, User,
    UserPatch,
};
use crate::page::{RecipeQuery, RecipePage};

const SAMPLE_RECIPES_JSON: &str = include_str!("../data/sample_recipes.json");

/// Number of sample recipes shown as "saved" in offline mode.
pub const OFFLINE_SAVED_COUNT: usize = 3;

static SAMPLES: OnceLock<Arc<Vec<Recipe>>> = OnceLock::new();

/// The bundled sample dataset, parsed once per process.
pub fn sample_recipes() -> Arc<Vec<Recipe>> {
    SAMPLES
        .get_or_init(|| match serde_json::from_str(SAMPLE_RECIPES_JSON) {
            Ok(recipes) => Arc::new(recipes),
            Err(err) => {
                tracing::error!(error = %err, "bundled sample recipes are malformed");
                Arc::new(Vec::new())
            }
        })
        .clone()
}

/// Gateway over a fixed in-memory dataset.
///
/// Reads are deterministic functions of the dataset. Mutations and
/// sign-in/sign-up fail with [`DataError::NotConfigured`]. The same
/// functions back the fallback path of the remote gateway's callers.
#[derive(Clone)]
pub struct OfflineGateway {
    recipes: Arc<Vec<Recipe>>,
}

impl Default for OfflineGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineGateway {
    pub fn new() -> Self {
        Self {
            recipes: sample_recipes(),
        }
    }

    /// Serve a custom dataset instead of the bundled samples.
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: Arc::new(recipes),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    fn published(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().filter(|r| r.is_published)
    }

    /// Published recipes, newest first, sliced to the requested page.
    pub fn page(&self, query: &RecipeQuery) -> RecipePage {
        let mut all: Vec<&Recipe> = self.published().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();
        RecipePage::new(items, query, total)
    }

    /// Published and featured recipes, best rated first.
    pub fn featured(&self, limit: u32) -> Vec<Recipe> {
        let mut featured: Vec<Recipe> = self.published().filter(|r| r.is_featured).cloned().collect();
        sort_by_rating(&mut featured);
        featured.truncate(limit as usize);
        featured
    }

    /// Recipes written by `user_id`, newest first.
    pub fn by_author(&self, user_id: &str) -> Vec<Recipe> {
        let mut mine: Vec<Recipe> = self
            .recipes
            .iter()
            .filter(|r| r.author_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine
    }

    /// Offline mode has no per-user storage: everyone sees the same few
    /// recipes as saved.
    pub fn saved(&self) -> Vec<Recipe> {
        self.recipes.iter().take(OFFLINE_SAVED_COUNT).cloned().collect()
    }

    /// Published recipes matching the query text and filters, best rated
    /// first. Ties keep dataset order.
    pub fn search(&self, params: &SearchParams) -> Vec<Recipe> {
        let mut hits: Vec<Recipe> = self.published().filter(|r| params.matches(r)).cloned().collect();
        sort_by_rating(&mut hits);
        hits
    }

    pub fn find(&self, id: &str) -> Result<Recipe, DataError> {
        self.recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("recipe {id}")))
    }
}

fn sort_by_rating(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

impl DataGateway for OfflineGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Offline
    }

    async fn list_recipes(&self, query: RecipeQuery) -> Result<RecipePage, DataError> {
        Ok(self.page(&query))
    }

    async fn featured_recipes(&self, limit: u32) -> Result<Vec<Recipe>, DataError> {
        Ok(self.featured(limit))
    }

    async fn user_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DataError> {
        Ok(self.by_author(user_id))
    }

    async fn saved_recipes(&self, _user_id: &str) -> Result<Vec<Recipe>, DataError> {
        Ok(self.saved())
    }

    async fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>, DataError> {
        Ok(self.search(params))
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, DataError> {
        self.find(id)
    }

    async fn create_recipe(&self, _recipe: &NewRecipe) -> Result<Recipe, DataError> {
        Err(DataError::NotConfigured)
    }

    async fn update_recipe(&self, _id: &str, _patch: &RecipePatch) -> Result<(), DataError> {
        Err(DataError::NotConfigured)
    }

    async fn delete_recipe(&self, _id: &str) -> Result<(), DataError> {
        Err(DataError::NotConfigured)
    }

    async fn save_recipe(&self, _recipe_id: &str, _user_id: &str) -> Result<(), DataError> {
        Err(DataError::NotConfigured)
    }

    async fn unsave_recipe(&self, _recipe_id: &str, _user_id: &str) -> Result<(), DataError> {
        Err(DataError::NotConfigured)
    }

    async fn rate_recipe(&self, _review: &ReviewInput) -> Result<(), DataError> {
        Err(DataError::NotConfigured)
    }

    async fn recipe_reviews(&self, _recipe_id: &str) -> Result<Vec<Review>, DataError> {
        Ok(Vec::new())
    }

    async fn get_user(&self, id: &str) -> Result<User, DataError> {
        Err(DataError::NotFound(format!("user {id}")))
    }

    async fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, DataError> {
        Ok(None)
    }

    async fn create_user(&self, _user: &NewUser) -> Result<User, DataError> {
        Err(DataError::NotConfigured)
    }

    async fn update_user(&self, _id: &str, _patch: &UserPatch) -> Result<(), DataError> {
        Err(DataError::NotConfigured)
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, DataError> {
        Err(DataError::NotConfigured)
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Session, DataError> {
        Err(DataError::NotConfigured)
    }

    async fn sign_out(&self) -> Result<(), DataError> {
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, DataError> {
        Ok(None)
    }
}
