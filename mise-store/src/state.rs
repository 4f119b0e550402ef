//! Snapshot types describing what the recipe store currently holds.

use mise_data::{Difficulty, Recipe, SearchFilters};
use serde::{Deserialize, Serialize};

/// Filter panel state.
///
/// Unlike [`SearchFilters`], the cook-time limit always has a value; the
/// panel starts at [`RecipeFilters::DEFAULT_MAX_COOK_TIME`] minutes, which
/// counts as "no limit".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFilters {
    pub cuisine: Vec<String>,
    pub difficulty: Vec<Difficulty>,
    /// Minutes.
    pub max_cook_time: u32,
    pub dietary: Vec<String>,
}

impl RecipeFilters {
    pub const DEFAULT_MAX_COOK_TIME: u32 = 120;

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Filters to send with a search. Fields still at their default value
    /// are left out, so a default panel yields an empty [`SearchFilters`].
    pub fn to_search_filters(&self) -> SearchFilters {
        SearchFilters {
            cuisine: self.cuisine.clone(),
            difficulty: self.difficulty.clone(),
            max_cook_time: (self.max_cook_time != Self::DEFAULT_MAX_COOK_TIME)
                .then_some(self.max_cook_time),
            dietary: self.dietary.clone(),
        }
    }

    /// Overwrite the fields present in `update`.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(cuisine) = update.cuisine {
            self.cuisine = cuisine;
        }
        if let Some(difficulty) = update.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(max) = update.max_cook_time {
            self.max_cook_time = max;
        }
        if let Some(dietary) = update.dietary {
            self.dietary = dietary;
        }
    }
}

impl Default for RecipeFilters {
    fn default() -> Self {
        Self {
            cuisine: Vec::new(),
            difficulty: Vec::new(),
            max_cook_time: Self::DEFAULT_MAX_COOK_TIME,
            dietary: Vec::new(),
        }
    }
}

/// Partial filter change; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Vec<Difficulty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cook_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Last page loaded.
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 0,
            limit,
            total: 0,
            has_more: true,
        }
    }
}

/// Everything the recipe store exposes to a view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeState {
    /// Main listing: accumulated pages, or the latest search results.
    pub recipes: Vec<Recipe>,
    pub featured_recipes: Vec<Recipe>,
    pub user_recipes: Vec<Recipe>,
    pub saved_recipes: Vec<Recipe>,
    pub current_recipe: Option<Recipe>,
    pub is_loading: bool,
    pub search_query: String,
    pub filters: RecipeFilters,
    pub pagination: Pagination,
}

impl RecipeState {
    pub fn new(page_size: u32) -> Self {
        Self {
            recipes: Vec::new(),
            featured_recipes: Vec::new(),
            user_recipes: Vec::new(),
            saved_recipes: Vec::new(),
            current_recipe: None,
            is_loading: false,
            search_query: String::new(),
            filters: RecipeFilters::default(),
            pagination: Pagination::new(page_size),
        }
    }
}
