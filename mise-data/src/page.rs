use serde::{Deserialize, Serialize};

use crate::model::Recipe;

/// One-based page request for the recipe listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self { page: 1, limit: 12 }
    }
}

impl RecipeQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }
}

/// A page of recipes with pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePage {
    pub items: Vec<Recipe>,
    /// Total number of matching recipes across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// A full page came back, so another one may follow.
    pub has_more: bool,
}

impl RecipePage {
    pub fn new(items: Vec<Recipe>, query: &RecipeQuery, total: u64) -> Self {
        let has_more = query.limit > 0 && items.len() == query.limit as usize;
        Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
            has_more,
        }
    }

    pub fn empty(query: &RecipeQuery) -> Self {
        Self::new(Vec::new(), query, 0)
    }
}
