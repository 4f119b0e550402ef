//! Cache key layout.
//!
//! Invalidation works by substring, so every key that holds recipe
//! collections contains `recipes`, and every search key starts with
//! `search-`.

use mise_data::SearchParams;

/// Pattern matching every cached recipe collection.
pub const RECIPES: &str = "recipes";
/// Pattern matching every cached search.
pub const SEARCH: &str = "search-";

pub fn page(page: u32, limit: u32) -> String {
    format!("recipes-page-{page}-{limit}")
}

pub fn featured(limit: u32) -> String {
    format!("featured-recipes-{limit}")
}

pub fn user_recipes(user_id: &str) -> String {
    format!("user-recipes-{user_id}")
}

pub fn saved_recipes(user_id: &str) -> String {
    format!("saved-recipes-{user_id}")
}

/// The query is written quoted and escaped, so no query text can run into
/// the filter fingerprint that follows it.
pub fn search(params: &SearchParams) -> String {
    match params.filters.fingerprint() {
        Some(fp) => format!("search-{:?}-{fp}", params.query),
        None => format!("search-{:?}", params.query),
    }
}

pub fn recipe(id: &str) -> String {
    format!("recipe-{id}")
}
