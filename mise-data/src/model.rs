//! Domain records exchanged with the backend.
//!
//! Field names follow the backend's snake_case columns so the types
//! deserialize straight from PostgREST rows.

use chrono::{DateTime, Utc};
use mise_core::Identity;
use mise_security::{Permission, Role, RoleBasedIdentity};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Treat an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    Draft,
    Published,
    Archived,
    Flagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Published,
    Flagged,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// Author summary embedded in recipe rows (`author:users(username, avatar_url)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub quantity: String,
    pub unit: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: u32,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub fiber: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "nullable")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "nullable")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    /// Minutes.
    pub cook_time: u32,
    /// Minutes.
    pub prep_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, deserialize_with = "nullable")]
    pub rating: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub gallery_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_published: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecipeStatus>,
}

impl Recipe {
    pub fn total_time(&self) -> u32 {
        self.cook_time.saturating_add(self.prep_time)
    }

    /// Exact tag membership, the comparison the backend's `ov.` filter makes.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Payload for creating a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub author_id: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub cook_time: u32,
    pub prep_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Partial recipe update. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecipeStatus>,
}

/// A user profile row.
///
/// `role` is the authoritative admin signal. `is_admin` is a legacy column
/// kept so rows round-trip unchanged; nothing in the workspace reads it for
/// access decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub dietary_preferences: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub role: Role,
    #[serde(default, deserialize_with = "nullable")]
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identity for User {
    fn sub(&self) -> &str {
        &self.id
    }

    fn email(&self) -> Option<&str> {
        Some(&self.email)
    }
}

impl RoleBasedIdentity for User {
    fn role(&self) -> Role {
        self.role
    }

    fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

/// Profile row inserted right after sign-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub role: Role,
}

impl NewUser {
    /// New accounts always start as plain users.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        full_name: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            username: username.into(),
            full_name,
            is_admin: false,
            role: Role::User,
        }
    }
}

/// Self-service profile changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<Vec<String>>,
}

impl UserPatch {
    /// Merge the present fields into `user`.
    pub fn apply(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(full_name) = &self.full_name {
            user.full_name = Some(full_name.clone());
        }
        if let Some(avatar_url) = &self.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
        if let Some(bio) = &self.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(prefs) = &self.dietary_preferences {
            user.dietary_preferences = prefs.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub recipe_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
}

/// Rating submitted by a user; one per `(recipe_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewInput {
    pub recipe_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub recipe_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Authenticated session returned by the auth API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Absent when sign-up is waiting for email confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Filters applied on top of a free-text search. Empty lists and `None`
/// mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// At least one listed cuisine must appear verbatim among the recipe's tags.
    #[serde(default)]
    pub cuisine: Vec<String>,
    #[serde(default)]
    pub difficulty: Vec<Difficulty>,
    #[serde(default)]
    pub max_cook_time: Option<u32>,
    /// At least one listed diet must appear verbatim among the recipe's tags.
    #[serde(default)]
    pub dietary: Vec<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.cuisine.is_empty()
            && self.difficulty.is_empty()
            && self.max_cook_time.is_none()
            && self.dietary.is_empty()
    }

    /// Stable string form, used in cache keys. `None` when no filter is set.
    pub fn fingerprint(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut parts = Vec::new();
        if !self.cuisine.is_empty() {
            parts.push(format!("c={}", sorted(&self.cuisine).join(",")));
        }
        if !self.difficulty.is_empty() {
            let mut levels: Vec<&str> = self.difficulty.iter().map(|d| d.as_str()).collect();
            levels.sort_unstable();
            levels.dedup();
            parts.push(format!("d={}", levels.join(",")));
        }
        if let Some(max) = self.max_cook_time {
            parts.push(format!("t={max}"));
        }
        if !self.dietary.is_empty() {
            parts.push(format!("v={}", sorted(&self.dietary).join(",")));
        }
        Some(parts.join(";"))
    }

    /// Whether `recipe` passes every active filter.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let any_tag = |wanted: &[String]| wanted.is_empty() || wanted.iter().any(|w| recipe.has_tag(w));
        any_tag(self.cuisine.as_slice())
            && any_tag(self.dietary.as_slice())
            && (self.difficulty.is_empty() || self.difficulty.contains(&recipe.difficulty))
            && self.max_cook_time.map_or(true, |max| recipe.cook_time <= max)
    }
}

fn sorted(values: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = values.iter().map(String::as_str).collect();
    out.sort_unstable();
    out.dedup();
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Case-insensitive substring match on title, description or any tag.
    /// An empty query matches everything.
    pub fn matches_text(&self, recipe: &Recipe) -> bool {
        let needle = self.query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        recipe.title.to_lowercase().contains(&needle)
            || recipe.description.to_lowercase().contains(&needle)
            || recipe.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.matches_text(recipe) && self.filters.matches(recipe)
    }
}
