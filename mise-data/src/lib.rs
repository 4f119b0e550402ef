pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod offline;
pub mod page;
pub mod query;
pub mod remote;
pub mod retry;

pub use config::BackendConfig;
pub use error::DataError;
pub use gateway::{DataGateway, Gateway, GatewayMode};
pub use model::{
    Author, Difficulty, Ingredient, MediaType, Nutrition, NewRecipe, NewUser, Recipe,
    RecipePatch, RecipeStatus, Review, ReviewInput, ReviewStatus, SavedRecipe, SearchFilters,
    SearchParams, Session, Step, User, UserPatch,
};
pub use offline::{sample_recipes, OfflineGateway};
pub use page::{RecipePage, RecipeQuery};
pub use query::PostgrestQuery;
pub use remote::RemoteGateway;
pub use retry::{with_retry, RetryPolicy};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, DataGateway, Gateway, Recipe, RecipePage, RecipeQuery, SearchParams, User,
    };
}
