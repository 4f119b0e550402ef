//! Application-facing state for Mise.
//!
//! [`RecipeStore`] fronts a [`DataGateway`](mise_data::DataGateway) with the
//! result cache and request deduplicator, and falls back to the bundled
//! sample recipes whenever a read fails. [`AuthSession`] tracks the
//! signed-in user. Both report outcomes of user actions as [`Notice`]s.

pub mod auth;
pub mod config;
pub mod keys;
pub mod notice;
pub mod state;
pub mod store;

pub use auth::{AuthSession, SessionSnapshot};
pub use config::StoreConfig;
pub use notice::{Notice, NoticeReceiver, Notifier};
pub use state::{FilterUpdate, Pagination, RecipeFilters, RecipeState};
pub use store::RecipeStore;

pub mod prelude {
    pub use crate::{AuthSession, FilterUpdate, Notice, RecipeState, RecipeStore, SessionSnapshot};
}
