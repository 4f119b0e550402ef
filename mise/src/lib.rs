//! Mise: the data core of a recipe application.
//!
//! This facade re-exports the Mise sub-crates through a single dependency
//! and adds [`MiseApp`], which wires them together from configuration.
//!
//! ```ignore
//! use mise::prelude::*;
//!
//! let config = MiseConfig::load("dev")?;
//! let app = MiseApp::from_config(&config)?;
//! app.auth().initialize().await;
//! let featured = app.recipes().fetch_featured_recipes().await;
//! ```
//!
//! | Crate           | Contents                                        |
//! |-----------------|-------------------------------------------------|
//! | `mise-core`     | configuration, logging, `AppError`, `Identity`  |
//! | `mise-cache`    | TTL result cache, request deduplication          |
//! | `mise-security` | roles, permission checks, route guard           |
//! | `mise-data`     | domain model, remote and offline gateways       |
//! | `mise-store`    | recipe store, auth session, notices             |

mod app;

pub use app::MiseApp;

pub use mise_cache;
pub use mise_core;
pub use mise_data;
pub use mise_security;
pub use mise_store;

pub use mise_core::*;

/// Unified prelude: `use mise::prelude::*`.
pub mod prelude {
    pub use crate::MiseApp;
    pub use mise_cache::prelude::*;
    pub use mise_core::prelude::*;
    pub use mise_data::prelude::*;
    pub use mise_security::prelude::*;
    pub use mise_store::prelude::*;
}
