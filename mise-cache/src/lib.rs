//! In-memory result cache and request deduplication.
//!
//! [`ResultCache`] holds serialized values under string keys, each with its
//! own time-to-live. [`Deduplicator`] sits in front of it and makes
//! concurrent callers for the same key share one underlying fetch.

pub mod dedup;
pub mod error;
pub mod policy;
pub mod store;

pub use dedup::{batch, Deduplicator};
pub use error::CacheError;
pub use policy::TtlPolicy;
pub use store::ResultCache;

pub mod prelude {
    pub use crate::{batch, CacheError, Deduplicator, ResultCache, TtlPolicy};
}
