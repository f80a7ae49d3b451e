//! SQLite-backed entity store.
//!
//! The [`Database`] handle is cheap to clone (it wraps a connection pool)
//! and exposes the storage contract the orchestrator consumes: source
//! queries and seeding, category lookups, URL-deduplicated article inserts,
//! and bulk pruning. Operations are grouped per entity in the submodules;
//! every write commits atomically per logical operation.

mod articles;
mod categories;
mod schema;
mod sources;
mod types;

pub use schema::Database;
pub use types::{Article, Category, NewArticle, NewSource, Source, StoreError};
