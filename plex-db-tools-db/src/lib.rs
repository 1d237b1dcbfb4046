//! Read-only access to the Plex Media Server library database.
//!
//! Provides library lookup and the maintenance queries (unanalyzed media,
//! missing posters, item and collection lookups) backed by SQLite via
//! rusqlite with the bundled feature.

pub mod queries;
pub mod schema;
pub mod types;

pub use queries::{
    find_collection_by_name, find_item_by_guid, find_items_missing_posters, find_library,
    find_unanalyzed_items, require_library, QueryError,
};
pub use rusqlite::Connection;
pub use schema::{open_library_database, open_memory, SchemaError};
pub use types::*;
