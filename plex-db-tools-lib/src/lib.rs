//! Plex maintenance operations shared by the command-line front end.
//!
//! Ties the library database, the Plex API client and the collection sources
//! together: maintenance runs, collection updates, bulk sync with its
//! checkpoint, and configuration.

pub mod checkpoint;
pub mod collection;
pub mod config;
pub mod maintenance;
pub mod sync;

pub use checkpoint::{Checkpoint, CheckpointError};
pub use collection::{
    apply_collection, fallback_guid, find_member, primary_guid, resolve_collection,
    CollectionContext, CollectionError, CollectionOutcome, CollectionSource, LibraryLookup,
    SyncTiming, UpdateOptions,
};
pub use config::{Config, ConfigError, ConfigFile};
pub use maintenance::{analyze_unanalyzed, refresh_missing_posters, ActionSummary, Decision};
pub use sync::{sync_all, sync_all_with_checkpoint, SyncError, SyncFailure, SyncOptions, SyncReport};

pub use plex_db_tools_api as api;
pub use plex_db_tools_catalog as catalog;
pub use plex_db_tools_db as db;
