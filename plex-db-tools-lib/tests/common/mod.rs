//! In-memory stand-ins for the library database, Plex server and
//! collection sources.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use plex_db_tools_lib::api::{ApiError, ItemTarget, MediaServer};
use plex_db_tools_lib::catalog::{
    CatalogError, CollectionDescriptor, CollectionMember, CollectionSheet, MovieCatalog, SheetRow,
};
use plex_db_tools_lib::db::{MetadataItem, QueryError, METADATA_TYPE_COLLECTION, METADATA_TYPE_MOVIE};
use plex_db_tools_lib::LibraryLookup;

pub const LIBRARY: &str = "Movies";
pub const SECTION_ID: i64 = 1;

pub fn movie(id: i64, guid: &str, title: &str) -> MetadataItem {
    MetadataItem {
        id,
        library_section_id: SECTION_ID,
        library_name: LIBRARY.to_string(),
        metadata_type: METADATA_TYPE_MOVIE,
        guid: guid.to_string(),
        title: title.to_string(),
        year: Some(1990),
        user_thumb_url: String::new(),
        added_at: None,
    }
}

pub fn collection_row(id: i64, title: &str) -> MetadataItem {
    MetadataItem {
        metadata_type: METADATA_TYPE_COLLECTION,
        guid: format!("collection://{id}"),
        year: None,
        ..movie(id, "", title)
    }
}

pub fn imdb_guid(imdb: &str) -> String {
    format!("com.plexapp.agents.imdb://{imdb}?lang=en")
}

pub fn tmdb_guid(tmdb: u64) -> String {
    format!("com.plexapp.agents.themoviedb://{tmdb}?lang=en")
}

// ── Library ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeLibrary {
    pub items: HashMap<String, MetadataItem>,
    pub collections: Vec<MetadataItem>,
    pub guid_queries: RefCell<Vec<String>>,
    pub collection_queries: Cell<usize>,
}

impl FakeLibrary {
    pub fn with_item(mut self, item: MetadataItem) -> Self {
        self.items.insert(item.guid.clone(), item);
        self
    }

    pub fn with_collection(mut self, row: MetadataItem) -> Self {
        self.collections.push(row);
        self
    }
}

impl LibraryLookup for FakeLibrary {
    fn item_by_guid(&self, library: &str, guid: &str) -> Result<Option<MetadataItem>, QueryError> {
        assert_eq!(library, LIBRARY);
        self.guid_queries.borrow_mut().push(guid.to_string());
        Ok(self.items.get(guid).cloned())
    }

    fn collection_by_name(
        &self,
        library: &str,
        name: &str,
    ) -> Result<Option<MetadataItem>, QueryError> {
        assert_eq!(library, LIBRARY);
        self.collection_queries.set(self.collection_queries.get() + 1);
        Ok(self.collections.iter().find(|c| c.title == name).cloned())
    }
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Refresh(i64),
    Analyze(i64),
    Collection { item_id: i64, name: String },
    Summary { item_id: i64, summary: String },
    Poster { item_id: i64, url: String },
}

/// Records every call; operations named in `failing` answer HTTP 500.
#[derive(Default)]
pub struct FakeServer {
    pub calls: RefCell<Vec<Call>>,
    pub failing: Vec<&'static str>,
}

impl FakeServer {
    pub fn failing(operations: &[&'static str]) -> Self {
        Self {
            failing: operations.to_vec(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, operation: &str, call: Call) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        if self.failing.contains(&operation) {
            return Err(ApiError::Status {
                endpoint: operation.to_string(),
                status: 500,
                reason: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

impl MediaServer for FakeServer {
    fn refresh_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.record("refresh", Call::Refresh(item_id))
    }

    fn analyze_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.record("analyze", Call::Analyze(item_id))
    }

    fn set_collection(&self, target: ItemTarget, collection: &str) -> Result<(), ApiError> {
        self.record(
            "collection",
            Call::Collection {
                item_id: target.item_id,
                name: collection.to_string(),
            },
        )
    }

    fn set_summary(&self, target: ItemTarget, summary: &str) -> Result<(), ApiError> {
        self.record(
            "summary",
            Call::Summary {
                item_id: target.item_id,
                summary: summary.to_string(),
            },
        )
    }

    fn set_poster(&self, item_id: i64, url: &str) -> Result<(), ApiError> {
        self.record(
            "poster",
            Call::Poster {
                item_id,
                url: url.to_string(),
            },
        )
    }
}

// ── Collection Sources ──────────────────────────────────────────────────────

/// Movie ids resolve to `tt{id}` / `{id}` unless listed in `unknown`.
#[derive(Default)]
pub struct FakeCatalog {
    pub collections: HashMap<String, CollectionDescriptor>,
    pub unknown: Vec<String>,
}

impl MovieCatalog for FakeCatalog {
    fn collection(&self, collection_id: &str) -> Result<CollectionDescriptor, CatalogError> {
        self.collections
            .get(collection_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(format!("TMDB collection {collection_id}")))
    }

    fn movie(&self, movie_id: &str) -> Result<CollectionMember, CatalogError> {
        if self.unknown.iter().any(|id| id == movie_id) {
            return Err(CatalogError::not_found(format!("TMDB movie {movie_id}")));
        }
        Ok(CollectionMember {
            title: format!("Movie {movie_id}"),
            tmdb_id: movie_id.parse().ok(),
            imdb_id: Some(format!("tt{movie_id}")),
        })
    }
}

/// Serves fixed rows and counts how often it was fetched.
pub struct FakeSheet {
    pub rows: Vec<SheetRow>,
    pub fetches: Cell<usize>,
}

impl FakeSheet {
    pub fn new(rows: Vec<SheetRow>) -> Self {
        Self {
            rows,
            fetches: Cell::new(0),
        }
    }
}

impl CollectionSheet for FakeSheet {
    fn rows(&self) -> Result<Vec<SheetRow>, CatalogError> {
        self.fetches.set(self.fetches.get() + 1);
        Ok(self.rows.clone())
    }
}

pub fn sheet_row(
    id: u32,
    name: &str,
    member_ids: &[&str],
    changed_at: Option<DateTime<Utc>>,
) -> SheetRow {
    SheetRow {
        id,
        name: name.to_string(),
        poster_url: Some(format!("https://example.com/{id}.jpg")),
        summary: Some(format!("Summary of {name}")),
        member_ids: member_ids.iter().map(|s| s.to_string()).collect(),
        changed_at,
    }
}
