//! Applying a collection descriptor to a Plex library.
//!
//! Members are matched to library items by agent GUID, tagged with the
//! collection name, and then the collection row itself gets its poster and
//! summary. Progress moves through
//! `start → members tagged → collection located → poster set → summary set`;
//! any failing step ends the update.

use std::thread;
use std::time::Duration;

use plex_db_tools_api::{ApiError, ItemTarget, MediaServer};
use plex_db_tools_catalog::{
    find_row, resolve_sheet_row, CatalogError, CollectionDescriptor, CollectionMember,
    CollectionSheet, MovieCatalog,
};
use plex_db_tools_db::{
    find_collection_by_name, find_item_by_guid, Connection, MetadataItem, QueryError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Could not find {member} in library {library:?}")]
    MemberMissing { member: String, library: String },

    #[error("Collection {collection:?} has no members that could be resolved")]
    NoMembers { collection: String },

    #[error("Library lookup failed: {0}")]
    Lookup(#[from] QueryError),

    #[error("Failed resolving collection: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed adding {item} to collection {collection:?}: {source}")]
    TagFailed {
        item: String,
        collection: String,
        source: ApiError,
    },

    #[error("Collection {collection:?} did not appear in library {library:?}")]
    CollectionNotFound { collection: String, library: String },

    #[error("Failed setting poster for collection {collection:?}: {source}")]
    PosterFailed { collection: String, source: ApiError },

    #[error("Failed setting summary for collection {collection:?}: {source}")]
    SummaryFailed { collection: String, source: ApiError },
}

/// Result of an update that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    Complete,
    /// Every step ran, but these members could not be resolved or were
    /// not in the library.
    MissingMembers(Vec<String>),
}

// ── Library Lookups ─────────────────────────────────────────────────────────

/// Item lookups the update needs from the library database.
pub trait LibraryLookup {
    fn item_by_guid(&self, library: &str, guid: &str) -> Result<Option<MetadataItem>, QueryError>;

    fn collection_by_name(
        &self,
        library: &str,
        name: &str,
    ) -> Result<Option<MetadataItem>, QueryError>;
}

impl LibraryLookup for Connection {
    fn item_by_guid(&self, library: &str, guid: &str) -> Result<Option<MetadataItem>, QueryError> {
        find_item_by_guid(self, library, guid)
    }

    fn collection_by_name(
        &self,
        library: &str,
        name: &str,
    ) -> Result<Option<MetadataItem>, QueryError> {
        find_collection_by_name(self, library, name)
    }
}

/// GUID under the IMDb agent, if the member has an IMDb id.
pub fn primary_guid(member: &CollectionMember) -> Option<String> {
    member
        .imdb_id
        .as_ref()
        .map(|id| format!("com.plexapp.agents.imdb://{id}?lang=en"))
}

/// GUID under the TMDB agent, if the member has a TMDB id.
pub fn fallback_guid(member: &CollectionMember) -> Option<String> {
    member
        .tmdb_id
        .map(|id| format!("com.plexapp.agents.themoviedb://{id}?lang=en"))
}

/// Find a member in the library, trying the IMDb GUID before the TMDB one.
pub fn find_member(
    lookup: &dyn LibraryLookup,
    library: &str,
    member: &CollectionMember,
) -> Result<Option<MetadataItem>, QueryError> {
    for guid in [primary_guid(member), fallback_guid(member)].into_iter().flatten() {
        if let Some(item) = lookup.item_by_guid(library, &guid)? {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

// ── Timing ──────────────────────────────────────────────────────────────────

/// Pauses between server-visible changes. Plex applies edits asynchronously,
/// so the collection row only shows up in the database some time after its
/// first member is tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTiming {
    pub after_tag: Duration,
    pub settle: Duration,
    pub locate_attempts: u32,
    pub locate_interval: Duration,
    pub before_summary: Duration,
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            after_tag: Duration::from_secs(2),
            settle: Duration::from_secs(10),
            locate_attempts: 6,
            locate_interval: Duration::from_secs(5),
            before_summary: Duration::from_secs(5),
        }
    }
}

impl SyncTiming {
    /// No pauses and a single locate attempt.
    pub fn immediate() -> Self {
        Self {
            after_tag: Duration::ZERO,
            settle: Duration::ZERO,
            locate_attempts: 1,
            locate_interval: Duration::ZERO,
            before_summary: Duration::ZERO,
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

// ── Update ──────────────────────────────────────────────────────────────────

/// Everything an update talks to.
pub struct CollectionContext<'a> {
    pub lookup: &'a dyn LibraryLookup,
    pub server: &'a dyn MediaServer,
    pub library: &'a str,
    pub timing: SyncTiming,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Fail as soon as a member is not found in the library.
    pub fail_on_missing: bool,
}

/// Where a single collection comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    Tmdb(u64),
    Sheets(u32),
}

/// Resolve a collection descriptor from its source.
pub fn resolve_collection(
    source: &CollectionSource,
    catalog: &dyn MovieCatalog,
    sheet: &dyn CollectionSheet,
) -> Result<CollectionDescriptor, CollectionError> {
    match source {
        CollectionSource::Tmdb(id) => Ok(catalog.collection(&id.to_string())?),
        CollectionSource::Sheets(id) => {
            let rows = sheet.rows()?;
            let row = find_row(&rows, *id)?;
            Ok(resolve_sheet_row(catalog, row))
        }
    }
}

/// Create or update `collection` in the context's library.
pub fn apply_collection(
    ctx: &CollectionContext<'_>,
    collection: &CollectionDescriptor,
    options: UpdateOptions,
) -> Result<CollectionOutcome, CollectionError> {
    log::info!(
        "Updating collection {:?} in library {:?} ({} members)",
        collection.name,
        ctx.library,
        collection.members.len()
    );

    if collection.members.is_empty() {
        return Err(CollectionError::NoMembers {
            collection: collection.name.clone(),
        });
    }

    let mut missing = Vec::new();
    for id in &collection.unresolved {
        if options.fail_on_missing {
            return Err(CollectionError::MemberMissing {
                member: id.clone(),
                library: ctx.library.to_string(),
            });
        }
        log::warn!("Could not resolve {} for collection {:?}", id, collection.name);
        missing.push(id.clone());
    }

    for member in &collection.members {
        let Some(item) = find_member(ctx.lookup, ctx.library, member)? else {
            if options.fail_on_missing {
                return Err(CollectionError::MemberMissing {
                    member: member.describe(),
                    library: ctx.library.to_string(),
                });
            }
            log::warn!("Could not find {} in library {:?}", member.describe(), ctx.library);
            missing.push(member.title.clone());
            continue;
        };

        log::debug!("Adding {} to collection {:?}", item.display_name(), collection.name);
        ctx.server
            .set_collection(target(&item), &collection.name)
            .map_err(|source| CollectionError::TagFailed {
                item: item.display_name(),
                collection: collection.name.clone(),
                source,
            })?;
        pause(ctx.timing.after_tag);
    }

    let row = locate_collection(ctx, &collection.name)?;
    log::debug!("Found collection {:?} with id {}", row.title, row.id);

    if let Some(url) = &collection.poster_url {
        log::debug!("Setting poster for collection {:?}", collection.name);
        ctx.server
            .set_poster(row.id, url)
            .map_err(|source| CollectionError::PosterFailed {
                collection: collection.name.clone(),
                source,
            })?;
    }

    if let Some(overview) = &collection.overview {
        pause(ctx.timing.before_summary);
        log::debug!("Setting summary for collection {:?}", collection.name);
        ctx.server
            .set_summary(target(&row), overview)
            .map_err(|source| CollectionError::SummaryFailed {
                collection: collection.name.clone(),
                source,
            })?;
    }

    if missing.is_empty() {
        log::info!("Collection {:?} is up to date", collection.name);
        Ok(CollectionOutcome::Complete)
    } else {
        log::warn!(
            "Collection {:?} updated with {} missing members",
            collection.name,
            missing.len()
        );
        Ok(CollectionOutcome::MissingMembers(missing))
    }
}

/// Wait for the collection row to appear, polling a bounded number of times.
fn locate_collection(
    ctx: &CollectionContext<'_>,
    name: &str,
) -> Result<MetadataItem, CollectionError> {
    pause(ctx.timing.settle);
    let attempts = ctx.timing.locate_attempts.max(1);
    for attempt in 1..=attempts {
        if let Some(row) = ctx.lookup.collection_by_name(ctx.library, name)? {
            return Ok(row);
        }
        log::debug!("Collection {name:?} not found yet (attempt {attempt}/{attempts})");
        if attempt < attempts {
            pause(ctx.timing.locate_interval);
        }
    }
    Err(CollectionError::CollectionNotFound {
        collection: name.to_string(),
        library: ctx.library.to_string(),
    })
}

fn target(item: &MetadataItem) -> ItemTarget {
    ItemTarget {
        section_id: item.library_section_id,
        item_id: item.id,
        metadata_type: item.metadata_type,
    }
}
