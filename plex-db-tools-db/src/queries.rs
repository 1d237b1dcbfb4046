//! Read queries against the Plex library database.
//!
//! Provides library lookup, unanalyzed media, missing posters, and item
//! lookup by GUID or collection name.

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Library not found: '{0}'")]
    UnknownLibrary(String),
    #[error("Library '{name}' has an unsupported kind ({kind})")]
    UnsupportedLibraryKind { name: String, kind: LibraryKind },
}

const METADATA_ITEM_COLUMNS: &str = "md.id, md.library_section_id, ls.name, md.metadata_type,
                md.guid, md.title, md.year, md.user_thumb_url, md.added_at";

// ── Library Lookups ─────────────────────────────────────────────────────────

/// Find a library section by its exact name.
pub fn find_library(conn: &Connection, name: &str) -> Result<Option<LibrarySection>, QueryError> {
    let section = conn
        .query_row(
            "SELECT ls.id, ls.name, ls.section_type
             FROM library_sections ls
             WHERE ls.name = ?1
             LIMIT 1",
            params![name],
            |row| {
                Ok(LibrarySection {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    kind: LibraryKind::from_section_type(
                        row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
                    ),
                })
            },
        )
        .optional()?;

    match &section {
        Some(s) => log::debug!(
            "Found library with name: {:?} (ID: {} - Type: {})",
            name,
            s.id,
            s.kind.section_type()
        ),
        None => log::debug!("Failed to find library with name: {:?}", name),
    }
    Ok(section)
}

/// Find a library section by name, failing if it doesn't exist.
pub fn require_library(conn: &Connection, name: &str) -> Result<LibrarySection, QueryError> {
    find_library(conn, name)?.ok_or_else(|| QueryError::UnknownLibrary(name.to_string()))
}

// ── Maintenance Queries ─────────────────────────────────────────────────────

/// List media parts in a movie or show library that have no bitrate recorded,
/// oldest additions first.
pub fn find_unanalyzed_items(
    conn: &Connection,
    library_name: &str,
) -> Result<Vec<UnanalyzedItem>, QueryError> {
    log::debug!("Finding unanalyzed media items in library: {:?}", library_name);

    let library = require_library(conn, library_name)?;
    if library.kind.item_metadata_type().is_none() {
        return Err(QueryError::UnsupportedLibraryKind {
            name: library.name,
            kind: library.kind,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT md.id, mi.id, ls.name, md.title, md.year, mp.file, md.added_at
         FROM media_parts mp
         JOIN media_items mi ON mi.id = mp.media_item_id
         JOIN metadata_items md ON md.id = mi.metadata_item_id
         JOIN library_sections ls ON ls.id = md.library_section_id
         WHERE ls.name = ?1
           AND ls.section_type IN (1, 2)
           AND mi.bitrate IS NULL
         ORDER BY md.added_at ASC, mp.id ASC",
    )?;
    let rows = stmt.query_map(params![library_name], |row| {
        let file: Option<String> = row.get(5)?;
        let Some(file) = file.filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        Ok(Some(UnanalyzedItem {
            metadata_item_id: row.get(0)?,
            media_item_id: row.get(1)?,
            library_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            title: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            year: row.get(4)?,
            file,
            added_at: timestamp_column(row, 6),
        }))
    })?;

    let mut items = Vec::new();
    for row in rows {
        match row? {
            Some(item) => items.push(item),
            None => log::debug!("Skipping media part without a file path"),
        }
    }
    log::debug!("Found {} unanalyzed media items", items.len());
    Ok(items)
}

/// List top-level items whose poster is missing, oldest additions first.
///
/// Movies count as missing when the poster is empty or a `media://`
/// placeholder; shows only when the poster is empty.
pub fn find_items_missing_posters(
    conn: &Connection,
    library_name: &str,
) -> Result<Vec<MetadataItem>, QueryError> {
    log::debug!("Finding items with missing posters from library: {:?}", library_name);

    let library = require_library(conn, library_name)?;
    let poster_predicate = match library.kind {
        LibraryKind::Movie => "(md.user_thumb_url LIKE 'media://%' OR md.user_thumb_url = '')",
        LibraryKind::Show => "md.user_thumb_url = ''",
        LibraryKind::Other(_) => {
            return Err(QueryError::UnsupportedLibraryKind {
                name: library.name,
                kind: library.kind,
            });
        }
    };
    let metadata_type = library.kind.item_metadata_type().unwrap_or(METADATA_TYPE_MOVIE);

    let mut stmt = conn.prepare(&format!(
        "SELECT {METADATA_ITEM_COLUMNS}
         FROM metadata_items md
         JOIN library_sections ls ON ls.id = md.library_section_id
         WHERE ls.name = ?1
           AND md.metadata_type = ?2
           AND {poster_predicate}
         ORDER BY md.added_at ASC, md.id ASC"
    ))?;
    let rows = stmt.query_map(params![library_name, metadata_type], row_to_metadata_item)?;
    let items = rows.collect::<Result<Vec<_>, _>>()?;
    log::debug!("Found {} items with missing posters", items.len());
    Ok(items)
}

// ── Item Lookups ────────────────────────────────────────────────────────────

/// Find an item in a library by its agent GUID
/// (e.g. `com.plexapp.agents.imdb://tt0111161?lang=en`).
pub fn find_item_by_guid(
    conn: &Connection,
    library_name: &str,
    guid: &str,
) -> Result<Option<MetadataItem>, QueryError> {
    log::trace!("Looking up item with guid {:?} in library {:?}", guid, library_name);
    let item = conn
        .query_row(
            &format!(
                "SELECT {METADATA_ITEM_COLUMNS}
                 FROM metadata_items md
                 JOIN library_sections ls ON ls.id = md.library_section_id
                 WHERE ls.name = ?1 AND md.guid = ?2
                 LIMIT 1"
            ),
            params![library_name, guid],
            row_to_metadata_item,
        )
        .optional()?;
    Ok(item)
}

/// Find the collection row with the given title in a library.
pub fn find_collection_by_name(
    conn: &Connection,
    library_name: &str,
    collection_name: &str,
) -> Result<Option<MetadataItem>, QueryError> {
    log::trace!(
        "Looking up collection {:?} in library {:?}",
        collection_name,
        library_name
    );
    let item = conn
        .query_row(
            &format!(
                "SELECT {METADATA_ITEM_COLUMNS}
                 FROM metadata_items md
                 JOIN library_sections ls ON ls.id = md.library_section_id
                 WHERE ls.name = ?1 AND md.metadata_type = ?2 AND md.title = ?3
                 ORDER BY md.id DESC
                 LIMIT 1"
            ),
            params![library_name, METADATA_TYPE_COLLECTION, collection_name],
            row_to_metadata_item,
        )
        .optional()?;
    Ok(item)
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_metadata_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MetadataItem> {
    Ok(MetadataItem {
        id: row.get(0)?,
        library_section_id: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
        library_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        metadata_type: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        guid: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        title: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        year: row.get(6)?,
        user_thumb_url: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        added_at: timestamp_column(row, 8),
    })
}

/// Plex stores datetimes as epoch integers in current versions and as text in
/// older ones. Either way, render as text.
fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> Option<String> {
    match row.get_ref(idx).ok()? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(format!("{f}")),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}
