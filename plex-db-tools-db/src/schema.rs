//! Opening the Plex library database.
//!
//! The database belongs to the media server, so it is only ever opened
//! read-only. [`open_memory`] builds the subset of the Plex schema that the
//! queries touch, for tests and fixtures.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Library database not found at {0}")]
    NotFound(String),
    #[error("Not a Plex library database: missing table '{0}'")]
    MissingTable(String),
}

/// Tables the queries in this crate read from.
pub const REQUIRED_TABLES: [&str; 4] = [
    "library_sections",
    "metadata_items",
    "media_items",
    "media_parts",
];

/// Open the Plex library database at `path` in read-only mode.
///
/// Fails if the file does not exist (SQLite would otherwise create it) or
/// if any of [`REQUIRED_TABLES`] is missing.
pub fn open_library_database(path: &Path) -> Result<Connection, SchemaError> {
    if !path.exists() {
        return Err(SchemaError::NotFound(path.display().to_string()));
    }

    log::trace!("Opening library database {} (read-only)", path.display());
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    verify_tables(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the Plex schema subset. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Create the Plex schema subset if it doesn't exist.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

fn verify_tables(conn: &Connection) -> Result<(), SchemaError> {
    for table in REQUIRED_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(SchemaError::MissingTable(table.to_string()));
        }
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS library_sections (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255),
    section_type INTEGER
);

CREATE TABLE IF NOT EXISTS metadata_items (
    id INTEGER PRIMARY KEY,
    library_section_id INTEGER,
    metadata_type INTEGER,
    guid VARCHAR(255),
    title VARCHAR(255),
    year INTEGER,
    user_thumb_url VARCHAR(255) DEFAULT '',
    added_at INTEGER
);

CREATE TABLE IF NOT EXISTS media_items (
    id INTEGER PRIMARY KEY,
    library_section_id INTEGER,
    metadata_item_id INTEGER,
    bitrate INTEGER,
    created_at INTEGER
);

CREATE TABLE IF NOT EXISTS media_parts (
    id INTEGER PRIMARY KEY,
    media_item_id INTEGER,
    file VARCHAR(255)
);

CREATE INDEX IF NOT EXISTS index_metadata_items_on_guid ON metadata_items (guid);
CREATE INDEX IF NOT EXISTS index_media_items_on_metadata_item_id ON media_items (metadata_item_id);
CREATE INDEX IF NOT EXISTS index_media_parts_on_media_item_id ON media_parts (media_item_id);
"#;
