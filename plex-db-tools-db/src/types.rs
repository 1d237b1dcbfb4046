//! Typed rows read from the Plex library database.
//!
//! Each struct maps one query shape. Rows are validated once when they are
//! read, so callers never have to check whether a column was present.

use std::fmt;

// ── Metadata Types ──────────────────────────────────────────────────────────

/// `metadata_items.metadata_type` for a movie.
pub const METADATA_TYPE_MOVIE: i64 = 1;
/// `metadata_items.metadata_type` for a TV show.
pub const METADATA_TYPE_SHOW: i64 = 2;
/// `metadata_items.metadata_type` for a collection.
pub const METADATA_TYPE_COLLECTION: i64 = 18;

/// Prefix Plex uses for posters it generated itself from the media file.
pub const PLACEHOLDER_POSTER_PREFIX: &str = "media://";

// ── Library Sections ────────────────────────────────────────────────────────

/// The kind of media a library section holds (`library_sections.section_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Movie,
    Show,
    Other(i64),
}

impl LibraryKind {
    pub fn from_section_type(value: i64) -> Self {
        match value {
            1 => Self::Movie,
            2 => Self::Show,
            other => Self::Other(other),
        }
    }

    pub fn section_type(&self) -> i64 {
        match self {
            Self::Movie => 1,
            Self::Show => 2,
            Self::Other(v) => *v,
        }
    }

    /// The `metadata_type` of the top-level items in a library of this kind.
    pub fn item_metadata_type(&self) -> Option<i64> {
        match self {
            Self::Movie => Some(METADATA_TYPE_MOVIE),
            Self::Show => Some(METADATA_TYPE_SHOW),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Show => write!(f, "show"),
            Self::Other(v) => write!(f, "type {v}"),
        }
    }
}

/// A row from `library_sections`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySection {
    pub id: i64,
    pub name: String,
    pub kind: LibraryKind,
}

// ── Items ───────────────────────────────────────────────────────────────────

/// A media part that has never been analyzed (no bitrate recorded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnanalyzedItem {
    pub metadata_item_id: i64,
    pub media_item_id: i64,
    pub library_name: String,
    pub title: String,
    pub year: Option<i64>,
    /// Path of the media file on the server.
    pub file: String,
    pub added_at: Option<String>,
}

/// A row from `metadata_items`, joined with its library name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    pub id: i64,
    pub library_section_id: i64,
    pub library_name: String,
    pub metadata_type: i64,
    pub guid: String,
    pub title: String,
    pub year: Option<i64>,
    pub user_thumb_url: String,
    pub added_at: Option<String>,
}

impl MetadataItem {
    /// `"Title (Year)"`, with `????` standing in for an unknown year.
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => format!("{} (????)", self.title),
        }
    }

    /// True when the poster is unset or a Plex-generated placeholder.
    pub fn poster_is_placeholder(&self) -> bool {
        self.user_thumb_url.is_empty() || self.user_thumb_url.starts_with(PLACEHOLDER_POSTER_PREFIX)
    }
}
