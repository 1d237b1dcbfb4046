//! Data model for collections resolved from TMDB or the collections sheet.
//!
//! These are built fresh for every run and never persisted.

use chrono::{DateTime, Utc};

// ── Collections ─────────────────────────────────────────────────────────────

/// A normalized collection ready to be applied to a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: String,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    /// Members in catalog order.
    pub members: Vec<CollectionMember>,
    /// Source ids that could not be resolved to a member.
    pub unresolved: Vec<String>,
}

/// A movie belonging to a collection, identified by its external ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMember {
    pub title: String,
    pub tmdb_id: Option<u64>,
    pub imdb_id: Option<String>,
}

impl CollectionMember {
    /// Human-readable identity for log lines: `Title (imdb tt…, tmdb …)`.
    pub fn describe(&self) -> String {
        let mut ids = Vec::new();
        if let Some(imdb) = &self.imdb_id {
            ids.push(format!("imdb {imdb}"));
        }
        if let Some(tmdb) = self.tmdb_id {
            ids.push(format!("tmdb {tmdb}"));
        }
        if ids.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, ids.join(", "))
        }
    }
}

// ── Sheet Rows ──────────────────────────────────────────────────────────────

/// One collection row from the published collections sheet.
///
/// Member ids are TMDB movie ids; they still need resolving through
/// [`crate::MovieCatalog`] before they can be matched to library items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub id: u32,
    pub name: String,
    pub poster_url: Option<String>,
    pub summary: Option<String>,
    pub member_ids: Vec<String>,
    pub changed_at: Option<DateTime<Utc>>,
}

impl SheetRow {
    /// The checkpoint key for this row's collection.
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    /// Rows need a name and at least one member to be applied.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.member_ids.is_empty()
    }
}
