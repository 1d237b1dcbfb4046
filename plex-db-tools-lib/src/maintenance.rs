//! Unanalyzed-media and missing-poster maintenance runs.
//!
//! Each run lists the matching items and asks `decide` what to do with each
//! one. A failed server action is logged and the run moves on.

use plex_db_tools_api::MediaServer;
use plex_db_tools_db::{
    find_items_missing_posters, find_unanalyzed_items, Connection, MetadataItem, QueryError,
    UnanalyzedItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Act,
}

impl Decision {
    /// Parse an answer of `0` (skip) or `1` (act).
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim() {
            "0" => Some(Self::Skip),
            "1" => Some(Self::Act),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    pub found: usize,
    pub acted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Offer every unanalyzed item in `library` for analysis.
pub fn analyze_unanalyzed(
    conn: &Connection,
    server: &dyn MediaServer,
    library: &str,
    decide: &mut dyn FnMut(&UnanalyzedItem) -> Decision,
) -> Result<ActionSummary, QueryError> {
    let items = find_unanalyzed_items(conn, library)?;
    let mut summary = ActionSummary {
        found: items.len(),
        ..Default::default()
    };

    for item in &items {
        match decide(item) {
            Decision::Skip => summary.skipped += 1,
            Decision::Act => {
                log::info!("Analyzing {}", item.file);
                match server.analyze_item(item.metadata_item_id) {
                    Ok(()) => summary.acted += 1,
                    Err(e) => {
                        log::error!("Failed analyzing {}: {}", item.file, e);
                        summary.failed += 1;
                    }
                }
            }
        }
    }
    Ok(summary)
}

/// Offer every item without a real poster in `library` for a metadata refresh.
pub fn refresh_missing_posters(
    conn: &Connection,
    server: &dyn MediaServer,
    library: &str,
    decide: &mut dyn FnMut(&MetadataItem) -> Decision,
) -> Result<ActionSummary, QueryError> {
    let items = find_items_missing_posters(conn, library)?;
    let mut summary = ActionSummary {
        found: items.len(),
        ..Default::default()
    };

    for item in &items {
        match decide(item) {
            Decision::Skip => summary.skipped += 1,
            Decision::Act => {
                log::info!("Refreshing metadata for {}", item.display_name());
                match server.refresh_item(item.id) {
                    Ok(()) => summary.acted += 1,
                    Err(e) => {
                        log::error!("Failed refreshing {}: {}", item.display_name(), e);
                        summary.failed += 1;
                    }
                }
            }
        }
    }
    Ok(summary)
}
