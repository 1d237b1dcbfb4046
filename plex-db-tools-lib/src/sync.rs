//! Bulk sync of every collection in the collections sheet.

use std::path::Path;

use chrono::Utc;
use plex_db_tools_catalog::{
    available_rows, resolve_sheet_row, CatalogError, CollectionSheet, MovieCatalog,
};
use thiserror::Error;

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::collection::{apply_collection, CollectionContext, CollectionOutcome, UpdateOptions};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(
        "No checkpoint recorded for library {library:?}. Run without --changed-only first"
    )]
    NoCheckpoint { library: String },

    #[error("Failed retrieving collections sheet: {0}")]
    Sheet(#[from] CatalogError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Only sync collections changed since their last successful sync.
    pub changed_only: bool,
    /// Treat collections with missing members as synced.
    pub ignore_missing_members: bool,
}

/// A collection that did not sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub collection: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows selected for this run.
    pub selected: usize,
    /// Rows left out because they have not changed.
    pub unchanged: usize,
    /// Collections stamped in the checkpoint.
    pub synced: Vec<String>,
    pub failed: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sync every eligible sheet row into the context's library, updating
/// `checkpoint` in memory.
pub fn sync_all(
    ctx: &CollectionContext<'_>,
    catalog: &dyn MovieCatalog,
    sheet: &dyn CollectionSheet,
    checkpoint: &mut Checkpoint,
    options: SyncOptions,
) -> Result<SyncReport, SyncError> {
    let library = ctx.library;
    if options.changed_only && !checkpoint.has_library(library) {
        return Err(SyncError::NoCheckpoint {
            library: library.to_string(),
        });
    }

    let rows = available_rows(sheet.rows()?);
    log::info!("Found {} collections in sheet", rows.len());

    let mut report = SyncReport::default();
    let rows: Vec<_> = if options.changed_only {
        let (changed, unchanged): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|row| checkpoint.is_stale(library, &row.key(), row.changed_at));
        report.unchanged = unchanged.len();
        changed
    } else {
        rows
    };
    report.selected = rows.len();

    if !options.changed_only {
        checkpoint.ensure_library(library);
    }

    let update = UpdateOptions {
        fail_on_missing: false,
    };
    for (index, row) in rows.iter().enumerate() {
        log::info!(
            "[{}/{}] Syncing collection {:?}",
            index + 1,
            report.selected,
            row.name
        );
        let collection = resolve_sheet_row(catalog, row);

        match apply_collection(ctx, &collection, update) {
            Ok(CollectionOutcome::Complete) => {
                checkpoint.stamp(library, &row.key(), Utc::now());
                report.synced.push(row.name.clone());
            }
            Ok(CollectionOutcome::MissingMembers(missing)) if options.ignore_missing_members => {
                log::info!(
                    "Ignoring {} missing members of {:?}",
                    missing.len(),
                    row.name
                );
                checkpoint.stamp(library, &row.key(), Utc::now());
                report.synced.push(row.name.clone());
            }
            Ok(CollectionOutcome::MissingMembers(missing)) => {
                report.failed.push(SyncFailure {
                    collection: row.name.clone(),
                    reason: format!("missing members: {}", missing.join(", ")),
                });
            }
            Err(e) => {
                log::error!("Failed syncing collection {:?}: {}", row.name, e);
                report.failed.push(SyncFailure {
                    collection: row.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Synced {} of {} collections ({} failed, {} unchanged)",
        report.synced.len(),
        report.selected,
        report.failed.len(),
        report.unchanged
    );
    Ok(report)
}

/// Load the checkpoint at `path`, run [`sync_all`], and save the checkpoint
/// once at the end. Nothing is written when the run cannot start.
pub fn sync_all_with_checkpoint(
    ctx: &CollectionContext<'_>,
    catalog: &dyn MovieCatalog,
    sheet: &dyn CollectionSheet,
    path: &Path,
    options: SyncOptions,
) -> Result<SyncReport, SyncError> {
    let mut checkpoint = Checkpoint::load(path)?;
    let report = sync_all(ctx, catalog, sheet, &mut checkpoint, options)?;
    checkpoint.save(path)?;
    Ok(report)
}
