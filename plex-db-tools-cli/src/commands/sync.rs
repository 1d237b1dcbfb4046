use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use plex_db_tools_lib::{
    sync_all_with_checkpoint, CollectionContext, Config, SyncOptions, SyncTiming,
};

use super::collection::catalog_clients;
use super::{open_database, plex_client};
use crate::CliError;

pub(crate) fn run_create_update_all(
    config: &Config,
    checkpoint_path: &Path,
    library: &str,
    options: SyncOptions,
) -> Result<(), CliError> {
    let (tmdb, sheets) = catalog_clients(config)?;
    let conn = open_database(config)?;
    plex_db_tools_db::require_library(&conn, library)
        .map_err(|e| CliError::database(e.to_string()))?;
    let client = plex_client(config)?;

    log::debug!("Using checkpoint {}", checkpoint_path.display());
    let ctx = CollectionContext {
        lookup: &conn,
        server: &client,
        library,
        timing: SyncTiming::default(),
    };
    let report = sync_all_with_checkpoint(&ctx, &tmdb, &sheets, checkpoint_path, options)
        .map_err(|e| CliError::sync(e.to_string()))?;

    if report.selected == 0 {
        log::info!("No collections to sync in library {:?}", library);
        return Ok(());
    }

    log::info!(
        "{} {} of {} collections synced",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.synced.len(),
        report.selected
    );
    if report.is_success() {
        return Ok(());
    }

    log::warn!("{} collections failed:", report.failed.len());
    for failure in &report.failed {
        log::warn!("  - {}: {}", failure.collection, failure.reason);
    }
    Err(CliError::sync(format!(
        "{} of {} collections failed",
        report.failed.len(),
        report.selected
    )))
}
