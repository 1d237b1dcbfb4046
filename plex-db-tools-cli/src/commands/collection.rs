use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use plex_db_tools_catalog::{SheetsClient, TmdbClient};
use plex_db_tools_lib::{
    apply_collection, resolve_collection, CollectionContext, CollectionOutcome, CollectionSource,
    Config, SyncTiming, UpdateOptions,
};

use super::{open_database, plex_client};
use crate::CliError;

/// Collection sources shared by the single and bulk commands.
pub(crate) fn catalog_clients(config: &Config) -> Result<(TmdbClient, SheetsClient), CliError> {
    let api_key = config
        .tmdb
        .require_api_key()
        .map_err(|e| CliError::config(e.to_string()))?;
    let tmdb = TmdbClient::new(api_key)
        .map_err(|e| CliError::client(format!("Failed to create TMDB client: {}", e)))?;
    let sheets = SheetsClient::new(&config.sheets.url)
        .map_err(|e| CliError::client(format!("Failed to create sheets client: {}", e)))?;
    Ok((tmdb, sheets))
}

pub(crate) fn run_create_update_collection(
    config: &Config,
    library: &str,
    source: CollectionSource,
    fail_on_missing: bool,
) -> Result<(), CliError> {
    let (tmdb, sheets) = catalog_clients(config)?;
    let conn = open_database(config)?;
    plex_db_tools_db::require_library(&conn, library)
        .map_err(|e| CliError::database(e.to_string()))?;
    let client = plex_client(config)?;

    let collection = resolve_collection(&source, &tmdb, &sheets)
        .map_err(|e| CliError::collection(e.to_string()))?;

    let ctx = CollectionContext {
        lookup: &conn,
        server: &client,
        library,
        timing: SyncTiming::default(),
    };
    let outcome = apply_collection(&ctx, &collection, UpdateOptions { fail_on_missing })
        .map_err(|e| CliError::collection(e.to_string()))?;

    match outcome {
        CollectionOutcome::Complete => log::info!(
            "{} Collection {} updated",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            collection.name.if_supports_color(Stdout, |t| t.bold())
        ),
        CollectionOutcome::MissingMembers(missing) => {
            log::warn!(
                "Collection {:?} updated without {} members not in library {:?}:",
                collection.name,
                missing.len(),
                library
            );
            for title in missing {
                log::warn!("  - {}", title);
            }
        }
    }
    Ok(())
}
