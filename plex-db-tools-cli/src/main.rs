//! plex-db-tools CLI
//!
//! Command-line interface for maintaining a Plex Media Server library:
//! unanalyzed media, missing posters and curated collections.

mod cli_types;
mod commands;
mod error;
mod logger;

use clap::Parser;

use plex_db_tools_lib::config::{default_checkpoint_path, default_config_path, default_log_path};
use plex_db_tools_lib::{CollectionSource, SyncOptions};

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;
use logger::{level_from_flags, CliLogger};

/// Emit an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1 like every other failure; --help and --version exit 0
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let level = level_from_flags(
        cli.verbose,
        cli.quiet,
        std::env::var("LOG_LEVEL").ok().as_deref(),
    );
    let log_path = cli.log_path.clone().unwrap_or_else(default_log_path);
    if let Err(e) = CliLogger::new(level, Some(log_path.as_path())).init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config_path.unwrap_or_else(default_config_path);
    let checkpoint_path = cli.checkpoint_path.unwrap_or_else(default_checkpoint_path);

    match cli.command {
        Commands::UnanalyzedMedia { review } => {
            let config = commands::load_config(&config_path)?;
            commands::review::run_unanalyzed_media(&config, &review.library, review.auto_mode)
        }
        Commands::MissingPosters { review } => {
            let config = commands::load_config(&config_path)?;
            commands::review::run_missing_posters(&config, &review.library, review.auto_mode)
        }
        Commands::CreateUpdateCollection {
            library,
            tmdb_id,
            sheets_id,
            fail_on_missing,
        } => {
            let source = match (tmdb_id, sheets_id) {
                (Some(id), None) => CollectionSource::Tmdb(id),
                (None, Some(id)) => CollectionSource::Sheets(id),
                _ => {
                    return Err(CliError::usage(
                        "specify exactly one of --tmdb-id or --sheets-id",
                    ));
                }
            };
            let config = commands::load_config(&config_path)?;
            commands::collection::run_create_update_collection(
                &config,
                &library,
                source,
                fail_on_missing,
            )
        }
        Commands::CreateUpdateAll {
            library,
            changed_only,
            ignore_missing_members,
        } => {
            let config = commands::load_config(&config_path)?;
            commands::sync::run_create_update_all(
                &config,
                &checkpoint_path,
                &library,
                SyncOptions {
                    changed_only,
                    ignore_missing_members,
                },
            )
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&config_path),
            ConfigAction::Path => {
                commands::config::run_config_path(&config_path);
                Ok(())
            }
        },
    }
}
