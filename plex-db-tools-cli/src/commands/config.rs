use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{load_config, mask_value};
use crate::CliError;

/// Show the effective configuration with secrets masked.
pub(crate) fn run_config_show(path: &Path) -> Result<(), CliError> {
    log::info!(
        "{}",
        "plex-db-tools Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    let status = if path.exists() { "(exists)" } else { "(not found, using environment)" };
    log::info!(
        "  Config file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        status.if_supports_color(Stdout, |t| t.dimmed()),
    );
    crate::log_blank();

    let config = load_config(path)?;
    let api_key = match &config.tmdb.api_key {
        Some(key) => mask_value(key),
        None => "not set".to_string(),
    };
    let fields = [
        ("plex.url", config.plex.url.clone()),
        ("plex.token", mask_value(&config.plex.token)),
        ("plex.database_path", config.plex.database_path.display().to_string()),
        ("plex.verify_tls", config.plex.verify_tls.to_string()),
        ("tmdb.api_key", api_key),
        ("sheets.url", config.sheets.url.clone()),
    ];
    for (name, value) in fields {
        log::info!(
            "  {} {}",
            format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
            value
        );
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path(path: &Path) {
    println!("{}", path.display());
}
