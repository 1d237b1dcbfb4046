pub(crate) mod collection;
pub(crate) mod config;
pub(crate) mod review;
pub(crate) mod sync;

use std::io::{BufRead, Write};
use std::path::Path;

use plex_db_tools_api::PlexClient;
use plex_db_tools_db::Connection;
use plex_db_tools_lib::{Config, Decision};

use crate::CliError;

pub(crate) fn load_config(path: &Path) -> Result<Config, CliError> {
    Config::load(path).map_err(|e| CliError::config(format!("{} ({})", e, path.display())))
}

pub(crate) fn open_database(config: &Config) -> Result<Connection, CliError> {
    let path = &config.plex.database_path;
    log::debug!("Opening Plex database at {}", path.display());
    plex_db_tools_db::open_library_database(path).map_err(|e| {
        CliError::database(format!("Failed to open {}: {}", path.display(), e))
    })
}

pub(crate) fn plex_client(config: &Config) -> Result<PlexClient, CliError> {
    PlexClient::new(&config.plex.url, &config.plex.token, config.plex.verify_tls)
        .map_err(|e| CliError::client(format!("Failed to create Plex client: {}", e)))
}

/// Ask for a 0/1 decision, re-asking on anything else. End of input skips.
pub(crate) fn prompt_decision(
    question: &str,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<Decision, CliError> {
    loop {
        write!(output, "  {question} (0 = skip, 1 = yes): ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            log::warn!("No more input, skipping");
            return Ok(Decision::Skip);
        }
        match Decision::from_answer(&answer) {
            Some(decision) => return Ok(decision),
            None => writeln!(output, "  Please answer 0 or 1")?,
        }
    }
}

/// Render a Plex `added_at` value. Current servers store epoch seconds.
pub(crate) fn format_added_at(added_at: Option<&str>) -> String {
    match added_at {
        None => "unknown".to_string(),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// Keep the first and last two characters of a secret.
pub(crate) fn mask_value(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 6 {
        "****".to_string()
    } else {
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{head}****{tail}")
    }
}
