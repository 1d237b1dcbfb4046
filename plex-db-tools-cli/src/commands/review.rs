//! Item-by-item review commands: unanalyzed media and missing posters.

use std::io::{BufRead, Write};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use plex_db_tools_db::{MetadataItem, UnanalyzedItem};
use plex_db_tools_lib::{analyze_unanalyzed, refresh_missing_posters, ActionSummary, Config, Decision};

use super::{format_added_at, open_database, plex_client, prompt_decision};
use crate::CliError;

fn auto_decision(auto_mode: Option<u8>) -> Option<Decision> {
    auto_mode.map(|v| if v == 1 { Decision::Act } else { Decision::Skip })
}

pub(crate) fn run_unanalyzed_media(
    config: &Config,
    library: &str,
    auto_mode: Option<u8>,
) -> Result<(), CliError> {
    let conn = open_database(config)?;
    let client = plex_client(config)?;
    let auto = auto_decision(auto_mode);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    let mut prompt_error = None;

    let mut decide = |item: &UnanalyzedItem| {
        log::info!(
            "{} {}",
            "Unanalyzed:".if_supports_color(Stdout, |t| t.bold()),
            item.file
        );
        log::debug!(
            "  item {} / media {} added {}",
            item.metadata_item_id,
            item.media_item_id,
            format_added_at(item.added_at.as_deref())
        );
        decide_or_prompt(auto, "Analyze this item?", &mut input, &mut stdout, &mut prompt_error)
    };

    let summary = analyze_unanalyzed(&conn, &client, library, &mut decide)
        .map_err(|e| CliError::database(e.to_string()))?;
    if let Some(e) = prompt_error {
        return Err(e);
    }
    finish(summary, library, "unanalyzed media", "analyzed")
}

pub(crate) fn run_missing_posters(
    config: &Config,
    library: &str,
    auto_mode: Option<u8>,
) -> Result<(), CliError> {
    let conn = open_database(config)?;
    let client = plex_client(config)?;
    let auto = auto_decision(auto_mode);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    let mut prompt_error = None;

    let mut decide = |item: &MetadataItem| {
        print_poster_table(item);
        decide_or_prompt(
            auto,
            "Refresh metadata for this item?",
            &mut input,
            &mut stdout,
            &mut prompt_error,
        )
    };

    let summary = refresh_missing_posters(&conn, &client, library, &mut decide)
        .map_err(|e| CliError::database(e.to_string()))?;
    if let Some(e) = prompt_error {
        return Err(e);
    }
    finish(summary, library, "items with missing posters", "refreshed")
}

/// Use the automatic answer when given, otherwise ask. A prompt I/O error
/// is kept for the caller and skips the remaining items.
fn decide_or_prompt(
    auto: Option<Decision>,
    question: &str,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    error: &mut Option<CliError>,
) -> Decision {
    if let Some(decision) = auto {
        return decision;
    }
    if error.is_some() {
        return Decision::Skip;
    }
    match prompt_decision(question, input, output) {
        Ok(decision) => decision,
        Err(e) => {
            *error = Some(e);
            Decision::Skip
        }
    }
}

fn print_poster_table(item: &MetadataItem) {
    log::info!("{}", item.display_name().if_supports_color(Stdout, |t| t.bold()));
    let poster = if item.user_thumb_url.is_empty() {
        "(none)"
    } else {
        item.user_thumb_url.as_str()
    };
    let rows = [
        ("Library", item.library_name.clone()),
        ("Id", item.id.to_string()),
        ("GUID", item.guid.clone()),
        ("Poster", poster.to_string()),
        ("Added", format_added_at(item.added_at.as_deref())),
    ];
    for (label, value) in rows {
        log::info!(
            "  {:<8} {}",
            label.if_supports_color(Stdout, |t| t.cyan()),
            value
        );
    }
}

fn finish(
    summary: ActionSummary,
    library: &str,
    what: &str,
    verb: &str,
) -> Result<(), CliError> {
    if summary.found == 0 {
        log::info!("No {} found in library {:?}", what, library);
        return Ok(());
    }
    log::info!(
        "{} {} of {} {} ({} skipped)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.acted,
        summary.found,
        verb,
        summary.skipped
    );
    if summary.failed > 0 {
        return Err(CliError::action(format!(
            "{} of {} requests failed",
            summary.failed,
            summary.acted + summary.failed
        )));
    }
    Ok(())
}
