//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plex-db-tools")]
#[command(about = "Maintenance tools for a Plex Media Server library", long_about = None)]
pub(crate) struct Cli {
    /// Path to the config file (default: ~/.config/plex-db-tools/config.toml)
    #[arg(long, global = true, env = "CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Write log output to this file (ANSI codes stripped)
    #[arg(long, global = true, env = "LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Path to the bulk-sync checkpoint file
    #[arg(long, global = true, env = "CHECKPOINT_PATH")]
    pub checkpoint_path: Option<PathBuf>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Library selection and automatic answer for the item-by-item commands.
#[derive(Args, Clone)]
pub(crate) struct ReviewArgs {
    /// Name of the Plex library
    #[arg(short, long)]
    pub library: String,

    /// Answer every prompt with this value (0 = skip, 1 = act)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub auto_mode: Option<u8>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Find media that Plex has not analyzed and optionally analyze it
    UnanalyzedMedia {
        #[command(flatten)]
        review: ReviewArgs,
    },

    /// Find items without a real poster and optionally refresh their metadata
    MissingPosters {
        #[command(flatten)]
        review: ReviewArgs,
    },

    /// Create or update a collection from TMDB or the collections sheet
    #[command(group(ArgGroup::new("source").required(true).args(["tmdb_id", "sheets_id"])))]
    CreateUpdateCollection {
        /// Name of the Plex library
        #[arg(short, long)]
        library: String,

        /// TMDB collection id
        #[arg(short = 'i', long)]
        tmdb_id: Option<u64>,

        /// Row id in the collections sheet
        #[arg(short, long)]
        sheets_id: Option<u32>,

        /// Fail as soon as a member is not in the library
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Create or update every collection in the collections sheet
    CreateUpdateAll {
        /// Name of the Plex library
        #[arg(short, long)]
        library: String,

        /// Only sync collections changed since the last run
        #[arg(long)]
        changed_only: bool,

        /// Record collections with missing members as synced
        #[arg(long)]
        ignore_missing_members: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_collection_requires_exactly_one_source() {
        let neither = Cli::try_parse_from(["plex-db-tools", "create-update-collection", "-l", "Movies"]);
        assert!(neither.is_err());

        let both = Cli::try_parse_from([
            "plex-db-tools",
            "create-update-collection",
            "-l",
            "Movies",
            "-i",
            "10",
            "-s",
            "3",
        ]);
        assert!(both.is_err());

        let tmdb = Cli::try_parse_from([
            "plex-db-tools",
            "create-update-collection",
            "-l",
            "Movies",
            "-i",
            "10",
        ]);
        assert!(tmdb.is_ok());
    }

    #[test]
    fn test_tmdb_id_must_be_numeric() {
        let path = Cli::try_parse_from([
            "plex-db-tools",
            "create-update-collection",
            "-l",
            "Movies",
            "-i",
            "10/images",
        ]);
        assert!(path.is_err());

        let cli = Cli::try_parse_from([
            "plex-db-tools",
            "create-update-collection",
            "-l",
            "Movies",
            "-i",
            "8091",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateUpdateCollection { tmdb_id, .. } => assert_eq!(tmdb_id, Some(8091)),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_auto_mode_range() {
        let ok = Cli::try_parse_from(["plex-db-tools", "missing-posters", "-l", "TV", "-a", "1"]);
        assert!(ok.is_ok());
        let bad = Cli::try_parse_from(["plex-db-tools", "missing-posters", "-l", "TV", "-a", "2"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from([
            "plex-db-tools",
            "-vv",
            "create-update-all",
            "-l",
            "Movies",
            "--changed-only",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::CreateUpdateAll {
                changed_only,
                ignore_missing_members,
                ..
            } => {
                assert!(changed_only);
                assert!(!ignore_missing_members);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
