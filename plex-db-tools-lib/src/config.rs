//! Application configuration and default file locations.
//!
//! Settings live in `~/.config/plex-db-tools/config.toml` unless a path is
//! given on the command line. Every value can be overridden by an
//! environment variable; priority is env var > config file > default.

use std::path::{Path, PathBuf};

use plex_db_tools_catalog::DEFAULT_SHEETS_URL;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Missing {field}. Set {env} or add it to the config file")]
    Missing {
        field: &'static str,
        env: &'static str,
    },
    #[error("Invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

// ── Default Locations ───────────────────────────────────────────────────────

/// Directory holding the config, checkpoint and log files.
pub fn config_dir() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("plex-db-tools")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn default_checkpoint_path() -> PathBuf {
    config_dir().join("checkpoint.json")
}

pub fn default_log_path() -> PathBuf {
    config_dir().join("activity.log")
}

// ── Resolved Config ─────────────────────────────────────────────────────────

/// Fully resolved configuration, passed explicitly to every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub plex: PlexConfig,
    pub tmdb: TmdbConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlexConfig {
    pub url: String,
    pub token: String,
    pub database_path: PathBuf,
    pub verify_tls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbConfig {
    /// Only needed by the collection commands.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub url: String,
}

impl TmdbConfig {
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::Missing {
            field: "tmdb.api_key",
            env: "TMDB_API_KEY",
        })
    }
}

// ── File Format ─────────────────────────────────────────────────────────────

/// TOML config file format.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub plex: PlexSection,
    #[serde(default)]
    pub tmdb: TmdbSection,
    #[serde(default)]
    pub sheets: SheetsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlexSection {
    pub url: Option<String>,
    pub token: Option<String>,
    pub database_path: Option<PathBuf>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TmdbSection {
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SheetsSection {
    pub url: Option<String>,
}

impl ConfigFile {
    /// Read the config file. A missing file is not an error: every value
    /// may still come from the environment.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let file = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(file))
    }
}

impl Config {
    /// Load the config file at `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = ConfigFile::read(path)?;
        Self::resolve(file.unwrap_or_default(), |key| std::env::var(key).ok())
    }

    /// Combine file values with overrides looked up through `env`.
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let url = non_empty(env("PLEX_URL"))
            .or_else(|| non_empty(file.plex.url))
            .ok_or(ConfigError::Missing {
                field: "plex.url",
                env: "PLEX_URL",
            })?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "plex.url",
                message: format!("'{url}' must start with http:// or https://"),
            });
        }

        let token = non_empty(env("PLEX_TOKEN"))
            .or_else(|| non_empty(file.plex.token))
            .ok_or(ConfigError::Missing {
                field: "plex.token",
                env: "PLEX_TOKEN",
            })?;

        let database_path = non_empty(env("PLEX_DATABASE_PATH"))
            .map(PathBuf::from)
            .or(file.plex.database_path)
            .ok_or(ConfigError::Missing {
                field: "plex.database_path",
                env: "PLEX_DATABASE_PATH",
            })?;

        let verify_tls = match env("PLEX_VERIFY_TLS") {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                field: "plex.verify_tls",
                message: format!("'{v}' is not a boolean"),
            })?,
            None => file.plex.verify_tls.unwrap_or(false),
        };

        let api_key = non_empty(env("TMDB_API_KEY")).or_else(|| non_empty(file.tmdb.api_key));

        let sheets_url = non_empty(env("SHEETS_URL"))
            .or_else(|| non_empty(file.sheets.url))
            .unwrap_or_else(|| DEFAULT_SHEETS_URL.to_string());

        Ok(Self {
            plex: PlexConfig {
                url,
                token,
                database_path,
                verify_tls,
            },
            tmdb: TmdbConfig { api_key },
            sheets: SheetsConfig { url: sheets_url },
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
