//! Last-synced checkpoint for incremental collection runs.
//!
//! Maps library name → collection key → time of the last successful sync.
//! Read once at the start of a bulk run and written once at the end.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error on checkpoint {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid checkpoint file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checkpoint {
    libraries: BTreeMap<String, BTreeMap<String, DateTime<Utc>>>,
}

impl Checkpoint {
    /// Load the checkpoint at `path`. A missing file is an empty checkpoint.
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        if !path.exists() {
            log::debug!("No checkpoint at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&contents).map_err(|e| CheckpointError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Write the checkpoint atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let serialized = serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serialized).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
        log::debug!("Saved checkpoint to {}", path.display());
        Ok(())
    }

    /// Whether a full run has ever been recorded for `library`.
    pub fn has_library(&self, library: &str) -> bool {
        self.libraries.contains_key(library)
    }

    /// Record `library` as fully run, without stamping any collection.
    pub fn ensure_library(&mut self, library: &str) {
        self.libraries.entry(library.to_string()).or_default();
    }

    pub fn last_synced(&self, library: &str, key: &str) -> Option<DateTime<Utc>> {
        self.libraries.get(library)?.get(key).copied()
    }

    pub fn stamp(&mut self, library: &str, key: &str, at: DateTime<Utc>) {
        self.libraries
            .entry(library.to_string())
            .or_default()
            .insert(key.to_string(), at);
    }

    /// Whether a collection changed at `changed_at` needs syncing again.
    ///
    /// Rows without a timestamp never do; otherwise never-synced collections
    /// always do.
    pub fn is_stale(&self, library: &str, key: &str, changed_at: Option<DateTime<Utc>>) -> bool {
        match (changed_at, self.last_synced(library, key)) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(changed), Some(synced)) => changed > synced,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CheckpointError {
    CheckpointError::Io {
        path: path.display().to_string(),
        source,
    }
}
