//! Durable backup checkpoints.
//!
//! One JSON checkpoint file per tracked database, co-located with the
//! backup artifacts, records when that database was last backed up:
//!
//! ```json
//! {"database": "library.db", "filename": "library.json",
//!  "date": 1712345678, "date_format": "2024y-04m-05d_18h-54m-38s"}
//! ```
//!
//! `date` is standard Unix epoch seconds. Writes go through a named
//! temporary file persisted over the target, so a crash mid-write never
//! leaves a truncated checkpoint behind. A checkpoint is only ever
//! rewritten after a backup artifact has been successfully produced;
//! failures leave the previous record in place so the next tick retries.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BackupError, Result};
use crate::stamp::artifact_label;

/// Last-backup record for one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Database file name (e.g. `library.db`).
    pub database: String,
    /// Checkpoint file name (e.g. `library.json`).
    pub filename: String,
    /// Last backup time, Unix epoch seconds.
    pub date: i64,
    /// Human-readable label of the same instant.
    pub date_format: String,
}

impl Checkpoint {
    /// Creates a checkpoint stamped at `now` for a database identified by
    /// its stem (file name without extension).
    pub fn stamped(stem: &str, database: &str, now: &DateTime<Local>) -> Self {
        Self {
            database: database.to_string(),
            filename: format!("{stem}.json"),
            date: now.timestamp(),
            date_format: artifact_label(now),
        }
    }

    /// Loads a checkpoint, distinguishing absent from corrupt.
    ///
    /// Returns `Ok(None)` if no file exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::CheckpointCorrupt`] for unparsable content.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(err) => Err(BackupError::CheckpointCorrupt {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }

    /// Atomically writes the checkpoint to `path`.
    ///
    /// The record is serialized into a temporary file in the same
    /// directory and renamed over the target, so readers never observe a
    /// partial write.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new()?,
        };
        tmp.write_all(serde_json::to_string(self)?.as_bytes())?;
        tmp.persist(path).map_err(|err| err.error)?;
        debug!(path = %path.display(), date = self.date, "checkpoint written");
        Ok(())
    }
}
