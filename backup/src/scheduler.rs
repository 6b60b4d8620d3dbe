//! Interval-driven backup scheduling and restore.
//!
//! [`BackupScheduler`] owns a backup directory and an interval policy.
//! Each call to [`check_due`](BackupScheduler::check_due) is one tick of
//! the per-database state machine:
//!
//! - no checkpoint yet → create one and take a first backup;
//! - checkpoint fresh enough → report the time remaining, touch nothing;
//! - checkpoint older than the interval → snapshot, then rewrite the
//!   checkpoint.
//!
//! The checkpoint is rewritten only after the artifact has been written,
//! so a failed copy leaves the old record in place and the next tick
//! retries. [`BackupInterval::Disabled`] (the `-1` sentinel) stops
//! automatic backups entirely; manual
//! [`force_backup`](BackupScheduler::force_backup) still works.
//!
//! # Example
//!
//! ```
//! use sqlkeeper_backup::{BackupInterval, BackupOutcome, BackupScheduler};
//! use sqlkeeper_sqlite::Database;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let db = Database::open(dir.path().join("library.db")).unwrap();
//!
//! let scheduler = BackupScheduler::new(
//!     dir.path().join("backup"),
//!     BackupInterval::Every(3600),
//! ).unwrap();
//!
//! // First contact: checkpoint created, first artifact written.
//! let outcome = scheduler.check_due(&db).unwrap();
//! assert!(matches!(outcome, BackupOutcome::BackupCreated(_)));
//!
//! // Within the interval: nothing happens.
//! let outcome = scheduler.check_due(&db).unwrap();
//! assert!(matches!(outcome, BackupOutcome::NoActionNeeded { .. }));
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use sqlkeeper_sqlite::Database;
use tracing::{info, warn};

use crate::checkpoint::Checkpoint;
use crate::error::{BackupError, Result};
use crate::stamp::{artifact_label, artifact_name, artifact_prefix};

/// Default automatic backup interval: three hours.
pub const DEFAULT_INTERVAL_SECS: u64 = 10_800;

/// Sentinel interval value that disables automatic backups.
pub const INTERVAL_DISABLED: i64 = -1;

/// How often automatic backups fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupInterval {
    /// Automatic backups never fire.
    Disabled,
    /// A backup is due once this many seconds have elapsed since the
    /// checkpoint.
    Every(u64),
}

impl Default for BackupInterval {
    fn default() -> Self {
        BackupInterval::Every(DEFAULT_INTERVAL_SECS)
    }
}

impl From<i64> for BackupInterval {
    /// Maps the `-1` sentinel (and any other negative value) to
    /// [`BackupInterval::Disabled`].
    fn from(secs: i64) -> Self {
        if secs < 0 {
            BackupInterval::Disabled
        } else {
            BackupInterval::Every(secs as u64)
        }
    }
}

/// Result of a scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A backup artifact was written (first contact or interval elapsed).
    BackupCreated(PathBuf),
    /// The checkpoint is fresh; nothing was written.
    NoActionNeeded {
        /// Seconds until the next backup is due.
        remaining_secs: i64,
    },
    /// Automatic backups are disabled for this scheduler.
    Disabled,
}

/// Checkpointed backup manager for one backup directory.
///
/// Artifacts and checkpoints for any number of databases live together in
/// the directory; each database is keyed by its file stem (in-memory
/// databases share the stem `memory_db`).
#[derive(Debug, Clone)]
pub struct BackupScheduler {
    backup_dir: PathBuf,
    interval: BackupInterval,
}

impl BackupScheduler {
    /// Creates a scheduler over `backup_dir`, creating the directory if
    /// needed.
    pub fn new(backup_dir: impl Into<PathBuf>, interval: BackupInterval) -> Result<Self> {
        let backup_dir = backup_dir.into();
        std::fs::create_dir_all(&backup_dir)?;
        Ok(Self {
            backup_dir,
            interval,
        })
    }

    /// Returns the backup directory.
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Returns the interval policy.
    pub fn interval(&self) -> BackupInterval {
        self.interval
    }

    /// Returns the checkpoint file path for a database.
    pub fn checkpoint_path(&self, db: &Database) -> PathBuf {
        self.backup_dir.join(format!("{}.json", database_stem(db)))
    }

    /// Loads the database's checkpoint, if one exists.
    pub fn checkpoint(&self, db: &Database) -> Result<Option<Checkpoint>> {
        Checkpoint::load(&self.checkpoint_path(db))
    }

    /// One scheduler tick: backs up the database if and only if it is due.
    ///
    /// A missing checkpoint means first contact — a checkpoint is created
    /// and a first backup taken regardless of the interval. A corrupt
    /// checkpoint is treated the same way (logged, then recreated). With
    /// [`BackupInterval::Disabled`] no automatic backup ever fires after
    /// first contact.
    ///
    /// On any failure the checkpoint keeps its previous contents, so the
    /// next tick retries.
    pub fn check_due(&self, db: &Database) -> Result<BackupOutcome> {
        let path = self.checkpoint_path(db);
        let existing = match Checkpoint::load(&path) {
            Ok(existing) => existing,
            Err(BackupError::CheckpointCorrupt { path, reason }) => {
                warn!(path = %path.display(), reason, "corrupt checkpoint; recreating");
                None
            }
            Err(err) => return Err(err),
        };

        let now = Local::now();
        let Some(checkpoint) = existing else {
            let artifact = self.first_contact(db, &now)?;
            return Ok(BackupOutcome::BackupCreated(artifact));
        };

        let BackupInterval::Every(interval_secs) = self.interval else {
            return Ok(BackupOutcome::Disabled);
        };

        let elapsed = now.timestamp() - checkpoint.date;
        if elapsed < interval_secs as i64 {
            return Ok(BackupOutcome::NoActionNeeded {
                remaining_secs: interval_secs as i64 - elapsed,
            });
        }

        let artifact = self.write_artifact(db, &now)?;
        self.stamp_checkpoint(db, &now)?;
        info!(artifact = %artifact.display(), "automatic backup created");
        Ok(BackupOutcome::BackupCreated(artifact))
    }

    /// Takes a backup immediately, regardless of elapsed time, and
    /// rewrites the checkpoint. Creates the checkpoint if absent.
    pub fn force_backup(&self, db: &Database) -> Result<PathBuf> {
        let now = Local::now();
        let artifact = self.write_artifact(db, &now)?;
        self.stamp_checkpoint(db, &now)?;
        info!(artifact = %artifact.display(), "manual backup created");
        Ok(artifact)
    }

    /// Creates the checkpoint for a database and takes its first backup.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::CheckpointExists`] if a checkpoint is
    /// already present and `overwrite` is false.
    pub fn create_checkpoint(&self, db: &Database, overwrite: bool) -> Result<Checkpoint> {
        let path = self.checkpoint_path(db);
        if path.exists() && !overwrite {
            return Err(BackupError::CheckpointExists(path));
        }
        let now = Local::now();
        let checkpoint = Checkpoint::stamped(&database_stem(db), &database_name(db), &now);
        checkpoint.write(&path)?;
        self.write_artifact(db, &now)?;
        info!(checkpoint = %path.display(), "checkpoint created with first backup");
        Ok(checkpoint)
    }

    /// Lists this database's artifact file names, sorted ascending.
    ///
    /// The calendar label sorts lexicographically within a year, so this
    /// is effectively oldest-first.
    pub fn list_artifacts(&self, db: &Database) -> Result<Vec<String>> {
        let prefix = artifact_prefix(&database_stem(db));
        let mut names: Vec<String> = std::fs::read_dir(&self.backup_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix) && name.ends_with(".db"))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Replaces the live database with a previously captured artifact.
    ///
    /// Consumes the handle — the connection is closed before the database
    /// file is overwritten, and a fresh handle on the restored file is
    /// returned. `artifact` is a file name inside the backup directory
    /// (`.db` is appended if missing) or the artifact's full name from
    /// [`list_artifacts`](Self::list_artifacts).
    ///
    /// # Errors
    ///
    /// - [`BackupError::ArtifactNotFound`] — no such artifact; checked
    ///   before the handle is closed or the target touched.
    /// - [`BackupError::RestoreTargetMissing`] — the handle is an
    ///   in-memory database, which has no file to overwrite.
    /// - [`BackupError::ConfirmationRequired`] — `confirmed` was false.
    pub fn restore(&self, db: Database, artifact: &str, confirmed: bool) -> Result<Database> {
        let mut name = artifact.to_string();
        if !name.to_lowercase().ends_with(".db") {
            name.push_str(".db");
        }
        let artifact_path = self.backup_dir.join(&name);
        if !artifact_path.exists() {
            return Err(BackupError::ArtifactNotFound(artifact_path));
        }
        let Some(target) = db.path().map(Path::to_path_buf) else {
            return Err(BackupError::RestoreTargetMissing);
        };
        if !confirmed {
            return Err(BackupError::ConfirmationRequired("restore a backup"));
        }

        db.close().map_err(BackupError::Database)?;
        std::fs::copy(&artifact_path, &target)?;
        info!(
            artifact = %artifact_path.display(),
            target = %target.display(),
            "backup restored"
        );
        Ok(Database::open(target)?)
    }

    /// First contact with a database: checkpoint, then first artifact.
    fn first_contact(&self, db: &Database, now: &DateTime<Local>) -> Result<PathBuf> {
        self.stamp_checkpoint(db, now)?;
        let artifact = self.write_artifact(db, now)?;
        info!(
            checkpoint = %self.checkpoint_path(db).display(),
            "checkpoint created with first backup"
        );
        Ok(artifact)
    }

    fn stamp_checkpoint(&self, db: &Database, now: &DateTime<Local>) -> Result<()> {
        let stem = database_stem(db);
        let checkpoint = Checkpoint::stamped(&stem, &database_name(db), now);
        checkpoint.write(&self.checkpoint_path(db))
    }

    /// Snapshots the database into a timestamped artifact via the
    /// engine's online backup, safe against a live connection.
    fn write_artifact(&self, db: &Database, now: &DateTime<Local>) -> Result<PathBuf> {
        let name = artifact_name(&database_stem(db), &artifact_label(now));
        let path = self.backup_dir.join(name);
        db.snapshot_to(&path)?;
        Ok(path)
    }
}

/// File stem identifying a database inside the backup directory.
fn database_stem(db: &Database) -> String {
    db.path()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("memory_db")
        .to_string()
}

/// Full database file name recorded in checkpoints.
fn database_name(db: &Database) -> String {
    db.path()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("memory_db")
        .to_string()
}
