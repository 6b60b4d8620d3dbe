//! Checkpointed backups and restore for SQLite databases.
//!
//! Every tracked database gets a durable JSON [`Checkpoint`] recording
//! when it was last backed up. The [`BackupScheduler`] compares that
//! record against its [`BackupInterval`] on each tick and produces a
//! timestamped artifact (`<stem>_backup_<label>.db`) when one is due,
//! through the engine's online backup so live connections are safe.
//! Restore closes the owned handle, copies an artifact over the database
//! file, and hands back a fresh handle.
//!
//! # Quick start
//!
//! ```
//! use sqlkeeper_backup::{BackupInterval, BackupScheduler};
//! use sqlkeeper_sqlite::Database;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let db = Database::open(dir.path().join("library.db")).unwrap();
//! let scheduler = BackupScheduler::new(
//!     dir.path().join("backup"),
//!     BackupInterval::default(),
//! ).unwrap();
//!
//! let artifact = scheduler.force_backup(&db).unwrap();
//! let db = scheduler.restore(db, artifact.file_name().unwrap().to_str().unwrap(), true).unwrap();
//! # let _ = db;
//! ```

mod checkpoint;
mod error;
mod scheduler;
pub mod stamp;

pub use checkpoint::Checkpoint;
pub use error::{BackupError, Result};
pub use scheduler::{
    BackupInterval, BackupOutcome, BackupScheduler, DEFAULT_INTERVAL_SECS, INTERVAL_DISABLED,
};
