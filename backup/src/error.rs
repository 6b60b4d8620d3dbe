//! Error types for backup and restore operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during checkpointing, backup, and restore.
#[derive(Debug, Error)]
pub enum BackupError {
    /// A checkpoint file exists but cannot be parsed.
    #[error("checkpoint at {path} is unreadable: {reason}")]
    CheckpointCorrupt {
        /// Path of the offending checkpoint file.
        path: PathBuf,
        /// Parse failure description.
        reason: String,
    },

    /// A checkpoint for this database already exists.
    #[error("a checkpoint already exists at {0}")]
    CheckpointExists(PathBuf),

    /// The requested backup artifact does not exist.
    #[error("backup artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    /// The restore target has no file path (in-memory database).
    #[error("restore target has no file path; cannot restore onto an in-memory database")]
    RestoreTargetMissing,

    /// A destructive operation was invoked without confirmation.
    #[error("confirmation required to {0}")]
    ConfirmationRequired(&'static str),

    /// Store-layer failure.
    #[error("database error: {0}")]
    Database(#[from] sqlkeeper_sqlite::DbError),

    /// Filesystem failure during copy or checkpoint write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint (de)serialization failure during write.
    #[error("checkpoint serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results with [`BackupError`].
pub type Result<T> = std::result::Result<T, BackupError>;
