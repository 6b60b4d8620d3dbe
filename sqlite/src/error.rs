//! Error types for store operations.
//!
//! Provides a unified error type covering SQLite access, catalog lookups,
//! naming conflicts, and schema validation failures.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite operation failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The named table does not exist.
    #[error("no such table: {0}")]
    TableNotFound(String),

    /// The requested name is already taken by another table.
    #[error("table name already in use: {0}")]
    NameCollision(String),

    /// Schema or identifier validation failure.
    #[error(transparent)]
    Schema(#[from] sqlkeeper_core::SchemaError),

    /// A destructive operation was invoked without confirmation.
    #[error("confirmation required to {0}")]
    ConfirmationRequired(&'static str),

    /// Filesystem failure while opening or snapshotting a database.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results with [`DbError`].
pub type Result<T> = std::result::Result<T, DbError>;
