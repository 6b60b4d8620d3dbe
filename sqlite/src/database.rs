//! The owned database handle.
//!
//! [`Database`] wraps a [`rusqlite::Connection`] together with where it
//! lives ([`Location`]). The handle is the unit of exclusive access: one
//! caller owns it at a time, closing and reopening are consuming state
//! transitions rather than in-place mutation, and snapshots go through
//! SQLite's online backup API so they are consistent even while the
//! connection is live.
//!
//! # Example
//!
//! ```no_run
//! use sqlkeeper_sqlite::Database;
//!
//! let db = Database::open("data/library.db").unwrap();
//! db.connection()
//!     .execute("CREATE TABLE IF NOT EXISTS books (title TEXT)", [])
//!     .unwrap();
//!
//! // Consistent point-in-time copy, safe against a live connection.
//! db.snapshot_to("data/library_copy.db").unwrap();
//!
//! // Reopen returns a fresh handle instead of mutating the old one.
//! let db = db.reopen().unwrap();
//! # let _ = db;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::backup::Backup;
use tracing::{debug, info};

use crate::error::{DbError, Result};

/// Where a database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Transient in-memory database.
    Memory,
    /// Database file on disk.
    File(PathBuf),
}

/// An open SQLite database plus its location.
///
/// Foreign-key enforcement is switched on at open time; all store
/// operations in this crate assume it.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    location: Location,
}

impl Database {
    /// Opens (or creates) a database file, creating parent directories as
    /// needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let existed = path.exists();
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if existed {
            info!(path = %path.display(), "database found");
        } else {
            info!(path = %path.display(), "database created");
        }
        Ok(Self {
            conn,
            location: Location::File(path.to_path_buf()),
        })
    }

    /// Opens a transient in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        debug!("in-memory database created");
        Ok(Self {
            conn,
            location: Location::Memory,
        })
    }

    /// Returns the database location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the file path for on-disk databases, `None` for in-memory.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns a mutable reference to the underlying connection, for
    /// operations that need a transaction.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Closes the handle, surfacing any pending SQLite error.
    pub fn close(self) -> Result<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        if let Location::File(path) = location {
            debug!(path = %path.display(), "connection closed");
        }
        Ok(())
    }

    /// Closes and reopens the database, returning a fresh handle.
    ///
    /// In-memory databases cannot be reopened (their contents die with
    /// the connection), so the same handle is returned unchanged.
    pub fn reopen(self) -> Result<Self> {
        match self.location.clone() {
            Location::Memory => Ok(self),
            Location::File(path) => {
                self.close()?;
                Self::open(path)
            }
        }
    }

    /// Writes a consistent point-in-time copy of this database to `path`
    /// using SQLite's online backup API.
    ///
    /// Safe to call while this connection is open for writes; the engine
    /// guarantees a consistent snapshot. Works for both file-backed and
    /// in-memory databases.
    pub fn snapshot_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut target = Connection::open(path)?;
        let backup = Backup::new(&self.conn, &mut target)?;
        backup.run_to_completion(100, Duration::from_millis(0), None)?;
        drop(backup);
        target.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        debug!(path = %path.display(), "snapshot written");
        Ok(())
    }
}
