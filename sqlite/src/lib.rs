//! SQLite store backend.
//!
//! This crate owns every interaction with the database engine:
//!
//! - **`database`** — the owned [`Database`] handle: open/close/reopen as
//!   explicit state transitions, plus engine-level snapshots.
//! - **`catalog`** — introspection over `sqlite_master` and
//!   `PRAGMA table_info`.
//! - **`schema`** — `CREATE TABLE` generation from a
//!   [`TableSchema`](sqlkeeper_core::TableSchema).
//! - **`migrate`** — transactional copy-and-recreate schema migration.
//! - **`maintenance`** — rename/drop/delete/clear with explicit
//!   confirmation flags.
//! - **`import`** — [`TabularData`](sqlkeeper_core::TabularData) in and
//!   out of tables.
//!
//! # Quick start
//!
//! ```
//! use sqlkeeper_core::TableSchema;
//! use sqlkeeper_sqlite::{Database, catalog, migrate_table};
//!
//! let mut db = Database::open_in_memory().unwrap();
//! db.connection()
//!     .execute_batch("CREATE TABLE notes (body TEXT, author TEXT)")
//!     .unwrap();
//!
//! let target = TableSchema::new().column("body").column("created_at");
//! migrate_table(&mut db, "notes", &target).unwrap();
//! assert_eq!(
//!     catalog::table_columns(&db, "notes").unwrap(),
//!     vec!["body", "created_at"]
//! );
//! ```

pub mod catalog;
mod database;
mod error;
mod import;
mod maintenance;
mod migrate;
mod schema;

pub use database::{Database, Location};
pub use error::{DbError, Result};
pub use import::{IfExists, retrieve, store};
pub use maintenance::{clear_database, delete_rows, drop_table, rename_column, rename_table};
pub use migrate::{MigrationReport, migrate_table};
pub use schema::create_table_sql;
