//! Core types for SQLite table management.
//!
//! This crate defines the storage-independent model shared by the store
//! backend and the backup layer:
//!
//! - [`TableSchema`] / [`ColumnDef`] / [`ColumnType`] / [`ForeignKey`] —
//!   the desired shape of a table, consumed by SQL generation and the
//!   schema migrator.
//! - [`MigrationPlan`] — column-set comparison deciding what survives a
//!   copy-and-recreate migration.
//! - [`TabularData`] / [`CellValue`] — the flat shape importers produce
//!   and the store ingests, with JSON flattening built in.
//! - Identifier handling ([`sanitize_identifier`], [`validate_identifier`])
//!   and schema validation ([`validate_schema`]).
//!
//! # Example
//!
//! ```
//! use sqlkeeper_core::*;
//!
//! let schema = TableSchema::new()
//!     .column("title")
//!     .column("author_id")
//!     .with_foreign_key(ForeignKey::new("author_id"));
//! assert!(validate_schema(&schema).is_ok());
//!
//! let plan = MigrationPlan::between(
//!     &["title".into(), "year".into()],
//!     &schema.column_names(),
//! );
//! assert_eq!(plan.common, vec!["title"]);
//! assert_eq!(plan.dropped, vec!["year"]);
//! ```

mod naming;
mod plan;
mod tabular;
mod types;
mod validate;

pub use naming::referenced_table;
pub use plan::MigrationPlan;
pub use tabular::{CellValue, TabularData};
pub use types::{ColumnDef, ColumnType, ForeignKey, TableSchema};
pub use validate::{SchemaError, sanitize_identifier, validate_identifier, validate_schema};
