//! Catalog introspection over `sqlite_master` and `PRAGMA table_info`.
//!
//! Read-only lookups used by the migrator, maintenance operations, and the
//! CLI's listing commands. Internal `sqlite_*` tables are never reported.

use rusqlite::Connection;

use crate::database::Database;
use crate::error::{DbError, Result};

/// Row count and column list for a table, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    /// Table name.
    pub name: String,
    /// Number of rows.
    pub rows: usize,
    /// Ordered column names.
    pub columns: Vec<String>,
}

/// Lists user tables, optionally filtered.
///
/// The filter first matches as a case-insensitive substring; if nothing
/// matches, it retries as a name prefix. No filter lists everything,
/// sorted by name.
pub fn list_tables(db: &Database, filter: Option<&str>) -> Result<Vec<String>> {
    let mut stmt = db.connection().prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let all: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let Some(filter) = filter else {
        return Ok(all);
    };

    let needle = filter.to_lowercase();
    let by_substring: Vec<String> = all
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    if !by_substring.is_empty() {
        return Ok(by_substring);
    }
    Ok(all
        .into_iter()
        .filter(|name| name.to_lowercase().starts_with(&needle))
        .collect())
}

/// Checks whether a table exists.
pub fn table_exists(db: &Database, table: &str) -> Result<bool> {
    exists_on(db.connection(), table)
}

/// Returns a table's column names in declaration order.
///
/// # Errors
///
/// Returns [`DbError::TableNotFound`] if the table does not exist.
pub fn table_columns(db: &Database, table: &str) -> Result<Vec<String>> {
    columns_on(db.connection(), table)
}

/// Returns the number of rows in a table.
pub fn row_count(db: &Database, table: &str) -> Result<usize> {
    if !exists_on(db.connection(), table)? {
        return Err(DbError::TableNotFound(table.to_string()));
    }
    sqlkeeper_core::validate_identifier(table)?;
    let count: i64 = db.connection().query_row(
        &format!("SELECT COUNT(*) FROM \"{table}\""),
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Collects a display summary (rows + columns) for a table.
pub fn table_summary(db: &Database, table: &str) -> Result<TableSummary> {
    let columns = table_columns(db, table)?;
    let rows = row_count(db, table)?;
    Ok(TableSummary {
        name: table.to_string(),
        rows,
        columns,
    })
}

/// `table_exists` against a bare connection, usable inside a transaction.
pub(crate) fn exists_on(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// `table_columns` against a bare connection, usable inside a transaction.
pub(crate) fn columns_on(conn: &Connection, table: &str) -> Result<Vec<String>> {
    if !exists_on(conn, table)? {
        return Err(DbError::TableNotFound(table.to_string()));
    }
    sqlkeeper_core::validate_identifier(table)?;
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}
