//! Tabular data import and retrieval.
//!
//! [`store`] turns a [`TabularData`] batch (from any importer) into a
//! table: the table name and column names are sanitized, each column's
//! SQLite type is inferred from its first non-null cell, and all rows are
//! inserted in one transaction. [`retrieve`] reads a whole table back into
//! the same shape.
//!
//! # Example
//!
//! ```
//! use sqlkeeper_core::TabularData;
//! use sqlkeeper_sqlite::{Database, IfExists, retrieve, store};
//!
//! let doc = serde_json::json!([
//!     {"code": "bolt", "qty": 10},
//!     {"code": "nut", "qty": 20},
//! ]);
//! let data = TabularData::from_json_records(&doc).unwrap();
//!
//! let mut db = Database::open_in_memory().unwrap();
//! let inserted = store(&mut db, "parts", &data, IfExists::Fail).unwrap();
//! assert_eq!(inserted, 2);
//!
//! let round = retrieve(&db, "parts").unwrap();
//! assert_eq!(round.row_count(), 2);
//! ```

use rusqlite::types::{Value as SqlValue, ValueRef};
use sqlkeeper_core::{CellValue, TabularData, sanitize_identifier};
use tracing::info;

use crate::catalog;
use crate::database::Database;
use crate::error::{DbError, Result};

/// What to do when the target table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExists {
    /// Error with [`DbError::NameCollision`].
    Fail,
    /// Drop the existing table and recreate it.
    Replace,
}

/// Stores a tabular batch as a table, returning the number of rows
/// inserted.
///
/// Column types are inferred per column from the first non-null cell
/// (INTEGER, REAL, or TEXT; all-null columns default to TEXT). Creation
/// and all inserts run in a single transaction.
///
/// # Errors
///
/// Returns [`DbError::NameCollision`] when the table exists and
/// `if_exists` is [`IfExists::Fail`], or a schema error for unusable
/// names or an empty column list.
pub fn store(
    db: &mut Database,
    table: &str,
    data: &TabularData,
    if_exists: IfExists,
) -> Result<usize> {
    let table = sanitize_identifier(table)?;
    if data.columns.is_empty() {
        return Err(DbError::Schema(sqlkeeper_core::SchemaError::EmptySchema));
    }
    let columns: Vec<String> = data
        .columns
        .iter()
        .map(|c| sanitize_identifier(c))
        .collect::<std::result::Result<_, _>>()?;

    if catalog::table_exists(db, &table)? {
        match if_exists {
            IfExists::Fail => return Err(DbError::NameCollision(table)),
            IfExists::Replace => {}
        }
    }

    let defs: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| format!("\"{name}\" {}", inferred_type(data, i)))
        .collect();
    let quoted: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();

    let tx = db.connection_mut().transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
    tx.execute(
        &format!("CREATE TABLE \"{table}\" ({})", defs.join(", ")),
        [],
    )?;

    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{table}\" ({}) VALUES ({})",
            quoted.join(", "),
            placeholders.join(", ")
        ))?;
        for row in &data.rows {
            inserted += stmt.execute(rusqlite::params_from_iter(row.iter().map(cell_to_sql)))?;
        }
    }
    tx.commit()?;

    info!(%table, rows = inserted, "tabular data stored");
    Ok(inserted)
}

/// Reads a whole table back into tabular form.
///
/// # Errors
///
/// Returns [`DbError::TableNotFound`] if the table does not exist.
pub fn retrieve(db: &Database, table: &str) -> Result<TabularData> {
    let columns = catalog::table_columns(db, table)?;
    let mut stmt = db
        .connection()
        .prepare(&format!("SELECT * FROM \"{table}\""))?;

    let mut data = TabularData::new(columns);
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(data.columns.len());
        for i in 0..data.columns.len() {
            cells.push(cell_from_sql(row.get_ref(i)?));
        }
        data.rows.push(cells);
    }
    Ok(data)
}

fn inferred_type(data: &TabularData, column: usize) -> &'static str {
    for row in &data.rows {
        match row.get(column) {
            Some(CellValue::Integer(_)) => return "INTEGER",
            Some(CellValue::Real(_)) => return "REAL",
            Some(CellValue::Text(_)) => return "TEXT",
            Some(CellValue::Null) | None => continue,
        }
    }
    "TEXT"
}

fn cell_to_sql(cell: &CellValue) -> SqlValue {
    match cell {
        CellValue::Null => SqlValue::Null,
        CellValue::Integer(i) => SqlValue::Integer(*i),
        CellValue::Real(f) => SqlValue::Real(*f),
        CellValue::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
        // The importer shape is text-oriented; blobs degrade to lossy text.
        ValueRef::Blob(b) => CellValue::Text(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> TabularData {
        TabularData {
            columns: vec!["code".to_string(), "qty".to_string(), "note".to_string()],
            rows: vec![
                vec![
                    CellValue::Text("bolt".into()),
                    CellValue::Integer(10),
                    CellValue::Null,
                ],
                vec![
                    CellValue::Text("nut".into()),
                    CellValue::Integer(20),
                    CellValue::Text("m6".into()),
                ],
            ],
        }
    }

    #[test]
    fn test_store_infers_column_types() {
        let mut db = Database::open_in_memory().unwrap();
        store(&mut db, "parts", &batch(), IfExists::Fail).unwrap();

        let decl: String = db
            .connection()
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = 'parts'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(decl.contains("\"qty\" INTEGER"));
        assert!(decl.contains("\"code\" TEXT"));
        assert!(decl.contains("\"note\" TEXT"));
    }

    #[test]
    fn test_store_fail_on_existing() {
        let mut db = Database::open_in_memory().unwrap();
        store(&mut db, "parts", &batch(), IfExists::Fail).unwrap();
        assert!(matches!(
            store(&mut db, "parts", &batch(), IfExists::Fail),
            Err(DbError::NameCollision(_))
        ));
    }

    #[test]
    fn test_store_replace_overwrites() {
        let mut db = Database::open_in_memory().unwrap();
        store(&mut db, "parts", &batch(), IfExists::Fail).unwrap();
        let mut smaller = batch();
        smaller.rows.truncate(1);
        let inserted = store(&mut db, "parts", &smaller, IfExists::Replace).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(catalog::row_count(&db, "parts").unwrap(), 1);
    }

    #[test]
    fn test_store_sanitizes_table_and_columns() {
        let mut db = Database::open_in_memory().unwrap();
        let data = TabularData {
            columns: vec!["user name".to_string()],
            rows: vec![vec![CellValue::Text("ada".into())]],
        };
        store(&mut db, "2024 report", &data, IfExists::Fail).unwrap();
        assert_eq!(
            catalog::table_columns(&db, "_2024_report").unwrap(),
            vec!["user_name"]
        );
    }

    #[test]
    fn test_retrieve_round_trip() {
        let mut db = Database::open_in_memory().unwrap();
        store(&mut db, "parts", &batch(), IfExists::Fail).unwrap();
        let round = retrieve(&db, "parts").unwrap();
        assert_eq!(round.columns, vec!["code", "qty", "note"]);
        assert_eq!(round.rows, batch().rows);
    }

    #[test]
    fn test_retrieve_missing_table() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            retrieve(&db, "ghost"),
            Err(DbError::TableNotFound(_))
        ));
    }
}
