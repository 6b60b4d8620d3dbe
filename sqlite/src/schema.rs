//! SQL generation for table creation.
//!
//! Turns a [`TableSchema`] into a `CREATE TABLE` statement. Identifiers
//! are validated and double-quoted before they reach SQL text; values
//! never appear here (data travels through parameterized statements
//! elsewhere). The foreign-key clause references the schema's resolved
//! target table and its `id` column.
//!
//! # Example
//!
//! ```
//! use sqlkeeper_core::{ForeignKey, TableSchema};
//! use sqlkeeper_sqlite::create_table_sql;
//!
//! let schema = TableSchema::new()
//!     .column("title")
//!     .column("author_id")
//!     .with_foreign_key(ForeignKey::new("author_id"));
//! let sql = create_table_sql("books", &schema).unwrap();
//! assert!(sql.contains("\"title\" TEXT"));
//! assert!(sql.contains("FOREIGN KEY(\"author_id\") REFERENCES \"authors\"(\"id\")"));
//! ```

use sqlkeeper_core::{TableSchema, validate_identifier, validate_schema};

use crate::error::Result;

/// Generates a `CREATE TABLE` statement for the given name and schema.
///
/// Columns appear in declaration order with their declared types; an
/// optional trailing foreign-key clause references the resolved target
/// table (exact name if supplied, pluralization heuristic otherwise).
///
/// # Errors
///
/// Returns a schema validation error for illegal identifiers, duplicate
/// columns, or a foreign-key column missing from the column list.
pub fn create_table_sql(table: &str, schema: &TableSchema) -> Result<String> {
    validate_identifier(table)?;
    validate_schema(schema)?;

    let mut defs: Vec<String> = schema
        .columns
        .iter()
        .map(|col| format!("\"{}\" {}", col.name, col.ty.sql_decl()))
        .collect();

    if let Some(fk) = &schema.foreign_key {
        let target = fk.target_table();
        validate_identifier(&target)?;
        defs.push(format!(
            "FOREIGN KEY(\"{}\") REFERENCES \"{}\"(\"id\")",
            fk.column, target
        ));
    }

    Ok(format!("CREATE TABLE \"{}\" ({})", table, defs.join(", ")))
}

/// Joins column names into a quoted, comma-separated SQL list.
pub(crate) fn quoted_column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
