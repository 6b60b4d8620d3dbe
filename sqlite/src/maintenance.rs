//! Table maintenance: rename, drop, row deletion, clearing.
//!
//! Destructive operations (drop, delete, clear) take an explicit
//! `confirmed` flag and refuse to run without it — interactive prompting
//! belongs to the caller, never to the store layer. Names passed in are
//! sanitized to legal identifiers before use.

use sqlkeeper_core::sanitize_identifier;
use tracing::{info, warn};

use crate::catalog;
use crate::database::Database;
use crate::error::{DbError, Result};

/// Renames a table.
///
/// Both names are sanitized. Renaming onto an existing table is a
/// [`DbError::NameCollision`] rather than a silent skip.
pub fn rename_table(db: &Database, old: &str, new: &str) -> Result<()> {
    let old = sanitize_identifier(old)?;
    let new = sanitize_identifier(new)?;
    if !catalog::table_exists(db, &old)? {
        return Err(DbError::TableNotFound(old));
    }
    if catalog::table_exists(db, &new)? {
        return Err(DbError::NameCollision(new));
    }
    db.connection().execute(
        &format!("ALTER TABLE \"{old}\" RENAME TO \"{new}\""),
        [],
    )?;
    info!(from = %old, to = %new, "table renamed");
    Ok(())
}

/// Renames a column within a table.
pub fn rename_column(db: &Database, table: &str, old: &str, new: &str) -> Result<()> {
    let table = sanitize_identifier(table)?;
    let old = sanitize_identifier(old)?;
    let new = sanitize_identifier(new)?;
    if !catalog::table_exists(db, &table)? {
        return Err(DbError::TableNotFound(table));
    }
    db.connection().execute(
        &format!("ALTER TABLE \"{table}\" RENAME COLUMN \"{old}\" TO \"{new}\""),
        [],
    )?;
    info!(%table, from = %old, to = %new, "column renamed");
    Ok(())
}

/// Drops a table. Requires `confirmed`.
pub fn drop_table(db: &Database, table: &str, confirmed: bool) -> Result<()> {
    if !confirmed {
        return Err(DbError::ConfirmationRequired("drop a table"));
    }
    let table = sanitize_identifier(table)?;
    if !catalog::table_exists(db, &table)? {
        return Err(DbError::TableNotFound(table));
    }
    db.connection()
        .execute(&format!("DROP TABLE \"{table}\""), [])?;
    info!(%table, "table dropped");
    Ok(())
}

/// Deletes the rows whose first column equals any of `keys`. Requires
/// `confirmed`. Returns the number of rows deleted.
///
/// Matching on the first column mirrors how key columns come first in
/// imported tables; the comparison itself is parameterized.
pub fn delete_rows(db: &mut Database, table: &str, keys: &[String], confirmed: bool) -> Result<usize> {
    if !confirmed {
        return Err(DbError::ConfirmationRequired("delete rows"));
    }
    let table = sanitize_identifier(table)?;
    let columns = catalog::table_columns(db, &table)?;
    let Some(key_column) = columns.first() else {
        return Err(DbError::TableNotFound(table));
    };
    let sql = format!("DELETE FROM \"{table}\" WHERE \"{key_column}\" = ?1");

    let tx = db.connection_mut().transaction()?;
    let mut deleted = 0;
    {
        let mut stmt = tx.prepare(&sql)?;
        for key in keys {
            deleted += stmt.execute([key])?;
        }
    }
    tx.commit()?;

    if deleted == 0 {
        warn!(%table, "no rows matched for deletion");
    } else {
        info!(%table, deleted, "rows deleted");
    }
    Ok(deleted)
}

/// Drops every user table in the database. Requires `confirmed`.
///
/// Foreign-key enforcement is suspended for the sweep so drop order does
/// not matter, then restored.
pub fn clear_database(db: &mut Database, confirmed: bool) -> Result<usize> {
    if !confirmed {
        return Err(DbError::ConfirmationRequired("clear the database"));
    }
    let tables = catalog::list_tables(db, None)?;

    db.connection().execute_batch("PRAGMA foreign_keys = OFF;")?;
    let result = (|| -> Result<()> {
        let tx = db.connection_mut().transaction()?;
        for table in &tables {
            tx.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
        }
        tx.commit()?;
        Ok(())
    })();
    db.connection().execute_batch("PRAGMA foreign_keys = ON;")?;
    result?;

    info!(count = tables.len(), "database cleared");
    Ok(tables.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch(
                "CREATE TABLE parts (code TEXT, qty INTEGER);
                 INSERT INTO parts VALUES ('bolt', 10), ('nut', 20), ('washer', 5);",
            )
            .unwrap();
        db
    }

    #[test]
    fn test_rename_table() {
        let db = fixture();
        rename_table(&db, "parts", "components").unwrap();
        assert!(catalog::table_exists(&db, "components").unwrap());
        assert!(!catalog::table_exists(&db, "parts").unwrap());
    }

    #[test]
    fn test_rename_sanitizes_names() {
        let db = fixture();
        rename_table(&db, "parts", "spare parts!").unwrap();
        assert!(catalog::table_exists(&db, "spare_parts_").unwrap());
    }

    #[test]
    fn test_rename_onto_existing_is_collision() {
        let db = fixture();
        db.connection()
            .execute("CREATE TABLE components (x TEXT)", [])
            .unwrap();
        assert!(matches!(
            rename_table(&db, "parts", "components"),
            Err(DbError::NameCollision(_))
        ));
    }

    #[test]
    fn test_rename_column() {
        let db = fixture();
        rename_column(&db, "parts", "qty", "quantity").unwrap();
        assert_eq!(
            catalog::table_columns(&db, "parts").unwrap(),
            vec!["code", "quantity"]
        );
    }

    #[test]
    fn test_drop_requires_confirmation() {
        let db = fixture();
        assert!(matches!(
            drop_table(&db, "parts", false),
            Err(DbError::ConfirmationRequired(_))
        ));
        assert!(catalog::table_exists(&db, "parts").unwrap());
        drop_table(&db, "parts", true).unwrap();
        assert!(!catalog::table_exists(&db, "parts").unwrap());
    }

    #[test]
    fn test_delete_rows_by_first_column() {
        let mut db = fixture();
        let deleted =
            delete_rows(&mut db, "parts", &["bolt".to_string(), "nut".to_string()], true).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(catalog::row_count(&db, "parts").unwrap(), 1);
    }

    #[test]
    fn test_delete_rows_requires_confirmation() {
        let mut db = fixture();
        assert!(matches!(
            delete_rows(&mut db, "parts", &["bolt".to_string()], false),
            Err(DbError::ConfirmationRequired(_))
        ));
    }

    #[test]
    fn test_clear_database_drops_everything() {
        let mut db = fixture();
        db.connection()
            .execute("CREATE TABLE extra (x TEXT)", [])
            .unwrap();
        let dropped = clear_database(&mut db, true).unwrap();
        assert_eq!(dropped, 2);
        assert!(catalog::list_tables(&db, None).unwrap().is_empty());
    }
}
