//! Copy-and-recreate schema migration.
//!
//! SQLite cannot alter a table into an arbitrary new shape, so
//! [`migrate_table`] rebuilds it: rename the existing table aside, create
//! the target shape, copy the columns common to both, drop the old copy.
//! All steps run in a single transaction — any failure rolls back and
//! leaves the original table intact under its original name.
//!
//! Columns present in both schemas survive with their data; columns only
//! in the old schema are discarded; columns only in the new schema come up
//! NULL. The common set is a pure set intersection (see
//! [`MigrationPlan`]): old-schema ordering is not preserved.
//!
//! # Example
//!
//! ```
//! use sqlkeeper_core::TableSchema;
//! use sqlkeeper_sqlite::{Database, migrate_table};
//!
//! let mut db = Database::open_in_memory().unwrap();
//! db.connection()
//!     .execute_batch(
//!         "CREATE TABLE readings (a TEXT, b TEXT, c TEXT);
//!          INSERT INTO readings VALUES ('1', '2', '3');",
//!     )
//!     .unwrap();
//!
//! let target = TableSchema::new().column("b").column("c").column("d");
//! let report = migrate_table(&mut db, "readings", &target).unwrap();
//! assert_eq!(report.common, vec!["b", "c"]);
//! assert_eq!(report.rows_copied, 1);
//! ```

use sqlkeeper_core::{MigrationPlan, TableSchema, validate_identifier, validate_schema};
use tracing::{debug, info};

use crate::catalog;
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{create_table_sql, quoted_column_list};

/// What a completed migration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Columns whose data survived.
    pub common: Vec<String>,
    /// Columns discarded with their data.
    pub dropped: Vec<String>,
    /// Columns created NULL.
    pub added: Vec<String>,
    /// Rows copied into the new table.
    pub rows_copied: usize,
}

/// Rebuilds `table` into the shape described by `target`, preserving the
/// data in columns common to both shapes.
///
/// The table is renamed to `<table>_old` for the duration of the copy; a
/// pre-existing table of that name is a hard conflict the caller must
/// resolve. The whole operation is one transaction: on any error the
/// original table is untouched.
///
/// # Errors
///
/// - [`DbError::TableNotFound`] — no such source table.
/// - [`DbError::NameCollision`] — `<table>_old` already exists.
/// - [`DbError::Schema`] — invalid target schema or identifiers.
/// - [`DbError::Sqlite`] — the engine rejected a statement (e.g. a
///   foreign key referencing a missing table); rolled back.
pub fn migrate_table(
    db: &mut Database,
    table: &str,
    target: &TableSchema,
) -> Result<MigrationReport> {
    validate_identifier(table)?;
    validate_schema(target)?;

    let tx = db.connection_mut().transaction()?;

    let old_columns = catalog::columns_on(&tx, table)?;
    let temp = format!("{table}_old");
    if catalog::exists_on(&tx, &temp)? {
        return Err(DbError::NameCollision(temp));
    }

    tx.execute(
        &format!("ALTER TABLE \"{table}\" RENAME TO \"{temp}\""),
        [],
    )?;
    tx.execute(&create_table_sql(table, target)?, [])?;

    let plan = MigrationPlan::between(&old_columns, &target.column_names());
    let rows_copied = if plan.nothing_survives() {
        debug!(table, "no common columns; data not carried over");
        0
    } else {
        let columns = quoted_column_list(&plan.common);
        tx.execute(
            &format!(
                "INSERT INTO \"{table}\" ({columns}) SELECT {columns} FROM \"{temp}\""
            ),
            [],
        )?
    };

    tx.execute(&format!("DROP TABLE \"{temp}\""), [])?;
    tx.commit()?;

    info!(
        table,
        copied = rows_copied,
        dropped = plan.dropped.len(),
        added = plan.added.len(),
        "table migrated"
    );

    Ok(MigrationReport {
        common: plan.common,
        dropped: plan.dropped,
        added: plan.added,
        rows_copied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlkeeper_core::ForeignKey;

    fn db_with_rows() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch(
                "CREATE TABLE t (a TEXT, b TEXT, c TEXT);
                 INSERT INTO t VALUES ('a1', 'b1', 'c1');
                 INSERT INTO t VALUES ('a2', 'b2', 'c2');",
            )
            .unwrap();
        db
    }

    #[test]
    fn test_missing_source_table() {
        let mut db = Database::open_in_memory().unwrap();
        let target = TableSchema::new().column("a");
        assert!(matches!(
            migrate_table(&mut db, "ghost", &target),
            Err(DbError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_temp_name_collision_is_fatal() {
        let mut db = db_with_rows();
        db.connection()
            .execute("CREATE TABLE t_old (x TEXT)", [])
            .unwrap();
        let target = TableSchema::new().column("a");
        assert!(matches!(
            migrate_table(&mut db, "t", &target),
            Err(DbError::NameCollision(name)) if name == "t_old"
        ));
    }

    #[test]
    fn test_added_columns_are_null() {
        let mut db = db_with_rows();
        let target = TableSchema::new().column("b").column("d");
        let report = migrate_table(&mut db, "t", &target).unwrap();
        assert_eq!(report.added, vec!["d"]);
        assert_eq!(report.rows_copied, 2);

        let nulls: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM t WHERE d IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 2);
    }

    #[test]
    fn test_disjoint_target_keeps_row_structure_empty() {
        let mut db = db_with_rows();
        let target = TableSchema::new().column("x").column("y");
        let report = migrate_table(&mut db, "t", &target).unwrap();
        assert_eq!(report.rows_copied, 0);

        let rows: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_failed_migration_rolls_back() {
        let mut db = db_with_rows();
        // FK references a table that does not exist; the data copy fails
        // under foreign_keys=ON and the transaction must roll back.
        let target = TableSchema::new()
            .column("b")
            .column("ghost_id")
            .with_foreign_key(ForeignKey::new("ghost_id"));
        assert!(migrate_table(&mut db, "t", &target).is_err());

        // Original table intact, temp name gone.
        assert_eq!(
            catalog::table_columns(&db, "t").unwrap(),
            vec!["a", "b", "c"]
        );
        assert!(!catalog::table_exists(&db, "t_old").unwrap());
        let rows: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 2);
    }
}
