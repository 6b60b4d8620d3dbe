//! Identifier handling and schema validation.
//!
//! SQL identifiers (table and column names) are restricted to alphanumerics
//! and underscores, with a leading letter or underscore.
//! [`sanitize_identifier`] coerces arbitrary input into that form the way
//! imports do; [`validate_identifier`] rejects it instead, for callers that
//! must not alter names. [`validate_schema`] checks the structural
//! invariants of a [`TableSchema`] before any SQL is generated from it.
//!
//! # Examples
//!
//! ```
//! use sqlkeeper_core::{sanitize_identifier, validate_identifier};
//!
//! assert_eq!(sanitize_identifier("sales report (Q3)").unwrap(), "sales_report__Q3_");
//! assert_eq!(sanitize_identifier("2024_data").unwrap(), "_2024_data");
//! assert!(validate_identifier("sales_2024").is_ok());
//! assert!(validate_identifier("drop;--").is_err());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::TableSchema;

/// Structural schema and identifier errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Name is empty or contains characters outside `[A-Za-z0-9_]`, or
    /// starts with a digit.
    #[error("invalid identifier '{0}': must be alphanumerics/underscores and not start with a digit")]
    InvalidIdentifier(String),
    /// Schema declares no columns.
    #[error("table schema must declare at least one column")]
    EmptySchema,
    /// Two columns share a name.
    #[error("duplicate column in schema: {0}")]
    DuplicateColumn(String),
    /// The foreign-key column is not in the column list.
    #[error("foreign key column not present in schema: {0}")]
    UnknownForeignKeyColumn(String),
    /// Parallel column/type sequences have different lengths.
    #[error("expected {expected} column types, got {got}")]
    ColumnTypeCountMismatch {
        /// Number of columns declared.
        expected: usize,
        /// Number of types supplied.
        got: usize,
    },
    /// Input document shape the tabular importer cannot flatten.
    #[error("unsupported input shape: {0}")]
    UnsupportedShape(String),
}

/// Coerces arbitrary text into a legal SQL identifier.
///
/// Every character outside `[A-Za-z0-9_]` becomes an underscore, and a
/// leading digit gets an underscore prefix. Empty input (or input that
/// sanitizes to nothing) is an error rather than a silent rename.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidIdentifier`] for empty input.
pub fn sanitize_identifier(raw: &str) -> Result<String, SchemaError> {
    if raw.is_empty() {
        return Err(SchemaError::InvalidIdentifier(raw.to_string()));
    }
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    Ok(out)
}

/// Checks that a name is already a legal SQL identifier.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidIdentifier`] if the name is empty,
/// contains characters outside `[A-Za-z0-9_]`, or starts with a digit.
pub fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    let legal = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if legal {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

/// Validates the structural invariants of a table schema.
///
/// Checks that at least one column is declared, every column name is a
/// legal identifier, no two columns share a name, and the foreign-key
/// column (if any) exists in the column list.
///
/// # Examples
///
/// ```
/// use sqlkeeper_core::{ForeignKey, SchemaError, TableSchema, validate_schema};
///
/// let ok = TableSchema::new().column("id").column("name");
/// assert!(validate_schema(&ok).is_ok());
///
/// let bad = TableSchema::new().column("id").with_foreign_key(ForeignKey::new("owner_id"));
/// assert!(matches!(
///     validate_schema(&bad),
///     Err(SchemaError::UnknownForeignKeyColumn(_))
/// ));
/// ```
pub fn validate_schema(schema: &TableSchema) -> Result<(), SchemaError> {
    if schema.columns.is_empty() {
        return Err(SchemaError::EmptySchema);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for column in &schema.columns {
        validate_identifier(&column.name)?;
        if !seen.insert(column.name.as_str()) {
            return Err(SchemaError::DuplicateColumn(column.name.clone()));
        }
    }

    if let Some(fk) = &schema.foreign_key {
        if !seen.contains(fk.column.as_str()) {
            return Err(SchemaError::UnknownForeignKeyColumn(fk.column.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_symbols() {
        assert_eq!(sanitize_identifier("a-b c.d").unwrap(), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_leading_digit() {
        assert_eq!(sanitize_identifier("2cols").unwrap(), "_2cols");
    }

    #[test]
    fn test_sanitize_empty_is_error() {
        assert!(sanitize_identifier("").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_injection() {
        assert!(validate_identifier("t; DROP TABLE x").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
    }

    #[test]
    fn test_validate_schema_duplicate_column() {
        let schema = TableSchema::new().column("a").column("a");
        assert_eq!(
            validate_schema(&schema),
            Err(SchemaError::DuplicateColumn("a".to_string()))
        );
    }

    #[test]
    fn test_validate_schema_empty() {
        assert_eq!(validate_schema(&TableSchema::new()), Err(SchemaError::EmptySchema));
    }

    #[test]
    fn test_validate_schema_fk_must_exist() {
        let schema = TableSchema::new()
            .column("a")
            .with_foreign_key(crate::ForeignKey::new("b"));
        assert_eq!(
            validate_schema(&schema),
            Err(SchemaError::UnknownForeignKeyColumn("b".to_string()))
        );
    }
}
