//! Table schema type definitions.
//!
//! This module defines the storage-independent data model for describing
//! SQLite tables: column declarations, an optional foreign-key constraint,
//! and the [`TableSchema`] that the SQL generator and schema migrator
//! consume. The types serialize with [`serde`] so schemas can round-trip
//! through JSON config and tooling.

use serde::{Deserialize, Serialize};

/// Declared SQLite type of a column.
///
/// Columns with no declared type default to [`ColumnType::Text`], matching
/// how untyped imports are stored. [`ColumnType::Other`] carries a verbatim
/// declaration (e.g. `INTEGER PRIMARY KEY`) for callers that need more than
/// a plain storage class.
///
/// # Examples
///
/// ```
/// use sqlkeeper_core::ColumnType;
///
/// assert_eq!(ColumnType::default(), ColumnType::Text);
/// assert_eq!(ColumnType::Integer.sql_decl(), "INTEGER");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColumnType {
    /// Text storage class (the default).
    #[default]
    Text,
    /// Integer storage class.
    Integer,
    /// Floating-point storage class.
    Real,
    /// Binary blob storage class.
    Blob,
    /// A verbatim type declaration passed through unchanged.
    Other(String),
}

impl ColumnType {
    /// Returns the SQL text used in a `CREATE TABLE` column declaration.
    pub fn sql_decl(&self) -> &str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Blob => "BLOB",
            ColumnType::Other(decl) => decl,
        }
    }

    /// Parses a type declaration, mapping the plain storage classes to
    /// their variants and anything else to [`ColumnType::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "TEXT" => ColumnType::Text,
            "INTEGER" | "INT" => ColumnType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" => ColumnType::Real,
            "BLOB" => ColumnType::Blob,
            _ => ColumnType::Other(raw.trim().to_string()),
        }
    }
}

/// A single column declaration: name plus declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name (validated/sanitized by the consumer).
    pub name: String,
    /// Declared type.
    pub ty: ColumnType,
}

impl ColumnDef {
    /// Creates a column with the default [`ColumnType::Text`] type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ColumnType::Text,
        }
    }

    /// Creates a column with an explicit type.
    pub fn typed(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A foreign-key declaration on a table schema.
///
/// When `references` is `None` the target table name is derived from the
/// column name by the pluralization heuristic in
/// [`referenced_table`](crate::referenced_table) — a guess, not a resolver.
/// Callers that know the real target supply it via
/// [`ForeignKey::to_table`].
///
/// # Examples
///
/// ```
/// use sqlkeeper_core::ForeignKey;
///
/// let guessed = ForeignKey::new("author_id");
/// assert_eq!(guessed.target_table(), "authors");
///
/// let exact = ForeignKey::new("author_id").to_table("people");
/// assert_eq!(exact.target_table(), "people");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column; must exist in the schema's column list.
    pub column: String,
    /// Exact referenced table, or `None` to use the naming heuristic.
    pub references: Option<String>,
}

impl ForeignKey {
    /// Creates a foreign key whose target table will be guessed from the
    /// column name.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            references: None,
        }
    }

    /// Sets the exact referenced table, bypassing the naming heuristic.
    pub fn to_table(mut self, table: impl Into<String>) -> Self {
        self.references = Some(table.into());
        self
    }

    /// Resolves the referenced table name: the explicit target if set,
    /// otherwise the pluralization heuristic applied to the column name.
    pub fn target_table(&self) -> String {
        match &self.references {
            Some(table) => table.clone(),
            None => crate::referenced_table(&self.column),
        }
    }
}

/// Desired shape of a table: ordered columns and an optional foreign key.
///
/// Column order is significant — it becomes the `CREATE TABLE` column
/// order. Structural invariants (unique names, foreign-key column present)
/// are checked by [`validate_schema`](crate::validate_schema).
///
/// # Examples
///
/// ```
/// use sqlkeeper_core::{ColumnType, ForeignKey, TableSchema};
///
/// let schema = TableSchema::new()
///     .typed_column("id", ColumnType::Other("INTEGER PRIMARY KEY".into()))
///     .column("title")
///     .column("author_id")
///     .with_foreign_key(ForeignKey::new("author_id"));
///
/// assert_eq!(schema.column_names(), vec!["id", "title", "author_id"]);
/// assert!(sqlkeeper_core::validate_schema(&schema).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSchema {
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Optional foreign-key constraint.
    pub foreign_key: Option<ForeignKey>,
}

impl TableSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnDef::new(name));
        self
    }

    /// Appends a typed column.
    pub fn typed_column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(ColumnDef::typed(name, ty));
        self
    }

    /// Sets the foreign-key constraint.
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_key = Some(fk);
        self
    }

    /// Builds a schema from parallel name/type sequences.
    ///
    /// When `types` is `None` every column gets the default text type.
    /// The sequences must have equal length.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ColumnTypeCountMismatch`] when a types
    /// sequence is given and its length differs from the column count.
    ///
    /// [`SchemaError::ColumnTypeCountMismatch`]: crate::SchemaError::ColumnTypeCountMismatch
    pub fn from_parts(
        columns: &[String],
        types: Option<&[ColumnType]>,
    ) -> Result<Self, crate::SchemaError> {
        if let Some(types) = types {
            if types.len() != columns.len() {
                return Err(crate::SchemaError::ColumnTypeCountMismatch {
                    expected: columns.len(),
                    got: types.len(),
                });
            }
        }
        let columns = columns
            .iter()
            .enumerate()
            .map(|(i, name)| ColumnDef {
                name: name.clone(),
                ty: types.map(|t| t[i].clone()).unwrap_or_default(),
            })
            .collect();
        Ok(Self {
            columns,
            foreign_key: None,
        })
    }

    /// Returns the column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
