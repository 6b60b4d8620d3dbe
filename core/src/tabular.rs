//! The tabular data shape produced by importers.
//!
//! File parsing itself (CSV, spreadsheets) is a collaborator concern; the
//! store layer only consumes [`TabularData`] — ordered column names plus
//! rows of [`CellValue`]s. JSON documents are the one format adapted here,
//! since structured records need flattening before they fit a table:
//! [`TabularData::from_json_records`] turns an array of objects into rows,
//! flattening nested objects to dot-joined column names and joining arrays
//! into comma-separated text.
//!
//! # Example
//!
//! ```
//! use sqlkeeper_core::{CellValue, TabularData};
//!
//! let doc = serde_json::json!([
//!     {"name": "ada", "meta": {"age": 36}},
//!     {"name": "grace", "tags": ["navy", "cobol"]},
//! ]);
//! let data = TabularData::from_json_records(&doc).unwrap();
//! assert_eq!(data.columns, vec!["meta.age", "name", "tags"]);
//! assert_eq!(data.rows[0][1], CellValue::Text("ada".into()));
//! assert_eq!(data.rows[1][2], CellValue::Text("navy, cobol".into()));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SchemaError;

/// A single cell of imported data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Missing/NULL.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Real(f64),
    /// Text value.
    Text(String),
}

impl CellValue {
    /// True for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Column names plus rows — the contract between importers and the store.
///
/// Every row has exactly `columns.len()` cells, positionally matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TabularData {
    /// Column names in output order.
    pub columns: Vec<String>,
    /// Row values, positionally matching `columns`.
    pub rows: Vec<Vec<CellValue>>,
}

impl TabularData {
    /// Creates an empty data set with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Flattens a JSON document into tabular form.
    ///
    /// Accepts an array of objects or a single object (treated as one
    /// record). Nested objects flatten to dot-joined column names
    /// (`{"meta": {"age": 1}}` → column `meta.age`); arrays join their
    /// elements into `", "`-separated text; booleans store as 0/1. The
    /// column list is the union of keys across records in first-seen
    /// order, and keys absent from a record yield [`CellValue::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedShape`] for scalar documents or
    /// arrays containing non-objects, and for documents that flatten to
    /// zero columns.
    pub fn from_json_records(doc: &Value) -> Result<Self, SchemaError> {
        let records: Vec<&Value> = match doc {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![doc],
            _ => {
                return Err(SchemaError::UnsupportedShape(
                    "expected a JSON object or array of objects".to_string(),
                ));
            }
        };

        let mut columns: Vec<String> = Vec::new();
        let mut flattened: Vec<BTreeMap<String, CellValue>> = Vec::with_capacity(records.len());

        for record in records {
            let Value::Object(_) = record else {
                return Err(SchemaError::UnsupportedShape(
                    "array elements must be JSON objects".to_string(),
                ));
            };
            let mut cells = BTreeMap::new();
            flatten_value("", record, &mut cells);
            for key in cells.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            flattened.push(cells);
        }

        if columns.is_empty() {
            return Err(SchemaError::UnsupportedShape(
                "document flattens to zero columns".to_string(),
            ));
        }

        let rows = flattened
            .into_iter()
            .map(|mut cells| {
                columns
                    .iter()
                    .map(|col| cells.remove(col).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }
}

fn flatten_value(prefix: &str, value: &Value, out: &mut BTreeMap<String, CellValue>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_value(&path, nested, out);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ");
            out.insert(prefix.to_string(), CellValue::Text(joined));
        }
        scalar => {
            out.insert(prefix.to_string(), scalar_cell(scalar));
        }
    }
}

fn scalar_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else {
                CellValue::Real(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => CellValue::Text(s.clone()),
        // Unreachable for scalars; kept total for the compiler.
        other => CellValue::Text(other.to_string()),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
