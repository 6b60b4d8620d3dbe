//! Migration planning via column-set comparison.
//!
//! A copy-and-recreate migration survives only the columns present in both
//! the old and new shape of a table. [`MigrationPlan::between`] computes
//! that common set together with what gets dropped and what gets created
//! empty. The comparison is pure set arithmetic: ordering and duplicate
//! information from the old schema is not preserved, which is the intended
//! policy — the new schema alone dictates column order.
//!
//! # Example
//!
//! ```
//! use sqlkeeper_core::MigrationPlan;
//!
//! let plan = MigrationPlan::between(
//!     &["a".into(), "b".into(), "c".into()],
//!     &["b".into(), "c".into(), "d".into()],
//! );
//! assert_eq!(plan.common, vec!["b", "c"]);
//! assert_eq!(plan.dropped, vec!["a"]);
//! assert_eq!(plan.added, vec!["d"]);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Outcome of comparing an old column set against a new one.
///
/// `common` columns are copied verbatim during migration, `dropped`
/// columns disappear with their data, and `added` columns are created
/// empty (NULL). All three lists are sorted; they carry no old-schema
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Columns present in both schemas (data survives).
    pub common: Vec<String>,
    /// Columns only in the old schema (data is discarded).
    pub dropped: Vec<String>,
    /// Columns only in the new schema (created NULL).
    pub added: Vec<String>,
}

impl MigrationPlan {
    /// Computes the plan from old and new column name sequences.
    ///
    /// Duplicates within either input collapse; the result is a pure set
    /// comparison.
    pub fn between(old: &[String], new: &[String]) -> Self {
        let old: BTreeSet<&str> = old.iter().map(String::as_str).collect();
        let new: BTreeSet<&str> = new.iter().map(String::as_str).collect();

        Self {
            common: old.intersection(&new).map(|s| s.to_string()).collect(),
            dropped: old.difference(&new).map(|s| s.to_string()).collect(),
            added: new.difference(&old).map(|s| s.to_string()).collect(),
        }
    }

    /// True when no data would survive the migration.
    pub fn nothing_survives(&self) -> bool {
        self.common.is_empty()
    }
}
