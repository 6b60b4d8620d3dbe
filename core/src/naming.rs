//! Foreign-key target naming heuristic.
//!
//! When a foreign key does not name its referenced table explicitly, the
//! target is guessed from the column name: a trailing `_id`/`id` suffix is
//! stripped and the remainder pluralized (`author_id` → `authors`,
//! `category_id` → `categories`). This is a naming convention guess, not a
//! catalog lookup — callers with real knowledge set
//! [`ForeignKey::references`](crate::ForeignKey) instead.

/// Derives the referenced table name for a foreign-key column.
///
/// # Examples
///
/// ```
/// use sqlkeeper_core::referenced_table;
///
/// assert_eq!(referenced_table("author_id"), "authors");
/// assert_eq!(referenced_table("category_id"), "categories");
/// assert_eq!(referenced_table("owner"), "owners");
/// assert_eq!(referenced_table("tags"), "tags");
/// ```
pub fn referenced_table(column: &str) -> String {
    let stem = column
        .strip_suffix("_id")
        .or_else(|| column.strip_suffix("_ID"))
        .unwrap_or(column);
    pluralize(stem)
}

fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return word.to_string();
    }
    if word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        // Vowel + y pluralizes regularly (day -> days).
        let vowel_before = stem
            .chars()
            .last()
            .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
        if !vowel_before {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}
