//! Change-set computation for audit logging
//!
//! Determines which fields differ between a before and after snapshot, and
//! renders human-readable summaries of those differences.

use std::collections::BTreeSet;

use super::value::{FieldValue, Snapshot};

/// Set of field names that differ between two snapshots
pub type ChangeSet = BTreeSet<String>;

/// Compute the fields whose values differ between `old` and `new`
///
/// A field is included when it is present in `new` but absent from `old`,
/// present in both with unequal values, or present in `old` but absent
/// from `new`.
pub fn diff(old: &Snapshot, new: &Snapshot) -> ChangeSet {
    let mut changed = ChangeSet::new();

    for (field, new_value) in new {
        if old.get(field) != Some(new_value) {
            changed.insert(field.clone());
        }
    }

    // Removed fields
    for field in old.fields() {
        if !new.contains(field) {
            changed.insert(field.to_string());
        }
    }

    changed
}

/// Generate a human-readable diff between two snapshots
///
/// Returns `None` when nothing changed. Only top-level fields are reported.
pub fn summarize(old: &Snapshot, new: &Snapshot) -> Option<String> {
    let changes: Vec<String> = diff(old, new)
        .into_iter()
        .map(|field| match (old.get(&field), new.get(&field)) {
            (Some(before), Some(after)) => format!(
                "{}: {} -> {}",
                field,
                format_value(before),
                format_value(after)
            ),
            (Some(before), None) => format!("{}: {} -> (removed)", field, format_value(before)),
            (None, Some(after)) => format!("{}: (added) -> {}", field, format_value(after)),
            (None, None) => field,
        })
        .collect();

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Format a field value for human-readable display
fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "null".to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Float(n) => n.to_string(),
        FieldValue::Text(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        FieldValue::List(items) => format!("[{} items]", items.len()),
        FieldValue::Map(fields) => format!("{{{} fields}}", fields.len()),
    }
}
