//! Display formatting for terminal output
//!
//! Formats records and audit entries as plain-text tables and detail views.

pub mod audit;
pub mod post;
pub mod user;

pub use audit::{format_audit_details, format_audit_list};
pub use post::{format_creator, format_post_details, format_post_list};
pub use user::{format_user_details, format_user_list};

/// Shorten long identifiers (UUIDs) for table columns
pub(crate) fn short_id(id: &str) -> &str {
    if id.len() > 12 {
        id.get(..8).unwrap_or(id)
    } else {
        id
    }
}

/// Width of the widest value in a column, at least `min`
pub(crate) fn column_width<'a>(values: impl Iterator<Item = &'a str>, min: usize) -> usize {
    values.map(str::len).max().unwrap_or(min).max(min)
}
