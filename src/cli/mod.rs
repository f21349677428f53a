//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod post;
pub mod user;

pub use audit::{handle_audit_command, AuditCommands};
pub use post::{handle_post_command, PostCommands};
pub use user::{handle_user_command, UserCommands};

use crate::audit::{FieldValue, Snapshot};

/// Parse a `field=value` argument; the value is read as a literal
/// (`true`, `42`, `null`, JSON, or plain text)
pub fn parse_assignment(raw: &str) -> Result<(String, FieldValue), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }

    Ok((field.to_string(), FieldValue::parse_literal(value)))
}

/// Collect parsed assignments into a snapshot (later duplicates win)
pub fn assignments_to_snapshot(assignments: Vec<(String, FieldValue)>) -> Snapshot {
    assignments.into_iter().collect()
}
