//! CSV export of the audit log
//!
//! Snapshot and tag columns hold compact JSON; absent values are empty cells.

use std::io::Write;

use crate::audit::{AuditEntry, Snapshot};
use crate::error::{AuditorError, AuditorResult};

const HEADER: [&str; 13] = [
    "id",
    "created_at",
    "event",
    "table",
    "record_id",
    "actor_id",
    "actor_type",
    "ip",
    "user_agent",
    "url",
    "old_values",
    "new_values",
    "tags",
];

fn snapshot_cell(values: Option<&Snapshot>) -> AuditorResult<String> {
    match values {
        Some(snapshot) => serde_json::to_string(snapshot).map_err(|e| AuditorError::Export(e.to_string())),
        None => Ok(String::new()),
    }
}

pub fn export_audit_csv<W: Write>(entries: &[AuditEntry], writer: &mut W) -> AuditorResult<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    csv.write_record(HEADER)
        .map_err(|e| AuditorError::Export(e.to_string()))?;

    for entry in entries {
        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&entry.tags).map_err(|e| AuditorError::Export(e.to_string()))?
        };

        csv.write_record([
            entry.id.as_uuid().to_string(),
            entry.created_at.to_rfc3339(),
            entry.event.as_str().to_string(),
            entry.table.clone(),
            entry.record_id.clone(),
            entry.actor_id.clone().unwrap_or_default(),
            entry.actor_type.clone().unwrap_or_default(),
            entry.ip.clone().unwrap_or_default(),
            entry.user_agent.clone().unwrap_or_default(),
            entry.url.clone().unwrap_or_default(),
            snapshot_cell(entry.old_values.as_ref())?,
            snapshot_cell(entry.new_values.as_ref())?,
            tags,
        ])
        .map_err(|e| AuditorError::Export(e.to_string()))?;
    }

    csv.flush().map_err(|e| AuditorError::Export(e.to_string()))
}
