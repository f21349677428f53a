//! JSON export of the audit log

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{AuditorError, AuditorResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported audit log with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub entry_count: usize,

    pub entries: Vec<AuditEntry>,
}

impl AuditExport {
    pub fn new(entries: &[AuditEntry]) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            entry_count: entries.len(),
            entries: entries.to_vec(),
        }
    }
}

pub fn export_audit_json<W: Write>(
    entries: &[AuditEntry],
    writer: &mut W,
    pretty: bool,
) -> AuditorResult<()> {
    let export = AuditExport::new(entries);

    let result = if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    };
    result.map_err(|e| AuditorError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| AuditorError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEvent, Snapshot};

    #[test]
    fn test_export_parses_back() {
        let mut entry = AuditEntry::new(AuditEvent::Created, "users", "1");
        entry.new_values = Some(Snapshot::new().with("name", "John Doe"));

        let mut buffer = Vec::new();
        export_audit_json(&[entry.clone()], &mut buffer, false).unwrap();

        let parsed: AuditExport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.entry_count, 1);
        assert_eq!(parsed.entries, vec![entry]);
    }

    #[test]
    fn test_pretty_export_uses_camel_case_fields() {
        let entry = AuditEntry::new(AuditEvent::Deleted, "posts", "7");

        let mut buffer = Vec::new();
        export_audit_json(&[entry], &mut buffer, true).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("\"recordId\": \"7\""));
        assert!(text.contains("\"newValues\": null"));
    }
}
