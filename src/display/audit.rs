//! Audit entry display formatting

use crate::audit::{AuditEntry, Snapshot};

use super::{column_width, short_id};

/// Format audit entries as a table, oldest first
pub fn format_audit_list(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.".to_string();
    }

    let table_width = column_width(entries.iter().map(|e| e.table.as_str()), 5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<19}  {:<8}  {:<table_width$}  {:<8}  {}\n",
        "ID", "Time", "Event", "Table", "Record", "Actor",
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<19}  {:-<8}  {:-<table_width$}  {:-<8}  {:-<10}\n",
        "", "", "", "", "", "",
    ));

    for entry in entries {
        output.push_str(&format!(
            "{:<12}  {:<19}  {:<8}  {:<table_width$}  {:<8}  {}\n",
            entry.id.to_string(),
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.event.as_str(),
            entry.table,
            short_id(&entry.record_id),
            entry.actor_id.as_deref().unwrap_or("-"),
        ));
    }

    output
}

fn push_snapshot(output: &mut String, label: &str, values: Option<&Snapshot>) {
    match values {
        None => output.push_str(&format!("  {}: null\n", label)),
        Some(snapshot) if snapshot.is_empty() => output.push_str(&format!("  {}: {{}}\n", label)),
        Some(snapshot) => {
            output.push_str(&format!("  {}:\n", label));
            for (field, value) in snapshot {
                output.push_str(&format!("    {}: {}\n", field, value));
            }
        }
    }
}

/// Format a single entry with its payload and tags
pub fn format_audit_details(entry: &AuditEntry) -> String {
    let mut output = String::new();

    output.push_str(&format!("Audit entry: {}\n", entry.id));
    output.push_str(&format!("  Event:      {}\n", entry.event));
    output.push_str(&format!("  Table:      {}\n", entry.table));
    output.push_str(&format!("  Record:     {}\n", entry.record_id));
    output.push_str(&format!(
        "  Time:       {}\n",
        entry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let optional = [
        ("Actor", &entry.actor_id),
        ("Actor type", &entry.actor_type),
        ("IP", &entry.ip),
        ("User agent", &entry.user_agent),
        ("URL", &entry.url),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            output.push_str(&format!("  {:<11} {}\n", format!("{}:", label), value));
        }
    }

    output.push('\n');
    push_snapshot(&mut output, "Old values", entry.old_values.as_ref());
    push_snapshot(&mut output, "New values", entry.new_values.as_ref());

    if !entry.tags.is_empty() {
        output.push_str("  Tags:\n");
        for (key, value) in &entry.tags {
            output.push_str(&format!("    {}: {}\n", key, value));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEvent, FieldValue};

    fn deleted_entry() -> AuditEntry {
        let mut entry = AuditEntry::new(
            AuditEvent::Deleted,
            "users",
            "550e8400-e29b-41d4-a716-446655440000",
        );
        entry.old_values = Some(Snapshot::new().with("name", "Inactive User"));
        entry.actor_id = Some("system-cleanup-job".into());
        entry.tags.insert("affectedCount".into(), FieldValue::Integer(2));
        entry
    }

    #[test]
    fn test_format_audit_list() {
        let output = format_audit_list(&[deleted_entry()]);
        assert!(output.contains("deleted"));
        assert!(output.contains("550e8400"));
        assert!(!output.contains("550e8400-e29b"));
        assert!(output.contains("system-cleanup-job"));
    }

    #[test]
    fn test_format_audit_details() {
        let output = format_audit_details(&deleted_entry());
        assert!(output.contains("DELETED"));
        assert!(output.contains("name: Inactive User"));
        assert!(output.contains("New values: null"));
        assert!(output.contains("affectedCount: 2"));
        assert!(!output.contains("IP:"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_audit_list(&[]), "No audit entries found.");
    }
}
