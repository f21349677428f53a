//! YAML export of the audit log

use std::io::Write;

use crate::audit::AuditEntry;
use crate::error::{AuditorError, AuditorResult};
use crate::export::json::AuditExport;

pub fn export_audit_yaml<W: Write>(entries: &[AuditEntry], writer: &mut W) -> AuditorResult<()> {
    let export = AuditExport::new(entries);

    let header = format!(
        "# auditor audit log export\n# Generated: {}\n# App Version: {}\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| AuditorError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AuditorError::Export(e.to_string()))
}
