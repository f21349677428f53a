//! Audit log export
//!
//! Writes audit entries in one of three formats:
//! - CSV: one row per entry, payload columns as compact JSON
//! - JSON: full entries with export metadata
//! - YAML: same document as JSON, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_audit_csv;
pub use json::{export_audit_json, AuditExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_audit_yaml;

use std::io::Write;

use clap::ValueEnum;

use crate::audit::AuditEntry;
use crate::error::AuditorResult;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per entry
    Csv,
    /// JSON document with metadata
    Json,
    /// YAML document with metadata
    Yaml,
}

/// Write `entries` to `writer` in `format`
pub fn export_entries<W: Write>(
    entries: &[AuditEntry],
    format: ExportFormat,
    writer: &mut W,
) -> AuditorResult<()> {
    match format {
        ExportFormat::Csv => export_audit_csv(entries, writer),
        ExportFormat::Json => export_audit_json(entries, writer, true),
        ExportFormat::Yaml => export_audit_yaml(entries, writer),
    }
}
