//! Audit log CLI commands

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::audit::{AuditEntry, AuditEvent, AuditFilter, Auditor};
use crate::display::audit::{format_audit_details, format_audit_list};
use crate::error::{AuditorError, AuditorResult};
use crate::export::{export_entries, ExportFormat};
use crate::models::{PostId, UserId};

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// List audit entries, oldest first
    List {
        /// Only entries for this table
        #[arg(short, long)]
        table: Option<String>,
        /// Only entries for this record (full or short ID)
        #[arg(short, long)]
        record: Option<String>,
        /// Only entries with this event (created, updated, deleted, restored)
        #[arg(short, long)]
        event: Option<AuditEvent>,
        /// Only entries recorded for this actor
        #[arg(long = "by-actor")]
        by_actor: Option<String>,
        /// Show only the most recent N entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a single audit entry
    Show {
        /// Audit entry ID (full or short)
        id: String,
    },
    /// Export the audit log
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        table: Option<String>,
    },
}

/// Whether `record_id` is identified by `identifier` (full id, short id, or
/// a prefix of the full id)
fn record_matches(record_id: &str, identifier: &str) -> bool {
    let bare = identifier
        .strip_prefix(UserId::PREFIX)
        .or_else(|| identifier.strip_prefix(PostId::PREFIX))
        .unwrap_or(identifier);
    !bare.is_empty() && record_id.starts_with(bare)
}

fn find_entry<'e>(entries: &'e [AuditEntry], identifier: &str) -> AuditorResult<&'e AuditEntry> {
    let matches: Vec<_> = entries
        .iter()
        .filter(|e| e.id.to_string() == identifier || e.id.matches_short(identifier))
        .collect();

    match matches.as_slice() {
        [entry] => Ok(entry),
        [] => Err(AuditorError::audit_entry_not_found(identifier)),
        _ => Err(AuditorError::ambiguous_id(
            "audit entry",
            identifier,
            matches.len(),
        )),
    }
}

/// Handle an audit command
pub async fn handle_audit_command(auditor: &Auditor, cmd: AuditCommands) -> AuditorResult<()> {
    match cmd {
        AuditCommands::List {
            table,
            record,
            event,
            by_actor,
            limit,
        } => {
            let mut filter = AuditFilter::new();
            filter.table = table;
            filter.event = event;
            filter.actor_id = by_actor;

            let mut entries = auditor.store().query(&filter).await?;
            if let Some(record) = &record {
                entries.retain(|e| record_matches(&e.record_id, record));
            }
            if let Some(limit) = limit {
                let start = entries.len().saturating_sub(limit);
                entries.drain(..start);
            }

            print!("{}", format_audit_list(&entries));
        }

        AuditCommands::Show { id } => {
            let entries = auditor.store().query(&AuditFilter::new()).await?;
            let entry = find_entry(&entries, &id)?;
            print!("{}", format_audit_details(entry));
        }

        AuditCommands::Export {
            format,
            output,
            table,
        } => {
            let mut filter = AuditFilter::new();
            filter.table = table;
            let entries = auditor.store().query(&filter).await?;

            match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|e| {
                        AuditorError::Export(format!(
                            "Failed to create {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let mut writer = BufWriter::new(file);
                    export_entries(&entries, format, &mut writer)?;
                    writer
                        .flush()
                        .map_err(|e| AuditorError::Export(format!("Failed to flush output: {}", e)))?;
                    println!("Exported {} audit entries to {}", entries.len(), path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    export_entries(&entries, format, &mut writer)?;
                }
            }
        }
    }

    Ok(())
}
