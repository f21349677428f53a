//! Audit entry assembly for a single record
//!
//! Turns a before/after snapshot pair into a redacted, attributed
//! [`AuditEntry`].

use super::context::ActorContext;
use super::diff::diff;
use super::entry::{AuditEntry, AuditEvent};
use super::policy::RedactionPolicy;
use super::redact::{project, redact};
use super::value::Snapshot;

/// A mutation of one record as observed by a lifecycle hook
#[derive(Debug, Clone, PartialEq)]
pub struct RecordChange {
    pub event: AuditEvent,
    pub table: String,
    pub record_id: String,
    pub old: Option<Snapshot>,
    pub new: Option<Snapshot>,
}

impl RecordChange {
    pub fn created(table: impl Into<String>, record_id: impl Into<String>, new: Snapshot) -> Self {
        Self {
            event: AuditEvent::Created,
            table: table.into(),
            record_id: record_id.into(),
            old: None,
            new: Some(new),
        }
    }

    pub fn updated(
        table: impl Into<String>,
        record_id: impl Into<String>,
        old: Snapshot,
        new: Snapshot,
    ) -> Self {
        Self {
            event: AuditEvent::Updated,
            table: table.into(),
            record_id: record_id.into(),
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn deleted(table: impl Into<String>, record_id: impl Into<String>, old: Snapshot) -> Self {
        Self {
            event: AuditEvent::Deleted,
            table: table.into(),
            record_id: record_id.into(),
            old: Some(old),
            new: None,
        }
    }

    pub fn restored(table: impl Into<String>, record_id: impl Into<String>, new: Snapshot) -> Self {
        Self {
            event: AuditEvent::Restored,
            table: table.into(),
            record_id: record_id.into(),
            old: None,
            new: Some(new),
        }
    }
}

/// Apply dirty-field restriction to a snapshot pair
///
/// Only acts when `only_dirty` is set and both snapshots are present; an
/// empty change set yields two empty snapshots.
pub fn restrict_to_changes(
    old: Option<Snapshot>,
    new: Option<Snapshot>,
    only_dirty: bool,
) -> (Option<Snapshot>, Option<Snapshot>) {
    match (old, new) {
        (Some(old), Some(new)) if only_dirty => {
            let changed = diff(&old, &new);
            if changed.is_empty() {
                (Some(Snapshot::new()), Some(Snapshot::new()))
            } else {
                (Some(project(&old, &changed)), Some(project(&new, &changed)))
            }
        }
        pair => pair,
    }
}

/// Assemble the audit entry for one record mutation
pub fn assemble(
    change: RecordChange,
    policy: &RedactionPolicy,
    actor: Option<&ActorContext>,
) -> AuditEntry {
    let RecordChange {
        event,
        table,
        record_id,
        old,
        new,
    } = change;

    let (old, new) = match event {
        AuditEvent::Created | AuditEvent::Restored => (None, new),
        AuditEvent::Deleted => (old, None),
        AuditEvent::Updated => restrict_to_changes(old, new, policy.only_dirty),
    };

    let mut entry = AuditEntry::new(event, table, record_id);
    entry.old_values = old.map(|snapshot| redact(&snapshot, policy));
    entry.new_values = new.map(|snapshot| redact(&snapshot, policy));
    entry.attribute_to(actor);
    entry
}
