//! Bulk operation expansion
//!
//! A bulk mutation produces one audit entry per affected record, each tagged
//! with the same bulk descriptor. A bulk mutation that matched nothing still
//! leaves a single trace under [`BULK_RECORD_ID`].

use super::assembler::{assemble, RecordChange};
use super::context::ActorContext;
use super::entry::{AuditEntry, AuditEvent};
use super::policy::RedactionPolicy;
use super::redact::redact;
use super::value::{FieldValue, Snapshot, Tags};

/// Record id used when a bulk operation affected no records
pub const BULK_RECORD_ID: &str = "bulk";

pub const TAG_BULK_OPERATION: &str = "bulkOperation";
pub const TAG_AFFECTED_COUNT: &str = "affectedCount";
pub const TAG_WHERE: &str = "where";

/// Before/after state of one record touched by a bulk operation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPair {
    pub record_id: String,
    pub old: Option<Snapshot>,
    pub new: Option<Snapshot>,
}

impl RecordPair {
    pub fn new(record_id: impl Into<String>, old: Option<Snapshot>, new: Option<Snapshot>) -> Self {
        Self {
            record_id: record_id.into(),
            old,
            new,
        }
    }
}

/// A single logical mutation over zero or more records
#[derive(Debug, Clone, PartialEq)]
pub struct BulkChange {
    pub event: AuditEvent,
    pub table: String,
    pub records: Vec<RecordPair>,
    /// Filter condition that selected the records, recorded verbatim
    pub condition: Option<FieldValue>,
    /// Attributes the operation applied (used for the empty fallback entry)
    pub attributes: Option<Snapshot>,
}

impl BulkChange {
    pub fn new(event: AuditEvent, table: impl Into<String>, records: Vec<RecordPair>) -> Self {
        Self {
            event,
            table: table.into(),
            records,
            condition: None,
            attributes: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<FieldValue>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Snapshot) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Descriptor tags shared by every entry of this operation
    fn descriptor(&self) -> Tags {
        let mut tags = Tags::new();
        tags.insert(TAG_BULK_OPERATION.to_string(), FieldValue::Bool(true));
        tags.insert(
            TAG_AFFECTED_COUNT.to_string(),
            FieldValue::from(self.records.len()),
        );
        if let Some(condition) = &self.condition {
            tags.insert(TAG_WHERE.to_string(), condition.clone());
        }
        tags
    }
}

/// Expand a bulk mutation into one audit entry per affected record
pub fn assemble_bulk(
    change: BulkChange,
    policy: &RedactionPolicy,
    actor: Option<&ActorContext>,
) -> Vec<AuditEntry> {
    let descriptor = change.descriptor();

    let mut entries = if change.records.is_empty() {
        let mut entry = AuditEntry::new(change.event, change.table.as_str(), BULK_RECORD_ID);
        if change.event != AuditEvent::Deleted {
            entry.new_values = change
                .attributes
                .as_ref()
                .map(|attributes| redact(attributes, policy));
        }
        entry.attribute_to(actor);
        vec![entry]
    } else {
        change
            .records
            .into_iter()
            .map(|pair| {
                let record = RecordChange {
                    event: change.event,
                    table: change.table.clone(),
                    record_id: pair.record_id,
                    old: pair.old,
                    new: pair.new,
                };
                assemble(record, policy, actor)
            })
            .collect()
    };

    for entry in &mut entries {
        // Caller tags already on the entry take precedence over the descriptor
        let caller_tags = std::mem::replace(&mut entry.tags, descriptor.clone());
        entry.tags.extend(caller_tags);
    }

    entries
}
