//! Audit entry data structures
//!
//! Defines the audit event kinds and the persisted entry format.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::ActorContext;
use super::value::{Snapshot, Tags};
use crate::models::AuditId;

/// Kinds of record mutation that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEvent {
    /// Record was created
    Created,
    /// Record was updated
    Updated,
    /// Record was deleted
    Deleted,
    /// Soft-deleted record was restored
    Restored,
}

impl AuditEvent {
    pub const ALL: [AuditEvent; 4] = [
        AuditEvent::Created,
        AuditEvent::Updated,
        AuditEvent::Deleted,
        AuditEvent::Restored,
    ];

    /// Parse an event name (case-insensitive, accepts `create`/`created` forms)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "create" | "created" => Some(AuditEvent::Created),
            "update" | "updated" => Some(AuditEvent::Updated),
            "delete" | "deleted" => Some(AuditEvent::Deleted),
            "restore" | "restored" => Some(AuditEvent::Restored),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::Created => "created",
            AuditEvent::Updated => "updated",
            AuditEvent::Deleted => "deleted",
            AuditEvent::Restored => "restored",
        }
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditEvent::Created => write!(f, "CREATED"),
            AuditEvent::Updated => write!(f, "UPDATED"),
            AuditEvent::Deleted => write!(f, "DELETED"),
            AuditEvent::Restored => write!(f, "RESTORED"),
        }
    }
}

impl FromStr for AuditEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "Invalid audit event: '{}'. Valid events: created, updated, deleted, restored",
                s
            )
        })
    }
}

/// A single audit log entry
///
/// Describes one mutation of one record. `old_values` is absent for creates
/// and restores; `new_values` is serialized as `null` for deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique entry identifier
    pub id: AuditId,

    /// Kind of mutation
    pub event: AuditEvent,

    /// Table (record type) the mutation applied to
    pub table: String,

    /// Identifier of the affected record, or the bulk sentinel
    pub record_id: String,

    /// Redacted state before the mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_values: Option<Snapshot>,

    /// Redacted state after the mutation
    #[serde(default)]
    pub new_values: Option<Snapshot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    /// When the entry was assembled (UTC)
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// A fresh entry with no payload and no actor
    pub fn new(event: AuditEvent, table: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            id: AuditId::new(),
            event,
            table: table.into(),
            record_id: record_id.into(),
            old_values: None,
            new_values: None,
            actor_id: None,
            actor_type: None,
            ip: None,
            user_agent: None,
            url: None,
            tags: Tags::new(),
            created_at: Utc::now(),
        }
    }

    /// Copy actor fields and tags from `actor`; `None` leaves them unset
    pub fn attribute_to(&mut self, actor: Option<&ActorContext>) {
        let Some(actor) = actor else {
            return;
        };
        self.actor_id = actor.actor_id.clone();
        self.actor_type = actor.actor_type.clone();
        self.ip = actor.ip.clone();
        self.user_agent = actor.user_agent.clone();
        self.url = actor.url.clone();
        self.tags.extend(actor.tags.clone());
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event,
            self.table,
            self.record_id
        );

        if let Some(actor) = &self.actor_id {
            match &self.actor_type {
                Some(kind) => output.push_str(&format!(" by {}:{}", kind, actor)),
                None => output.push_str(&format!(" by {}", actor)),
            }
        }

        if let (Some(old), Some(new)) = (&self.old_values, &self.new_values) {
            if let Some(diff) = super::diff::summarize(old, new) {
                output.push_str(&format!("\n  Changes: {}", diff));
            }
        }

        output
    }
}
