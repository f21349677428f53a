//! Audit trail for record mutations
//!
//! Every create, update, delete or restore of an auditable record becomes an
//! [`AuditEntry`] holding redacted before/after values and the actor that
//! triggered it.
//!
//! # Architecture
//!
//! - `diff`, `redact`: pure functions computing the change set and applying
//!   exclusion/masking to snapshots.
//! - `assembler`, `bulk`: build entries for single-record and bulk mutations.
//! - `context`: the task-scoped [`ActorContext`].
//! - `policy`: global and per-table [`AuditPolicy`] resolution.
//! - `store`: the [`AuditStore`] trait with JSONL and in-memory backends.
//! - `auditor`: the [`Auditor`] facade that lifecycle hooks call.
//!
//! # Example
//!
//! ```rust,ignore
//! use auditor::audit::{ActorContext, Auditor, RecordChange};
//!
//! let auditor = Auditor::new(store, settings.policy_registry());
//! ActorContext::new("admin-123")
//!     .scope(async {
//!         auditor.record(RecordChange::created("users", "1", snapshot));
//!     })
//!     .await;
//! auditor.flush().await;
//! ```

mod assembler;
mod auditable;
mod auditor;
mod bulk;
mod context;
mod diff;
mod entry;
mod policy;
mod redact;
mod store;
mod value;

pub use assembler::{assemble, restrict_to_changes, RecordChange};
pub use auditable::Auditable;
pub use auditor::{Auditor, Creator};
pub use bulk::{
    assemble_bulk, BulkChange, RecordPair, BULK_RECORD_ID, TAG_AFFECTED_COUNT,
    TAG_BULK_OPERATION, TAG_WHERE,
};
pub use context::ActorContext;
pub use diff::{diff, summarize, ChangeSet};
pub use entry::{AuditEntry, AuditEvent};
pub use policy::{AuditPolicy, CreatorPolicy, PolicyOverride, PolicyRegistry, RedactionPolicy};
pub use redact::{project, redact, MASK_SENTINEL};
pub use store::{AuditFilter, AuditStore, JsonlAuditStore, MemoryAuditStore};
pub use value::{FieldValue, Snapshot, Tags};
