//! Audit dispatch service
//!
//! The [`Auditor`] is what lifecycle hooks call. It resolves the effective
//! policy for the table, assembles entries against the current actor
//! context, and queues them for a single background writer task. The writer
//! persists entries in the order they were queued. Persistence failures are
//! logged and never reach the caller.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::error::AuditorResult;

use super::assembler::{assemble, RecordChange};
use super::bulk::{assemble_bulk, BulkChange};
use super::context::ActorContext;
use super::entry::{AuditEntry, AuditEvent};
use super::policy::{CreatorPolicy, PolicyRegistry};
use super::store::{AuditFilter, AuditStore};

/// Actor recorded on a record's creation audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub actor_id: Option<String>,
    pub actor_type: Option<String>,
}

enum WriterCommand {
    Persist(AuditEntry),
    /// Acknowledged once every previously queued entry has been handled
    Flush(oneshot::Sender<()>),
}

pub struct Auditor {
    store: Arc<dyn AuditStore>,
    policies: PolicyRegistry,
    creators: CreatorPolicy,
    writer: OnceLock<mpsc::UnboundedSender<WriterCommand>>,
}

impl Auditor {
    pub fn new(store: Arc<dyn AuditStore>, policies: PolicyRegistry) -> Self {
        Self {
            store,
            policies,
            creators: CreatorPolicy::default(),
            writer: OnceLock::new(),
        }
    }

    /// Set which actor types resolve to a stored creator record
    pub fn with_creator_policy(mut self, creators: CreatorPolicy) -> Self {
        self.creators = creators;
        self
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    pub fn creator_policy(&self) -> &CreatorPolicy {
        &self.creators
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Audit a single-record mutation
    ///
    /// Returns `true` when an entry was dispatched, `false` when the event is
    /// disabled for the table or no runtime was available.
    pub fn record(&self, change: RecordChange) -> bool {
        let policy = self.policies.resolve(&change.table);
        if !policy.audits(change.event) {
            tracing::debug!(
                table = %change.table,
                event = change.event.as_str(),
                "Event not audited for table"
            );
            return false;
        }

        let actor = ActorContext::current();
        let entry = assemble(change, &policy.redaction, actor.as_ref());
        self.dispatch(entry)
    }

    /// Audit a bulk mutation; returns the number of entries dispatched
    pub fn record_bulk(&self, change: BulkChange) -> usize {
        let policy = self.policies.resolve(&change.table);
        if !policy.audits(change.event) {
            tracing::debug!(
                table = %change.table,
                event = change.event.as_str(),
                "Bulk event not audited for table"
            );
            return 0;
        }

        let actor = ActorContext::current();
        assemble_bulk(change, &policy.redaction, actor.as_ref())
            .into_iter()
            .filter(|entry| self.dispatch(entry.clone()))
            .count()
    }

    /// The writer queue, starting the writer task on first use
    fn writer(&self) -> Option<&mpsc::UnboundedSender<WriterCommand>> {
        if let Some(sender) = self.writer.get() {
            return Some(sender);
        }

        let handle = Handle::try_current().ok()?;
        Some(self.writer.get_or_init(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            handle.spawn(run_writer(receiver, Arc::clone(&self.store)));
            sender
        }))
    }

    fn dispatch(&self, entry: AuditEntry) -> bool {
        let Some(writer) = self.writer() else {
            tracing::warn!(
                table = %entry.table,
                record_id = %entry.record_id,
                "No async runtime available, audit entry dropped"
            );
            return false;
        };

        tracing::debug!(
            table = %entry.table,
            record_id = %entry.record_id,
            event = entry.event.as_str(),
            "Dispatching audit entry"
        );

        match writer.send(WriterCommand::Persist(entry)) {
            Ok(()) => true,
            Err(mpsc::error::SendError(command)) => {
                if let WriterCommand::Persist(entry) = command {
                    tracing::warn!(
                        table = %entry.table,
                        record_id = %entry.record_id,
                        "Audit writer stopped, audit entry dropped"
                    );
                }
                false
            }
        }
    }

    /// Wait for every dispatched entry to finish persisting
    pub async fn flush(&self) {
        let Some(writer) = self.writer.get() else {
            return;
        };

        let (done, finished) = oneshot::channel();
        if writer.send(WriterCommand::Flush(done)).is_err() || finished.await.is_err() {
            tracing::error!("Audit writer stopped before flush completed");
        }
    }

    /// All entries for a record, oldest first
    pub async fn history(&self, table: &str, record_id: &str) -> AuditorResult<Vec<AuditEntry>> {
        self.store
            .query(&AuditFilter::for_record(table, record_id))
            .await
    }

    /// The entry recording the record's creation, if any
    pub async fn creation_audit(
        &self,
        table: &str,
        record_id: &str,
    ) -> AuditorResult<Option<AuditEntry>> {
        let filter = AuditFilter::for_record(table, record_id).event(AuditEvent::Created);
        Ok(self.store.query(&filter).await?.into_iter().next())
    }

    /// The actor of the record's creation audit, if any
    pub async fn creator(&self, table: &str, record_id: &str) -> AuditorResult<Option<Creator>> {
        Ok(self
            .creation_audit(table, record_id)
            .await?
            .map(|entry| Creator {
                actor_id: entry.actor_id,
                actor_type: entry.actor_type,
            }))
    }
}

async fn run_writer(
    mut receiver: mpsc::UnboundedReceiver<WriterCommand>,
    store: Arc<dyn AuditStore>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            WriterCommand::Persist(entry) => {
                if let Err(e) = store.create(&entry).await {
                    tracing::error!(
                        table = %entry.table,
                        record_id = %entry.record_id,
                        error = %e,
                        "Failed to persist audit entry"
                    );
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Audit writer stopped");
}
