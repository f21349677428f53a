//! Audit entry persistence
//!
//! [`AuditStore`] is the seam between the auditor and wherever entries end
//! up. [`JsonlAuditStore`] appends one JSON object per line to a log file;
//! [`MemoryAuditStore`] keeps entries in memory for tests and embedding.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AuditorError, AuditorResult};

use super::entry::{AuditEntry, AuditEvent};

/// Destination for audit entries
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a single entry
    async fn create(&self, entry: &AuditEntry) -> AuditorResult<()>;

    /// Entries matching `filter`, oldest first
    async fn query(&self, filter: &AuditFilter) -> AuditorResult<Vec<AuditEntry>>;
}

/// Criteria for selecting audit entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub table: Option<String>,
    pub record_id: Option<String>,
    pub event: Option<AuditEvent>,
    pub actor_id: Option<String>,
    /// Keep only the most recent N matches
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries for one record
    pub fn for_record(table: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            record_id: Some(record_id.into()),
            ..Self::default()
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn event(mut self, event: AuditEvent) -> Self {
        self.event = Some(event);
        self
    }

    pub fn actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.table.as_deref().map_or(true, |t| entry.table == t)
            && self.record_id.as_deref().map_or(true, |r| entry.record_id == r)
            && self.event.map_or(true, |e| entry.event == e)
            && self
                .actor_id
                .as_deref()
                .map_or(true, |a| entry.actor_id.as_deref() == Some(a))
    }

    /// Filter `entries` and apply the limit
    pub fn apply(&self, entries: impl IntoIterator<Item = AuditEntry>) -> Vec<AuditEntry> {
        let mut matched: Vec<AuditEntry> = entries.into_iter().filter(|e| self.matches(e)).collect();
        if let Some(limit) = self.limit {
            let start = matched.len().saturating_sub(limit);
            matched.drain(..start);
        }
        matched
    }
}

/// Append-only JSONL audit log
///
/// Each line is a complete JSON object representing one audit entry. Appends
/// are serialized through a lock so concurrent writers never interleave.
pub struct JsonlAuditStore {
    log_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditStore {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Append multiple entries, flushing once at the end
    pub async fn append_batch(&self, entries: &[AuditEntry]) -> AuditorResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for entry in entries {
            let json = serde_json::to_string(entry)
                .map_err(|e| AuditorError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            buffer.push_str(&json);
            buffer.push('\n');
        }

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AuditorError::Io(format!("Failed to create audit log directory: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await
            .map_err(|e| AuditorError::Io(format!("Failed to open audit log: {}", e)))?;

        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| AuditorError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .await
            .map_err(|e| AuditorError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Read all entries, oldest first
    pub async fn read_all(&self) -> AuditorResult<Vec<AuditEntry>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.log_path)
            .await
            .map_err(|e| AuditorError::Io(format!("Failed to read audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(line).map_err(|e| {
                AuditorError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The most recent `count` entries
    pub async fn read_recent(&self, count: usize) -> AuditorResult<Vec<AuditEntry>> {
        self.query(&AuditFilter::new().limit(count)).await
    }

    pub async fn entry_count(&self) -> AuditorResult<usize> {
        if !self.exists() {
            return Ok(0);
        }

        let contents = fs::read_to_string(&self.log_path)
            .await
            .map_err(|e| AuditorError::Io(format!("Failed to read audit log: {}", e)))?;

        Ok(contents.lines().filter(|l| !l.trim().is_empty()).count())
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

#[async_trait]
impl AuditStore for JsonlAuditStore {
    async fn create(&self, entry: &AuditEntry) -> AuditorResult<()> {
        self.append_batch(std::slice::from_ref(entry)).await
    }

    async fn query(&self, filter: &AuditFilter) -> AuditorResult<Vec<AuditEntry>> {
        Ok(filter.apply(self.read_all().await?))
    }
}

/// In-memory audit store
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn create(&self, entry: &AuditEntry) -> AuditorResult<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }

    async fn query(&self, filter: &AuditFilter) -> AuditorResult<Vec<AuditEntry>> {
        let entries = self.entries.lock().await.clone();
        Ok(filter.apply(entries))
    }
}
