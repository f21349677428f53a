//! Generic JSON-backed record repository
//!
//! Each record type lives in its own file as `{"records": [...]}`. The whole
//! set is held in memory behind a lock; callers `load` once, mutate, and
//! `save` to persist.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::audit::Auditable;
use crate::error::AuditorError;

use super::file_io::{read_json, write_json_atomic};

/// A record type that can live in a [`RecordRepository`]
pub trait StoredRecord: Auditable + Clone + DeserializeOwned {
    type Id: Copy + Eq + Hash + std::fmt::Display;

    /// Name used in error messages
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    fn created_at(&self) -> DateTime<Utc>;

    /// Whether `short` (a display id or UUID prefix) identifies this record
    fn matches_short_id(&self, short: &str) -> bool;
}

#[derive(Serialize, Deserialize)]
#[serde(bound(deserialize = "R: DeserializeOwned"))]
struct RecordFile<R> {
    #[serde(default = "Vec::new")]
    records: Vec<R>,
}

impl<R> Default for RecordFile<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// Repository for one record type
pub struct RecordRepository<R: StoredRecord> {
    path: PathBuf,
    data: RwLock<HashMap<R::Id, R>>,
}

impl<R: StoredRecord> RecordRepository<R> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<R::Id, R>>, AuditorError> {
        self.data
            .read()
            .map_err(|e| AuditorError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<R::Id, R>>, AuditorError> {
        self.data
            .write()
            .map_err(|e| AuditorError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, replacing anything in memory
    pub fn load(&self) -> Result<(), AuditorError> {
        let file: RecordFile<R> = read_json(&self.path)?;

        let mut data = self.write()?;
        data.clear();
        data.extend(file.records.into_iter().map(|r| (r.id(), r)));

        tracing::debug!(
            entity = R::ENTITY,
            count = data.len(),
            path = %self.path.display(),
            "Loaded records"
        );
        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> Result<(), AuditorError> {
        let file = RecordFile {
            records: self.get_all()?,
        };
        write_json_atomic(&self.path, &file)
    }

    pub fn get(&self, id: R::Id) -> Result<Option<R>, AuditorError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All records, oldest first
    pub fn get_all(&self) -> Result<Vec<R>, AuditorError> {
        let mut records: Vec<R> = self.read()?.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.record_id().cmp(&b.record_id()))
        });
        Ok(records)
    }

    /// Records satisfying `predicate`, oldest first
    pub fn filter(&self, predicate: impl Fn(&R) -> bool) -> Result<Vec<R>, AuditorError> {
        Ok(self.get_all()?.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Look a record up by its short display id
    ///
    /// Ambiguous prefixes are rejected rather than picking one arbitrarily.
    pub fn get_by_short_id(&self, short: &str) -> Result<Option<R>, AuditorError> {
        let data = self.read()?;
        let matches: Vec<&R> = data.values().filter(|r| r.matches_short_id(short)).collect();
        match matches.as_slice() {
            [] => Ok(None),
            [record] => Ok(Some((*record).clone())),
            _ => Err(AuditorError::ambiguous_id(R::ENTITY, short, matches.len())),
        }
    }

    /// Insert or update a record
    pub fn upsert(&self, record: R) -> Result<(), AuditorError> {
        self.write()?.insert(record.id(), record);
        Ok(())
    }

    /// Remove a record; returns it when it existed
    pub fn delete(&self, id: R::Id) -> Result<Option<R>, AuditorError> {
        Ok(self.write()?.remove(&id))
    }

    pub fn exists(&self, id: R::Id) -> Result<bool, AuditorError> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, AuditorError> {
        Ok(self.read()?.len())
    }
}
