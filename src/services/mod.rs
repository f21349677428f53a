//! Service layer for auditor
//!
//! Services own the record lifecycle: they validate input, persist through
//! the storage layer, and report every mutation to the [`Auditor`] with the
//! record's before/after snapshots.

pub mod post;
pub mod user;

pub use post::{NewPost, PostService, PostUpdate, PostWithCreator};
pub use user::{NewUser, UserService, UserUpdate};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::audit::{Auditable, Auditor, RecordChange, Snapshot};
use crate::error::{AuditorError, AuditorResult};

/// Fields bulk changes may never touch
const PROTECTED_FIELDS: [&str; 2] = ["id", "created_at"];

/// Overlay `changes` onto a record through its serialized form
pub(crate) fn apply_changes<R>(record: &R, changes: &Snapshot) -> AuditorResult<R>
where
    R: Serialize + DeserializeOwned,
{
    if let Some(field) = changes.fields().find(|f| PROTECTED_FIELDS.contains(f)) {
        return Err(AuditorError::Validation(format!(
            "Field '{}' cannot be changed",
            field
        )));
    }

    let mut value = serde_json::to_value(record)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| AuditorError::Validation("Record is not an object".into()))?;

    for (field, new_value) in changes {
        if !object.contains_key(field) {
            return Err(AuditorError::Validation(format!("Unknown field '{}'", field)));
        }
        object.insert(field.clone(), serde_json::to_value(new_value)?);
    }

    serde_json::from_value(value)
        .map_err(|e| AuditorError::Validation(format!("Invalid change set: {}", e)))
}

pub(crate) fn audit_created<R: Auditable>(auditor: &Auditor, record: &R) -> AuditorResult<()> {
    auditor.record(RecordChange::created(R::TABLE, record.record_id(), record.snapshot()?));
    Ok(())
}

pub(crate) fn audit_updated<R: Auditable>(
    auditor: &Auditor,
    before: &R,
    after: &R,
) -> AuditorResult<()> {
    auditor.record(RecordChange::updated(
        R::TABLE,
        after.record_id(),
        before.snapshot()?,
        after.snapshot()?,
    ));
    Ok(())
}

pub(crate) fn audit_deleted<R: Auditable>(auditor: &Auditor, record: &R) -> AuditorResult<()> {
    auditor.record(RecordChange::deleted(R::TABLE, record.record_id(), record.snapshot()?));
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::audit::{Auditor, MemoryAuditStore};
    use crate::config::{AuditorPaths, Settings};
    use crate::storage::Storage;

    pub struct Harness {
        pub storage: Storage,
        pub auditor: Auditor,
        pub store: Arc<MemoryAuditStore>,
        _temp_dir: TempDir,
    }

    pub fn harness() -> Harness {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        let store = Arc::new(MemoryAuditStore::new());
        let settings = Settings::default();
        let auditor = Auditor::new(store.clone(), settings.policy_registry())
            .with_creator_policy(settings.creator_policy());
        Harness {
            storage,
            auditor,
            store,
            _temp_dir: temp_dir,
        }
    }
}
