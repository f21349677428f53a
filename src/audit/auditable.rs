//! Records that can be audited

use serde::Serialize;

use crate::error::AuditorResult;

use super::value::Snapshot;

/// A persisted record type whose mutations are audited
pub trait Auditable: Serialize {
    /// Table name used in audit entries and policy lookup
    const TABLE: &'static str;

    /// Stable identifier of this record
    fn record_id(&self) -> String;

    /// Field-keyed view of the record's current state
    fn snapshot(&self) -> AuditorResult<Snapshot> {
        Snapshot::capture(self)
    }
}
