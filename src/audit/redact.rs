//! Field projection and redaction
//!
//! Projection narrows a snapshot to a set of fields. Redaction then drops
//! excluded fields and replaces masked ones with [`MASK_SENTINEL`].

use super::policy::RedactionPolicy;
use super::value::{FieldValue, Snapshot};

/// Replacement value written in place of masked fields
pub const MASK_SENTINEL: &str = "***MASKED***";

/// Keep only the requested fields that exist in `snapshot`
pub fn project<I>(snapshot: &Snapshot, fields: I) -> Snapshot
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fields
        .into_iter()
        .filter_map(|field| {
            let field = field.as_ref();
            snapshot
                .get(field)
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

/// Apply exclusion, then masking
///
/// A field listed in both `exclude` and `mask` is dropped.
pub fn redact(snapshot: &Snapshot, policy: &RedactionPolicy) -> Snapshot {
    snapshot
        .iter()
        .filter(|(field, _)| !policy.exclude.contains(field.as_str()))
        .map(|(field, value)| {
            if policy.mask.contains(field.as_str()) {
                (field.clone(), FieldValue::Text(MASK_SENTINEL.to_string()))
            } else {
                (field.clone(), value.clone())
            }
        })
        .collect()
}
