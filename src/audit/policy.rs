//! Audit policies
//!
//! A global [`AuditPolicy`] applies to every table. Individual tables may
//! carry a [`PolicyOverride`] whose set fields replace the global ones; unset
//! fields fall back to the global value.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::entry::AuditEvent;

/// Exclusion, masking and dirty-field settings applied to audit payloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Fields dropped from the payload entirely
    #[serde(default)]
    pub exclude: BTreeSet<String>,

    /// Fields whose values are replaced with the mask sentinel
    #[serde(default)]
    pub mask: BTreeSet<String>,

    /// Restrict update payloads to the fields that changed
    #[serde(default)]
    pub only_dirty: bool,
}

impl RedactionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn mask<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn only_dirty(mut self, only_dirty: bool) -> Self {
        self.only_dirty = only_dirty;
        self
    }
}

/// Effective audit configuration for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditPolicy {
    #[serde(flatten)]
    pub redaction: RedactionPolicy,

    /// Events that produce audit entries
    #[serde(default = "default_events")]
    pub events: BTreeSet<AuditEvent>,
}

fn default_events() -> BTreeSet<AuditEvent> {
    AuditEvent::ALL.into_iter().collect()
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            redaction: RedactionPolicy::default(),
            events: default_events(),
        }
    }
}

impl AuditPolicy {
    /// Whether entries should be produced for `event`
    pub fn audits(&self, event: AuditEvent) -> bool {
        self.events.contains(&event)
    }

    /// Resolve a table override against this (global) policy
    ///
    /// Each field of `local` that is set replaces the corresponding global
    /// field wholesale; list fields are not unioned.
    pub fn merge(&self, local: &PolicyOverride) -> AuditPolicy {
        AuditPolicy {
            redaction: RedactionPolicy {
                exclude: local
                    .exclude
                    .clone()
                    .unwrap_or_else(|| self.redaction.exclude.clone()),
                mask: local
                    .mask
                    .clone()
                    .unwrap_or_else(|| self.redaction.mask.clone()),
                only_dirty: local.only_dirty.unwrap_or(self.redaction.only_dirty),
            },
            events: local.events.clone().unwrap_or_else(|| self.events.clone()),
        }
    }
}

/// Per-table policy fields; `None` means "use the global setting"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_dirty: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeSet<AuditEvent>>,
}

impl PolicyOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn mask<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn only_dirty(mut self, only_dirty: bool) -> Self {
        self.only_dirty = Some(only_dirty);
        self
    }

    pub fn events<I: IntoIterator<Item = AuditEvent>>(mut self, events: I) -> Self {
        self.events = Some(events.into_iter().collect());
        self
    }
}

/// Global policy plus per-table overrides
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    global: AuditPolicy,
    overrides: BTreeMap<String, PolicyOverride>,
}

impl PolicyRegistry {
    pub fn new(global: AuditPolicy) -> Self {
        Self {
            global,
            overrides: BTreeMap::new(),
        }
    }

    /// Register (or replace) the override for a table
    pub fn with_override(mut self, table: impl Into<String>, local: PolicyOverride) -> Self {
        self.overrides.insert(table.into(), local);
        self
    }

    pub fn global(&self) -> &AuditPolicy {
        &self.global
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(String::as_str)
    }

    /// Effective policy for `table`
    pub fn resolve(&self, table: &str) -> AuditPolicy {
        match self.overrides.get(table) {
            Some(local) => self.global.merge(local),
            None => self.global.clone(),
        }
    }
}

/// Which actor types resolve to a stored record when looking up a creator,
/// and which fields of that record are exposed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorPolicy {
    #[serde(default)]
    pub actor_types: BTreeSet<String>,

    #[serde(default)]
    pub fields: BTreeSet<String>,
}

impl CreatorPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actor_types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Whether actors of `actor_type` are looked up as records
    pub fn resolves(&self, actor_type: Option<&str>) -> bool {
        actor_type.map_or(false, |t| self.actor_types.contains(t))
    }
}
