//! Audit settings for auditor
//!
//! Holds the global audit policy and the per-table overrides, persisted as
//! `config.json` in the base directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::paths::AuditorPaths;
use crate::audit::{
    AuditEvent, AuditPolicy, CreatorPolicy, PolicyOverride, PolicyRegistry, RedactionPolicy,
};
use crate::error::AuditorError;

/// Persisted settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Policy applied to every table
    #[serde(default = "default_audit_policy")]
    pub audit: AuditPolicy,

    /// Per-table overrides keyed by table name
    #[serde(default = "default_model_overrides")]
    pub models: BTreeMap<String, PolicyOverride>,

    /// Actor types whose creator lookups resolve to a stored user
    #[serde(default = "default_actor_types")]
    pub actor_types: Vec<String>,

    /// User fields exposed on a resolved creator
    #[serde(default = "default_creator_fields")]
    pub creator_fields: Vec<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_audit_policy() -> AuditPolicy {
    AuditPolicy {
        redaction: RedactionPolicy::new().only_dirty(true),
        ..AuditPolicy::default()
    }
}

fn default_actor_types() -> Vec<String> {
    vec!["User".to_string()]
}

fn default_creator_fields() -> Vec<String> {
    vec!["id".to_string(), "name".to_string()]
}

fn default_model_overrides() -> BTreeMap<String, PolicyOverride> {
    let crud = [AuditEvent::Created, AuditEvent::Updated, AuditEvent::Deleted];

    let mut models = BTreeMap::new();
    models.insert(
        "users".to_string(),
        PolicyOverride::new()
            .exclude(["id", "created_at", "updated_at"])
            .mask(["password"])
            .only_dirty(false)
            .events(crud),
    );
    models.insert(
        "posts".to_string(),
        PolicyOverride::new()
            .exclude(["created_at", "updated_at"])
            .only_dirty(false)
            .events(crud),
    );
    models
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            audit: default_audit_policy(),
            models: default_model_overrides(),
            actor_types: default_actor_types(),
            creator_fields: default_creator_fields(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditorPaths) -> Result<Self, AuditorError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| AuditorError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| AuditorError::Config(format!("Failed to parse settings file: {}", e)))?;

        tracing::debug!(path = %settings_path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditorPaths) -> Result<(), AuditorError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AuditorError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AuditorError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Build the policy registry the auditor resolves against
    pub fn policy_registry(&self) -> PolicyRegistry {
        self.models
            .iter()
            .fold(PolicyRegistry::new(self.audit.clone()), |registry, (table, local)| {
                registry.with_override(table.clone(), local.clone())
            })
    }

    /// Creator lookup configuration for the auditor
    pub fn creator_policy(&self) -> CreatorPolicy {
        CreatorPolicy::new()
            .actor_types(self.actor_types.iter().cloned())
            .fields(self.creator_fields.iter().cloned())
    }
}
