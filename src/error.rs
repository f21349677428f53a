//! Error types for auditor
//!
//! Lifecycle hooks never fail because of auditing: persistence problems are
//! logged by the auditor's writer. The errors here come from storage,
//! settings, lookups, and command input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditorError {
    /// Settings file unreadable or malformed, or no data directory
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// Record or audit entry (de)serialization, including corrupt JSONL lines
    #[error("JSON error: {0}")]
    Json(String),

    /// Rejected record data, change sets or bulk conditions
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A short ID prefix that matches more than one record
    #[error("Ambiguous {entity_type} ID '{identifier}': {matches} records match")]
    AmbiguousId {
        entity_type: &'static str,
        identifier: String,
        matches: usize,
    },

    /// Unique field already taken (user emails)
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Record repository lock or persistence failures
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),

    /// Audit store read/write failures
    #[error("Audit store error: {0}")]
    Audit(String),
}

impl AuditorError {
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    pub fn post_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Post",
            identifier: identifier.into(),
        }
    }

    pub fn audit_entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Audit entry",
            identifier: identifier.into(),
        }
    }

    /// A user email that is already registered
    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "User",
            identifier: email.into(),
        }
    }

    pub fn ambiguous_id(
        entity_type: &'static str,
        identifier: impl Into<String>,
        matches: usize,
    ) -> Self {
        Self::AmbiguousId {
            entity_type,
            identifier: identifier.into(),
            matches,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Input the caller can correct: invalid data or an ambiguous lookup
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::AmbiguousId { .. })
    }
}

impl From<std::io::Error> for AuditorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for auditor operations
pub type AuditorResult<T> = Result<T, AuditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuditorError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = AuditorError::user_not_found("john@example.com");
        assert_eq!(err.to_string(), "User not found: john@example.com");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_email_taken() {
        let err = AuditorError::email_taken("john@example.com");
        assert_eq!(err.to_string(), "User already exists: john@example.com");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_ambiguous_id_is_correctable_input() {
        let err = AuditorError::ambiguous_id("user", "usr-0b", 2);
        assert_eq!(err.to_string(), "Ambiguous user ID 'usr-0b': 2 records match");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_corrupt_json_maps_to_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: AuditorError = parse_err.into();
        assert!(matches!(err, AuditorError::Json(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AuditorError = io_err.into();
        assert!(matches!(err, AuditorError::Io(_)));
    }
}
