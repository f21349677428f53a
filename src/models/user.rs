//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;
use crate::audit::Auditable;

/// An application user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Email address, unique across users
    pub email: String,

    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Account password (masked in audit entries)
    pub password: String,

    /// Free-form status used by bulk operations (e.g. "active", "archived")
    #[serde(default = "default_status")]
    pub status: String,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> String {
    "active".to_string()
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            phone: None,
            password: password.into(),
            status: default_status(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Mark the record as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.len() > 100 {
            return Err(UserValidationError::NameTooLong(name.len()));
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(UserValidationError::InvalidEmail(self.email.clone())),
        }

        if self.password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }

        Ok(())
    }
}

impl Auditable for User {
    const TABLE: &'static str = "users";

    fn record_id(&self) -> String {
        self.id.as_uuid().to_string()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidEmail(String),
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "User name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "User name too long ({} chars, max 100)", len)
            }
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
            Self::EmptyPassword => write!(f, "Password cannot be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}
