//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use chrono::{DateTime, Utc};

use crate::error::AuditorError;
use crate::models::{User, UserId};

use super::records::{RecordRepository, StoredRecord};

pub type UserRepository = RecordRepository<User>;

impl StoredRecord for User {
    type Id = UserId;
    const ENTITY: &'static str = "User";

    fn id(&self) -> UserId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_short_id(&self, short: &str) -> bool {
        self.id.matches_short(short)
    }
}

impl RecordRepository<User> {
    /// Get a user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, AuditorError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .find(|u| u.email.to_lowercase() == email))
    }

    /// Check if an email is already taken by a user other than `exclude_id`
    pub fn email_exists(&self, email: &str, exclude_id: Option<UserId>) -> Result<bool, AuditorError> {
        Ok(self
            .get_by_email(email)?
            .is_some_and(|u| Some(u.id) != exclude_id))
    }
}
