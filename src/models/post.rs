//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PostId;
use crate::audit::Auditable;

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,

    pub title: String,

    /// Body text
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub published: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            title: title.into(),
            content: None,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), PostValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if title.len() > 200 {
            return Err(PostValidationError::TitleTooLong(title.len()));
        }
        Ok(())
    }
}

impl Auditable for Post {
    const TABLE: &'static str = "posts";

    fn record_id(&self) -> String {
        self.id.as_uuid().to_string()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Post title cannot be empty"),
            Self::TitleTooLong(len) => {
                write!(f, "Post title too long ({} chars, max 200)", len)
            }
        }
    }
}

impl std::error::Error for PostValidationError {}
