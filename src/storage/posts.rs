//! Post repository for JSON storage

use chrono::{DateTime, Utc};

use crate::error::AuditorError;
use crate::models::{Post, PostId};

use super::records::{RecordRepository, StoredRecord};

pub type PostRepository = RecordRepository<Post>;

impl StoredRecord for Post {
    type Id = PostId;
    const ENTITY: &'static str = "Post";

    fn id(&self) -> PostId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_short_id(&self, short: &str) -> bool {
        self.id.matches_short(short)
    }
}

impl RecordRepository<Post> {
    /// Get a post by title (case-insensitive)
    pub fn get_by_title(&self, title: &str) -> Result<Option<Post>, AuditorError> {
        let title = title.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .find(|p| p.title.to_lowercase() == title))
    }
}
