//! Storage layer for auditor
//!
//! Provides JSON file storage for the demo records with atomic writes and
//! automatic directory creation. Audit entries are stored separately through
//! [`crate::audit::AuditStore`].

pub mod file_io;
pub mod posts;
pub mod records;
pub mod users;

pub use file_io::{read_json, write_json_atomic};
pub use posts::PostRepository;
pub use records::{RecordRepository, StoredRecord};
pub use users::UserRepository;

use crate::audit::JsonlAuditStore;
use crate::config::paths::AuditorPaths;
use crate::error::AuditorError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: AuditorPaths,
    pub users: UserRepository,
    pub posts: PostRepository,
}

impl Storage {
    pub fn new(paths: AuditorPaths) -> Result<Self, AuditorError> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            posts: PostRepository::new(paths.posts_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &AuditorPaths {
        &self.paths
    }

    /// The audit log living next to the record files
    pub fn audit_store(&self) -> JsonlAuditStore {
        JsonlAuditStore::new(self.paths.audit_log())
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), AuditorError> {
        self.users.load()?;
        self.posts.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), AuditorError> {
        self.users.save()?;
        self.posts.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, User};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.audit_store().path(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_save_and_load_all() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditorPaths::with_base_dir(temp_dir.path().to_path_buf());

        let storage = Storage::new(paths.clone()).unwrap();
        storage
            .users
            .upsert(User::new("John Doe", "john@example.com", "secret123"))
            .unwrap();
        storage.posts.upsert(Post::new("Hello")).unwrap();
        storage.save_all().unwrap();

        let reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();
        assert_eq!(reopened.users.count().unwrap(), 1);
        assert_eq!(reopened.posts.count().unwrap(), 1);
    }
}
