//! Post service

use crate::audit::{AuditEntry, Auditable, Auditor, Creator, Snapshot};
use crate::error::{AuditorError, AuditorResult};
use crate::models::{Post, PostId};
use crate::storage::Storage;

use super::{audit_created, audit_deleted, audit_updated, UserService};

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
}

impl NewPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
            published: false,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }
}

/// Field changes for a post; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    /// An empty string clears the content
    pub content: Option<String>,
    pub published: Option<bool>,
}

/// A post together with who created it
#[derive(Debug, Clone)]
pub struct PostWithCreator {
    pub post: Post,
    /// Actor on the creation audit; `None` when the post has none
    pub actor: Option<Creator>,
    /// The acting user, limited to the configured creator fields
    pub creator: Option<Snapshot>,
}

/// Service for post management
pub struct PostService<'a> {
    storage: &'a Storage,
    auditor: &'a Auditor,
}

impl<'a> PostService<'a> {
    pub fn new(storage: &'a Storage, auditor: &'a Auditor) -> Self {
        Self { storage, auditor }
    }

    pub fn create(&self, input: NewPost) -> AuditorResult<Post> {
        let mut post = Post::new(input.title.trim());
        post.content = input.content;
        post.published = input.published;

        post.validate()
            .map_err(|e| AuditorError::Validation(e.to_string()))?;

        self.storage.posts.upsert(post.clone())?;
        self.storage.posts.save()?;

        audit_created(self.auditor, &post)?;
        tracing::debug!(post = %post.id, "Created post");

        Ok(post)
    }

    pub fn list(&self) -> AuditorResult<Vec<Post>> {
        self.storage.posts.get_all()
    }

    /// Find a post by full ID, short display ID, or title
    pub fn find(&self, identifier: &str) -> AuditorResult<Option<Post>> {
        if let Ok(id) = identifier.parse::<PostId>() {
            if let Some(post) = self.storage.posts.get(id)? {
                return Ok(Some(post));
            }
        }

        if let Some(post) = self.storage.posts.get_by_short_id(identifier)? {
            return Ok(Some(post));
        }

        self.storage.posts.get_by_title(identifier)
    }

    pub fn require(&self, identifier: &str) -> AuditorResult<Post> {
        self.find(identifier)?
            .ok_or_else(|| AuditorError::post_not_found(identifier))
    }

    pub fn update(&self, id: PostId, changes: PostUpdate) -> AuditorResult<Post> {
        let before = self
            .storage
            .posts
            .get(id)?
            .ok_or_else(|| AuditorError::post_not_found(id.to_string()))?;

        let mut post = before.clone();
        if let Some(title) = changes.title {
            post.title = title.trim().to_string();
        }
        if let Some(content) = changes.content {
            post.content = Some(content).filter(|c| !c.is_empty());
        }
        if let Some(published) = changes.published {
            post.published = published;
        }

        post.touch();
        post.validate()
            .map_err(|e| AuditorError::Validation(e.to_string()))?;

        self.storage.posts.upsert(post.clone())?;
        self.storage.posts.save()?;

        audit_updated(self.auditor, &before, &post)?;

        Ok(post)
    }

    pub fn delete(&self, id: PostId) -> AuditorResult<Post> {
        let post = self
            .storage
            .posts
            .delete(id)?
            .ok_or_else(|| AuditorError::post_not_found(id.to_string()))?;
        self.storage.posts.save()?;

        audit_deleted(self.auditor, &post)?;

        Ok(post)
    }

    /// Load a post along with the actor recorded on its creation audit
    pub async fn find_with_creator(&self, identifier: &str) -> AuditorResult<PostWithCreator> {
        let post = self.require(identifier)?;
        let actor = self.auditor.creator(Post::TABLE, &post.record_id()).await?;
        let creator = match &actor {
            Some(actor) => UserService::new(self.storage, self.auditor).resolve_actor(actor)?,
            None => None,
        };
        Ok(PostWithCreator {
            post,
            actor,
            creator,
        })
    }

    /// All audit entries for a post, oldest first
    pub async fn history(&self, post: &Post) -> AuditorResult<Vec<AuditEntry>> {
        self.auditor.history(Post::TABLE, &post.record_id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ActorContext, AuditEvent, FieldValue};
    use crate::services::test_support::harness;
    use crate::services::NewUser;

    #[tokio::test]
    async fn test_post_lifecycle_history() {
        let h = harness();
        let service = PostService::new(&h.storage, &h.auditor);

        let post = service
            .create(NewPost::new("Hello").content("First draft"))
            .unwrap();
        service
            .update(
                post.id,
                PostUpdate {
                    published: Some(true),
                    ..PostUpdate::default()
                },
            )
            .unwrap();
        h.auditor.flush().await;

        let history = service.history(&post).await.unwrap();
        let events: Vec<_> = history.iter().map(|e| e.event).collect();
        assert_eq!(events, vec![AuditEvent::Created, AuditEvent::Updated]);

        let update = &history[1];
        let old = update.old_values.as_ref().unwrap();
        let new = update.new_values.as_ref().unwrap();
        assert_eq!(old.get("published"), Some(&FieldValue::Bool(false)));
        assert_eq!(new.get("published"), Some(&FieldValue::Bool(true)));
        // full state, id kept, timestamps excluded
        assert!(new.contains("title"));
        assert!(new.contains("id"));
        assert!(!new.contains("updated_at"));
    }

    #[tokio::test]
    async fn test_find_with_creator() {
        let h = harness();
        let service = PostService::new(&h.storage, &h.auditor);

        let post = ActorContext::new("admin-123")
            .with_actor_type("User")
            .scope(async { service.create(NewPost::new("Hello")) })
            .await
            .unwrap();
        h.auditor.flush().await;

        let found = service.find_with_creator(&post.id.to_string()).await.unwrap();
        assert_eq!(found.post, post);
        let actor = found.actor.unwrap();
        assert_eq!(actor.actor_id.as_deref(), Some("admin-123"));
        assert_eq!(actor.actor_type.as_deref(), Some("User"));
        // no stored user behind the actor
        assert!(found.creator.is_none());
    }

    #[tokio::test]
    async fn test_find_with_creator_resolves_user() {
        let h = harness();
        let users = UserService::new(&h.storage, &h.auditor);
        let service = PostService::new(&h.storage, &h.auditor);
        let author = users
            .create(NewUser::new("Jane Smith", "jane@example.com", "secret456"))
            .unwrap();

        ActorContext::new(author.record_id())
            .with_actor_type("User")
            .scope(async { service.create(NewPost::new("Hello")) })
            .await
            .unwrap();
        h.auditor.flush().await;

        let creator = service.find_with_creator("Hello").await.unwrap().creator.unwrap();
        assert_eq!(creator.get("name"), Some(&FieldValue::from("Jane Smith")));
        assert_eq!(creator.get("id"), Some(&FieldValue::from(author.record_id())));
        assert!(!creator.contains("password"));
        assert!(!creator.contains("email"));
    }

    #[tokio::test]
    async fn test_creator_absent_when_not_audited() {
        let h = harness();
        let service = PostService::new(&h.storage, &h.auditor);

        // Stored directly, bypassing the service hooks
        let post = Post::new("Imported");
        h.storage.posts.upsert(post.clone()).unwrap();

        let found = service.find_with_creator("Imported").await.unwrap();
        assert_eq!(found.post.id, post.id);
        assert!(found.actor.is_none());
        assert!(found.creator.is_none());
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let h = harness();
        let service = PostService::new(&h.storage, &h.auditor);
        let post = service.create(NewPost::new("Bye")).unwrap();

        service.delete(post.id).unwrap();
        h.auditor.flush().await;

        assert!(service.delete(post.id).unwrap_err().is_not_found());
        let history = service.history(&post).await.unwrap();
        assert_eq!(history.last().map(|e| e.event), Some(AuditEvent::Deleted));
        assert!(history[1].new_values.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let h = harness();
        let service = PostService::new(&h.storage, &h.auditor);

        assert!(service.create(NewPost::new("   ")).unwrap_err().is_validation());
    }
}
