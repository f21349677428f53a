//! Task-scoped actor context
//!
//! The actor context identifies who triggered the current operation. It is
//! bound to the dynamic extent of a future (or closure) through a tokio task
//! local, so concurrent tasks never see each other's context and leaving a
//! scope restores whatever context enclosed it.

use std::cell::RefCell;
use std::future::Future;

use serde::{Deserialize, Serialize};

use super::value::{FieldValue, Tags};

tokio::task_local! {
    static CURRENT_ACTOR: RefCell<ActorContext>;
}

/// Actor and request metadata attached to audit entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl ActorContext {
    /// Context for a known actor
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            ..Self::default()
        }
    }

    /// Context with no actor (system jobs, anonymous requests)
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_actor_type(mut self, actor_type: impl Into<String>) -> Self {
        self.actor_type = Some(actor_type.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.actor_id.is_none()
            && self.actor_type.is_none()
            && self.ip.is_none()
            && self.user_agent.is_none()
            && self.url.is_none()
            && self.tags.is_empty()
    }

    /// Run `future` with this context bound
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        CURRENT_ACTOR.scope(RefCell::new(self), future).await
    }

    /// Run `f` synchronously with this context bound
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT_ACTOR.sync_scope(RefCell::new(self), f)
    }

    /// The context bound to the current scope, if any
    pub fn current() -> Option<ActorContext> {
        CURRENT_ACTOR.try_with(|ctx| ctx.borrow().clone()).ok()
    }

    /// Modify the context of the current scope in place
    ///
    /// Returns `false` (and does nothing) outside of any scope. The change is
    /// undone when the scope ends.
    pub fn update(f: impl FnOnce(&mut ActorContext)) -> bool {
        let Some(mut updated) = Self::current() else {
            return false;
        };
        // No borrow is held while `f` runs, so it may read the context itself
        f(&mut updated);
        CURRENT_ACTOR
            .try_with(|ctx| *ctx.borrow_mut() = updated)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn web_context() -> ActorContext {
        ActorContext::new("web-user-456")
            .with_actor_type("User")
            .with_ip("203.0.113.1")
            .with_user_agent("Mozilla/5.0 (Chrome)")
            .with_url("/api/profile/update")
            .with_tag("source", "web-request")
            .with_tag("method", "PUT")
    }

    #[test]
    fn test_no_context_outside_scope() {
        assert!(ActorContext::current().is_none());
        assert!(!ActorContext::update(|ctx| ctx.ip = Some("1.1.1.1".into())));
    }

    #[test]
    fn test_sync_scope_returns_result_and_exposes_context() {
        let (result, seen) = web_context().sync_scope(|| ("test-result", ActorContext::current()));

        assert_eq!(result, "test-result");
        assert_eq!(seen, Some(web_context()));
        assert!(ActorContext::current().is_none());
    }

    #[test]
    fn test_nested_scopes_restore_outer() {
        ActorContext::new("outer-user").sync_scope(|| {
            let inner = ActorContext::new("inner-user")
                .with_ip("1.1.1.1")
                .sync_scope(ActorContext::current)
                .unwrap();
            assert_eq!(inner.actor_id.as_deref(), Some("inner-user"));
            assert_eq!(inner.ip.as_deref(), Some("1.1.1.1"));

            let outer = ActorContext::current().unwrap();
            assert_eq!(outer.actor_id.as_deref(), Some("outer-user"));
            assert!(outer.ip.is_none());
        });
    }

    #[test]
    fn test_partial_update_within_scope() {
        ActorContext::new("user-123")
            .with_ip("192.168.1.100")
            .sync_scope(|| {
                assert!(ActorContext::update(|ctx| {
                    ctx.user_agent = Some("Updated Browser".into());
                    ctx.tags.insert("source".into(), "mobile-app".into());
                }));

                let ctx = ActorContext::current().unwrap();
                assert_eq!(ctx.actor_id.as_deref(), Some("user-123"));
                assert_eq!(ctx.ip.as_deref(), Some("192.168.1.100"));
                assert_eq!(ctx.user_agent.as_deref(), Some("Updated Browser"));
                assert_eq!(ctx.tags.get("source"), Some(&FieldValue::from("mobile-app")));
            });
    }

    #[test]
    fn test_background_job_context_has_no_request_fields() {
        let job = ActorContext::new("system-cleanup-job")
            .with_tag("jobType", "data-cleanup")
            .with_tag("automated", true);

        job.sync_scope(|| {
            let ctx = ActorContext::current().unwrap();
            assert!(ctx.ip.is_none());
            assert!(ctx.url.is_none());
            assert_eq!(ctx.tags.get("automated"), Some(&FieldValue::Bool(true)));
        });
    }

    #[test]
    fn test_sequential_operations_with_different_actors() {
        let seen: Vec<_> = ["user1", "user2", "user3"]
            .into_iter()
            .map(|id| {
                ActorContext::new(id)
                    .with_tag("batch", true)
                    .sync_scope(ActorContext::current)
                    .unwrap()
            })
            .collect();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].actor_id.as_deref(), Some("user1"));
        assert_eq!(seen[2].actor_id.as_deref(), Some("user3"));
        assert!(seen.iter().all(|ctx| ctx.tags.get("batch") == Some(&FieldValue::Bool(true))));
    }

    #[tokio::test]
    async fn test_async_scope_survives_await_points() {
        let seen = ActorContext::new("async-user")
            .scope(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                ActorContext::current()
            })
            .await;

        assert_eq!(seen.unwrap().actor_id.as_deref(), Some("async-user"));
        assert!(ActorContext::current().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_are_isolated() {
        let mut handles = Vec::new();
        for i in 0..16 {
            let actor = format!("actor-{}", i);
            handles.push(tokio::spawn(ActorContext::new(actor.clone()).scope(async move {
                for _ in 0..5 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    let seen = ActorContext::current().and_then(|ctx| ctx.actor_id);
                    assert_eq!(seen.as_deref(), Some(actor.as_str()));
                }
            })));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[test]
    fn test_serialization_omits_unset_fields() {
        let json = serde_json::to_value(ActorContext::new("admin")).unwrap();
        assert_eq!(json, serde_json::json!({"actor_id": "admin"}));
        assert!(ActorContext::anonymous().is_empty());
    }

    #[test]
    fn test_update_may_read_current_context() {
        let seen = ActorContext::new("admin-123").sync_scope(|| {
            let updated = ActorContext::update(|ctx| {
                let current = ActorContext::current();
                ctx.actor_type = current.and_then(|c| c.actor_id).map(|id| format!("{}-type", id));
                ActorContext::update(|inner| inner.url = Some("/nested".into()));
            });
            assert!(updated);
            ActorContext::current()
        });

        let seen = seen.unwrap();
        assert_eq!(seen.actor_type.as_deref(), Some("admin-123-type"));
        // the outer write-back replaces the nested change
        assert!(seen.url.is_none());
    }
}
