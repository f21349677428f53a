//! User service
//!
//! CRUD and bulk operations on users. Each mutation is persisted first and
//! then reported to the auditor.

use crate::audit::{
    project, redact, Auditable, AuditEvent, Auditor, BulkChange, Creator, FieldValue, RecordPair,
    RedactionPolicy, Snapshot,
};
use crate::error::{AuditorError, AuditorResult};
use crate::models::{User, UserId};
use crate::storage::Storage;

use super::{apply_changes, audit_created, audit_deleted, audit_updated};

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Field changes for a single user; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// An empty string clears the phone number
    pub phone: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password.is_none()
            && self.status.is_none()
    }
}

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
    auditor: &'a Auditor,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage, auditor: &'a Auditor) -> Self {
        Self { storage, auditor }
    }

    fn build(&self, input: NewUser) -> AuditorResult<User> {
        let mut user = User::new(input.name.trim(), input.email.trim(), input.password);
        user.phone = input.phone.filter(|p| !p.trim().is_empty());

        user.validate()
            .map_err(|e| AuditorError::Validation(e.to_string()))?;

        if self.storage.users.email_exists(&user.email, None)? {
            return Err(AuditorError::email_taken(user.email.clone()));
        }
        Ok(user)
    }

    /// Create a new user
    pub fn create(&self, input: NewUser) -> AuditorResult<User> {
        let user = self.build(input)?;

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        audit_created(self.auditor, &user)?;
        tracing::debug!(user = %user.id, "Created user");

        Ok(user)
    }

    /// Create several users as one bulk operation
    ///
    /// All inputs are validated before anything is stored.
    pub fn create_many(&self, inputs: Vec<NewUser>) -> AuditorResult<Vec<User>> {
        let mut users: Vec<User> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let user = self.build(input)?;
            if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
                return Err(AuditorError::email_taken(user.email));
            }
            users.push(user);
        }

        for user in &users {
            self.storage.users.upsert(user.clone())?;
        }
        self.storage.users.save()?;

        let records = users
            .iter()
            .map(|u| -> AuditorResult<RecordPair> {
                Ok(RecordPair::new(u.record_id(), None, Some(u.snapshot()?)))
            })
            .collect::<AuditorResult<Vec<_>>>()?;
        self.auditor
            .record_bulk(BulkChange::new(AuditEvent::Created, User::TABLE, records));

        Ok(users)
    }

    /// All users, oldest first
    pub fn list(&self) -> AuditorResult<Vec<User>> {
        self.storage.users.get_all()
    }

    pub fn get(&self, id: UserId) -> AuditorResult<Option<User>> {
        self.storage.users.get(id)
    }

    /// Find a user by email, full ID, or short display ID
    pub fn find(&self, identifier: &str) -> AuditorResult<Option<User>> {
        if let Some(user) = self.storage.users.get_by_email(identifier)? {
            return Ok(Some(user));
        }

        if let Ok(id) = identifier.parse::<UserId>() {
            return self.storage.users.get(id);
        }

        self.storage.users.get_by_short_id(identifier)
    }

    /// Like [`find`](Self::find) but a missing user is an error
    pub fn require(&self, identifier: &str) -> AuditorResult<User> {
        self.find(identifier)?
            .ok_or_else(|| AuditorError::user_not_found(identifier))
    }

    /// Update a user
    pub fn update(&self, id: UserId, changes: UserUpdate) -> AuditorResult<User> {
        let before = self
            .storage
            .users
            .get(id)?
            .ok_or_else(|| AuditorError::user_not_found(id.to_string()))?;

        let mut user = before.clone();

        if let Some(name) = changes.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = changes.email {
            let email = email.trim().to_string();
            if self.storage.users.email_exists(&email, Some(id))? {
                return Err(AuditorError::email_taken(email));
            }
            user.email = email;
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone).filter(|p| !p.trim().is_empty());
        }
        if let Some(password) = changes.password {
            user.password = password;
        }
        if let Some(status) = changes.status {
            user.status = status;
        }

        user.touch();
        user.validate()
            .map_err(|e| AuditorError::Validation(e.to_string()))?;

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        audit_updated(self.auditor, &before, &user)?;

        Ok(user)
    }

    /// Delete a user
    pub fn delete(&self, id: UserId) -> AuditorResult<User> {
        let user = self
            .storage
            .users
            .delete(id)?
            .ok_or_else(|| AuditorError::user_not_found(id.to_string()))?;
        self.storage.users.save()?;

        audit_deleted(self.auditor, &user)?;

        Ok(user)
    }

    fn matching(&self, condition: &Snapshot) -> AuditorResult<Vec<User>> {
        if condition.is_empty() {
            return Err(AuditorError::Validation(
                "Bulk operations require at least one condition".into(),
            ));
        }

        let mut matched = Vec::new();
        for user in self.storage.users.get_all()? {
            if user.snapshot()?.matches(condition) {
                matched.push(user);
            }
        }
        Ok(matched)
    }

    /// Apply `changes` to every user matching `condition`
    ///
    /// Returns the updated users. A condition matching nothing still leaves
    /// a bulk audit trace.
    pub fn bulk_update(&self, condition: &Snapshot, changes: &Snapshot) -> AuditorResult<Vec<User>> {
        if changes.is_empty() {
            return Err(AuditorError::Validation("No changes given".into()));
        }

        let before = self.matching(condition)?;
        let mut after = Vec::with_capacity(before.len());
        for user in &before {
            let mut updated = apply_changes(user, changes)?;
            updated.touch();
            updated
                .validate()
                .map_err(|e| AuditorError::Validation(e.to_string()))?;
            after.push(updated);
        }

        for user in &after {
            self.storage.users.upsert(user.clone())?;
        }
        if !after.is_empty() {
            self.storage.users.save()?;
        }

        let records = before
            .iter()
            .zip(&after)
            .map(|(old, new)| -> AuditorResult<RecordPair> {
                Ok(RecordPair::new(
                    new.record_id(),
                    Some(old.snapshot()?),
                    Some(new.snapshot()?),
                ))
            })
            .collect::<AuditorResult<Vec<_>>>()?;

        self.auditor.record_bulk(
            BulkChange::new(AuditEvent::Updated, User::TABLE, records)
                .with_condition(FieldValue::from(condition.clone()))
                .with_attributes(changes.clone()),
        );

        tracing::debug!(count = after.len(), "Bulk updated users");
        Ok(after)
    }

    /// Delete every user matching `condition`; returns the deleted users
    pub fn bulk_delete(&self, condition: &Snapshot) -> AuditorResult<Vec<User>> {
        let matched = self.matching(condition)?;

        for user in &matched {
            self.storage.users.delete(user.id)?;
        }
        if !matched.is_empty() {
            self.storage.users.save()?;
        }

        let records = matched
            .iter()
            .map(|u| -> AuditorResult<RecordPair> {
                Ok(RecordPair::new(u.record_id(), Some(u.snapshot()?), None))
            })
            .collect::<AuditorResult<Vec<_>>>()?;

        self.auditor.record_bulk(
            BulkChange::new(AuditEvent::Deleted, User::TABLE, records)
                .with_condition(FieldValue::from(condition.clone())),
        );

        tracing::debug!(count = matched.len(), "Bulk deleted users");
        Ok(matched)
    }

    pub fn count(&self) -> AuditorResult<usize> {
        self.storage.users.count()
    }

    /// The user behind a creation audit's actor, limited to the configured
    /// creator fields
    ///
    /// `None` when the actor type is not resolvable or no such user exists.
    /// Fields masked by the users policy stay masked.
    pub fn resolve_actor(&self, actor: &Creator) -> AuditorResult<Option<Snapshot>> {
        let creators = self.auditor.creator_policy();
        if !creators.resolves(actor.actor_type.as_deref()) {
            return Ok(None);
        }
        let Some(actor_id) = actor.actor_id.as_deref() else {
            return Ok(None);
        };

        let user = match actor_id.parse::<UserId>() {
            Ok(id) => self.storage.users.get(id)?,
            Err(_) => self.storage.users.get_by_short_id(actor_id)?,
        };
        let Some(user) = user else {
            tracing::debug!(actor_id, "No user matches creator actor");
            return Ok(None);
        };

        let masked = RedactionPolicy::new()
            .mask(self.auditor.policies().resolve(User::TABLE).redaction.mask);
        Ok(Some(redact(&project(&user.snapshot()?, &creators.fields), &masked)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{
        ActorContext, AuditEntry, BULK_RECORD_ID, MASK_SENTINEL, TAG_AFFECTED_COUNT, TAG_WHERE,
    };
    use crate::services::test_support::harness;

    fn john() -> NewUser {
        NewUser::new("John Doe", "john@example.com", "secret123").phone("555-1234")
    }

    fn carol() -> NewUser {
        NewUser::new("Carol Wilson", "carol@example.com", "secret456").phone("555-5678")
    }

    fn text<'e>(values: &'e Option<Snapshot>, field: &str) -> Option<&'e str> {
        values.as_ref()?.get(field)?.as_str()
    }

    fn by_event(entries: &[AuditEntry], event: AuditEvent) -> Vec<AuditEntry> {
        entries.iter().filter(|e| e.event == event).cloned().collect()
    }

    #[tokio::test]
    async fn test_create_audits_redacted_snapshot() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);

        let user = ActorContext::new("admin-123")
            .with_actor_type("User")
            .with_ip("192.168.1.100")
            .scope(async { service.create(john()) })
            .await
            .unwrap();
        h.auditor.flush().await;

        let entries = h.store.entries().await;
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.event, AuditEvent::Created);
        assert_eq!(entry.table, "users");
        assert_eq!(entry.record_id, user.record_id());
        assert_eq!(entry.actor_id.as_deref(), Some("admin-123"));
        assert_eq!(entry.ip.as_deref(), Some("192.168.1.100"));
        assert!(entry.old_values.is_none());

        let values = entry.new_values.as_ref().unwrap();
        assert_eq!(values.get("password").and_then(FieldValue::as_str), Some(MASK_SENTINEL));
        assert!(!values.contains("id"));
        assert!(!values.contains("created_at"));
        assert!(!values.contains("updated_at"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);

        service.create(john()).unwrap();
        let err = service
            .create(NewUser::new("Other", "JOHN@example.com", "pw"))
            .unwrap_err();
        h.auditor.flush().await;

        assert!(matches!(err, AuditorError::Duplicate { .. }));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_records_full_state() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        let user = service.create(john()).unwrap();

        service
            .update(
                user.id,
                UserUpdate {
                    phone: Some("555-UPDATED".into()),
                    ..UserUpdate::default()
                },
            )
            .unwrap();
        h.auditor.flush().await;

        let updates = by_event(&h.store.entries().await, AuditEvent::Updated);
        assert_eq!(updates.len(), 1);
        let entry = &updates[0];
        assert_eq!(text(&entry.old_values, "phone"), Some("555-1234"));
        assert_eq!(text(&entry.new_values, "phone"), Some("555-UPDATED"));
        assert_eq!(text(&entry.old_values, "name"), Some("John Doe"));
        assert_eq!(text(&entry.new_values, "password"), Some(MASK_SENTINEL));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);

        let err = service.update(UserId::new(), UserUpdate::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_audits_old_state() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        let user = service.create(john()).unwrap();

        service.delete(user.id).unwrap();
        h.auditor.flush().await;

        assert_eq!(service.count().unwrap(), 0);
        let deletes = by_event(&h.store.entries().await, AuditEvent::Deleted);
        assert_eq!(deletes.len(), 1);
        assert!(deletes[0].new_values.is_none());
        assert_eq!(text(&deletes[0].old_values, "email"), Some("john@example.com"));
    }

    #[tokio::test]
    async fn test_find_by_email_and_ids() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        let user = service.create(john()).unwrap();

        assert_eq!(service.find("john@example.com").unwrap(), Some(user.clone()));
        assert_eq!(service.find(&user.record_id()).unwrap(), Some(user.clone()));
        assert_eq!(service.find(&user.id.to_string()).unwrap(), Some(user));
        assert!(service.require("nobody@example.com").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_many_is_one_bulk_operation() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);

        let users = service
            .create_many(vec![
                john(),
                carol(),
                NewUser::new("Bob Johnson", "bob@example.com", "secret789"),
            ])
            .unwrap();
        h.auditor.flush().await;

        assert_eq!(users.len(), 3);
        let entries = h.store.entries().await;
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.event, AuditEvent::Created);
            assert_eq!(entry.tags.get(TAG_AFFECTED_COUNT), Some(&FieldValue::Integer(3)));
            assert!(entry.tags.get(TAG_WHERE).is_none());
        }
    }

    #[tokio::test]
    async fn test_create_many_validates_everything_first() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);

        let err = service
            .create_many(vec![john(), NewUser::new("Dup", "john@example.com", "pw")])
            .unwrap_err();
        h.auditor.flush().await;

        assert!(matches!(err, AuditorError::Duplicate { .. }));
        assert_eq!(service.count().unwrap(), 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_bulk_update_audits_each_match() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        service.create(john()).unwrap();
        service.create(carol()).unwrap();
        service
            .create(NewUser::new("Bob Johnson", "bob@example.com", "secret789"))
            .unwrap();
        let archived = Snapshot::new().with("status", "archived");
        for email in ["john@example.com", "carol@example.com"] {
            let id = service.require(email).unwrap().id;
            service
                .update(
                    id,
                    UserUpdate {
                        status: Some("archived".into()),
                        ..UserUpdate::default()
                    },
                )
                .unwrap();
        }

        let updated = service
            .bulk_update(&archived, &Snapshot::new().with("phone", "555-NEW-PHONE"))
            .unwrap();
        h.auditor.flush().await;

        assert_eq!(updated.len(), 2);
        let bulk: Vec<_> = by_event(&h.store.entries().await, AuditEvent::Updated)
            .into_iter()
            .filter(|e| e.tags.contains_key(TAG_WHERE))
            .collect();
        assert_eq!(bulk.len(), 2);
        for entry in &bulk {
            assert_eq!(text(&entry.new_values, "phone"), Some("555-NEW-PHONE"));
            assert_eq!(entry.tags.get(TAG_AFFECTED_COUNT), Some(&FieldValue::Integer(2)));
            assert_eq!(entry.tags.get(TAG_WHERE), Some(&FieldValue::from(archived.clone())));
        }
    }

    #[tokio::test]
    async fn test_bulk_update_without_matches_leaves_trace() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        service.create(john()).unwrap();

        let updated = ActorContext::new("admin-123")
            .scope(async {
                service.bulk_update(
                    &Snapshot::new().with("status", "nonexistent"),
                    &Snapshot::new().with("status", "inactive"),
                )
            })
            .await
            .unwrap();
        h.auditor.flush().await;

        assert!(updated.is_empty());
        let updates = by_event(&h.store.entries().await, AuditEvent::Updated);
        assert_eq!(updates.len(), 1);
        let entry = &updates[0];
        assert_eq!(entry.record_id, BULK_RECORD_ID);
        assert!(entry.old_values.is_none());
        assert_eq!(text(&entry.new_values, "status"), Some("inactive"));
        assert_eq!(entry.actor_id.as_deref(), Some("admin-123"));
        assert_eq!(entry.tags.get(TAG_AFFECTED_COUNT), Some(&FieldValue::Integer(0)));
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        service.create(john()).unwrap();
        service.create(carol()).unwrap();

        let deleted = service
            .bulk_delete(&Snapshot::new().with("status", "active"))
            .unwrap();
        h.auditor.flush().await;

        assert_eq!(deleted.len(), 2);
        assert_eq!(service.count().unwrap(), 0);
        let deletes = by_event(&h.store.entries().await, AuditEvent::Deleted);
        assert_eq!(deletes.len(), 2);
        for entry in &deletes {
            assert!(entry.new_values.is_none());
            assert_eq!(text(&entry.old_values, "password"), Some(MASK_SENTINEL));
            assert_eq!(entry.tags.get(TAG_AFFECTED_COUNT), Some(&FieldValue::Integer(2)));
        }
    }

    #[tokio::test]
    async fn test_bulk_requires_condition() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);

        assert!(service.bulk_delete(&Snapshot::new()).unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_resolve_actor() {
        let h = harness();
        let service = UserService::new(&h.storage, &h.auditor);
        let john = service.create(john()).unwrap();

        let by_full_id = Creator {
            actor_id: Some(john.record_id()),
            actor_type: Some("User".into()),
        };
        let creator = service.resolve_actor(&by_full_id).unwrap().unwrap();
        assert_eq!(creator.fields().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(text(&Some(creator), "name"), Some("John Doe"));

        let by_short_id = Creator {
            actor_id: Some(john.id.to_string()),
            actor_type: Some("User".into()),
        };
        assert!(service.resolve_actor(&by_short_id).unwrap().is_some());

        let system = Creator {
            actor_id: Some(john.record_id()),
            actor_type: Some("System".into()),
        };
        assert!(service.resolve_actor(&system).unwrap().is_none());

        let unknown = Creator {
            actor_id: Some("admin-123".into()),
            actor_type: Some("User".into()),
        };
        assert!(service.resolve_actor(&unknown).unwrap().is_none());
    }
}
