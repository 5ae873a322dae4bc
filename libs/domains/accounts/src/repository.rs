use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::{DeleteMode, ReadScope, SoftDeletable};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Repository trait for User persistence
///
/// Email and phone number are unique over every stored row, soft-deleted
/// ones included. Every read names its [`ReadScope`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken email or phone is a unique violation
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid, scope: ReadScope) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str, scope: ReadScope) -> UserResult<Option<User>>;

    async fn get_by_phone(&self, phone_number: &str, scope: ReadScope)
    -> UserResult<Option<User>>;

    /// The user allowed to log in with this phone number: active and not deleted
    async fn find_active_by_phone(&self, phone_number: &str) -> UserResult<Option<User>>;

    /// Newest first, paged by the filter's limit and offset
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Number of users matching the filter, ignoring paging
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Persist every column of an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> UserResult<()>;

    /// Soft delete stamps the flag and time on any stored row, so repeating
    /// it moves `deleted_at` forward. `false` only when no such row exists.
    async fn delete(&self, id: Uuid, mode: DeleteMode) -> UserResult<bool>;

    /// Clear the deletion and persist; harmless on a user that was never
    /// deleted. `None` when no such row exists.
    async fn restore(&self, id: Uuid) -> UserResult<Option<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Unique check over every row except `own_id`
fn check_unique(
    users: &HashMap<Uuid, User>,
    candidate: &User,
    own_id: Option<Uuid>,
) -> UserResult<()> {
    let others = || users.values().filter(move |u| Some(u.id) != own_id);

    if others().any(|u| u.email.eq_ignore_ascii_case(&candidate.email)) {
        return Err(UserError::duplicate_email());
    }
    if others().any(|u| u.phone_number == candidate.phone_number) {
        return Err(UserError::duplicate_phone());
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        check_unique(&users, &user, None)?;

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, role = %user.role, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid, scope: ReadScope) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| u.is_visible_in(scope)).cloned())
    }

    async fn get_by_email(&self, email: &str, scope: ReadScope) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.is_visible_in(scope))
            .cloned())
    }

    async fn get_by_phone(
        &self,
        phone_number: &str,
        scope: ReadScope,
    ) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.phone_number == phone_number && u.is_visible_in(scope))
            .cloned())
    }

    async fn find_active_by_phone(&self, phone_number: &str) -> UserResult<Option<User>> {
        let user = self.get_by_phone(phone_number, ReadScope::Active).await?;
        Ok(user.filter(|u| u.is_active))
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        check_unique(&users, &user, Some(user.id))?;

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> UserResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn delete(&self, id: Uuid, mode: DeleteMode) -> UserResult<bool> {
        let mut users = self.users.write().await;

        let deleted = match mode {
            DeleteMode::Hard => users.remove(&id).is_some(),
            DeleteMode::Soft => match users.get_mut(&id) {
                Some(user) => {
                    let now = Utc::now();
                    user.mark_deleted(now);
                    user.updated_at = now;
                    true
                }
                None => false,
            },
        };

        if deleted {
            tracing::info!(user_id = %id, ?mode, "Deleted user");
        }
        Ok(deleted)
    }

    async fn restore(&self, id: Uuid) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.restore();
        user.updated_at = Utc::now();

        tracing::info!(user_id = %id, "Restored user");
        Ok(Some(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateUser, Role};
    use chrono::Duration;

    fn user(phone: &str, email: &str) -> User {
        User::new(
            CreateUser {
                email: email.to_string(),
                phone_number: phone.to_string(),
                first_name: "Juma".to_string(),
                last_name: "Said".to_string(),
                password: "unused".to_string(),
                role: Role::Household,
                ward_id: None,
            },
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_unique_phone_and_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("0711000001", "a@example.com")).await.unwrap();

        let err = repo
            .create(user("0711000001", "b@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UserError::UniqueConstraintViolation { field: "phone_number" }
        ));

        let err = repo
            .create(user("0711000002", "A@EXAMPLE.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UserError::UniqueConstraintViolation { field: "email" }
        ));

        assert_eq!(repo.count(UserFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_still_hold_uniqueness() {
        let repo = InMemoryUserRepository::new();
        let existing = repo.create(user("0711000001", "a@example.com")).await.unwrap();
        assert!(repo.delete(existing.id, DeleteMode::Soft).await.unwrap());

        let err = repo
            .create(user("0711000001", "new@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::UniqueConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_scoped_reads() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("0711000001", "a@example.com")).await.unwrap();
        repo.delete(created.id, DeleteMode::Soft).await.unwrap();

        assert!(repo.get_by_id(created.id, ReadScope::Active).await.unwrap().is_none());
        assert!(repo.get_by_id(created.id, ReadScope::All).await.unwrap().is_some());
        assert!(
            repo.get_by_phone("0711000001", ReadScope::DeletedOnly)
                .await
                .unwrap()
                .is_some()
        );
        assert!(repo.find_active_by_phone("0711000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_soft_delete_restamps() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("0711000001", "a@example.com")).await.unwrap();

        assert!(repo.delete(created.id, DeleteMode::Soft).await.unwrap());
        let first = repo.get_by_id(created.id, ReadScope::All).await.unwrap().unwrap();
        assert!(repo.delete(created.id, DeleteMode::Soft).await.unwrap());
        let second = repo.get_by_id(created.id, ReadScope::All).await.unwrap().unwrap();

        assert!(second.is_deleted());
        assert!(second.deleted_at() >= first.deleted_at());
        assert!(!repo.delete(Uuid::now_v7(), DeleteMode::Soft).await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_and_hard_delete() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("0711000001", "a@example.com")).await.unwrap();

        assert!(repo.restore(Uuid::now_v7()).await.unwrap().is_none());
        let untouched = repo.restore(created.id).await.unwrap().unwrap();
        assert!(!untouched.is_deleted());

        repo.delete(created.id, DeleteMode::Soft).await.unwrap();
        let restored = repo.restore(created.id).await.unwrap().unwrap();
        assert!(!restored.is_deleted());
        assert_eq!(restored.deleted_at(), None);

        assert!(repo.delete(created.id, DeleteMode::Hard).await.unwrap());
        assert!(repo.get_by_id(created.id, ReadScope::All).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_excludes_self_from_unique_check() {
        let repo = InMemoryUserRepository::new();
        let mut first = repo.create(user("0711000001", "a@example.com")).await.unwrap();
        repo.create(user("0711000002", "b@example.com")).await.unwrap();

        first.first_name = "Rehema".to_string();
        assert!(repo.update(first.clone()).await.is_ok());

        first.phone_number = "0711000002".to_string();
        assert!(matches!(
            repo.update(first).await,
            Err(UserError::UniqueConstraintViolation { field: "phone_number" })
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let repo = InMemoryUserRepository::new();
        let mut oldest = user("0711000001", "a@example.com");
        oldest.created_at -= Duration::minutes(10);
        let mut newest = user("0711000002", "b@example.com");
        newest.role = Role::Collector;

        repo.create(oldest.clone()).await.unwrap();
        repo.create(newest.clone()).await.unwrap();

        let listed = repo.list(UserFilter::default()).await.unwrap();
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[1].id, oldest.id);

        let page = repo
            .list(UserFilter {
                limit: 1,
                offset: 1,
                ..UserFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, oldest.id);

        let collectors = UserFilter {
            role: Some(Role::Collector),
            ..UserFilter::default()
        };
        assert_eq!(repo.count(collectors).await.unwrap(), 1);
    }
}
