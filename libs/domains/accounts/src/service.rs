use chrono::Utc;
use database::{DeleteMode, ReadScope};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserFilter};
use crate::otp::{OtpVerifier, StaticOtpVerifier};
use crate::password::{Argon2Hasher, PasswordHasher};
use crate::repository::UserRepository;

/// Service layer for account lifecycle and login
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    otp: Arc<dyn OtpVerifier>,
}

impl<R: UserRepository> UserService<R> {
    /// Argon2 hashing and the placeholder OTP code
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher: Arc::new(Argon2Hasher),
            otp: Arc::new(StaticOtpVerifier::default()),
        }
    }

    pub fn with_hasher(mut self, hasher: impl PasswordHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    pub fn with_otp_verifier(mut self, otp: impl OtpVerifier + 'static) -> Self {
        self.otp = Arc::new(otp);
        self
    }

    /// Create an active, unverified account with a hashed password
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let password_hash = self.hasher.hash(&input.password)?;
        let user = User::new(input, password_hash);

        self.repository.create(user).await
    }

    /// Validate and apply the whitelisted attributes, then persist once
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        let input = input.trimmed();
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self.get_user(id, ReadScope::Active).await?;
        user.apply_update(input);
        self.repository.update(user).await
    }

    /// Replace the stored digest; the old password is the caller's concern
    pub async fn change_password(&self, id: Uuid, new_password: &str) -> UserResult<()> {
        let mut user = self.get_user(id, ReadScope::Active).await?;

        user.password_hash = self.hasher.hash(new_password)?;
        user.updated_at = Utc::now();
        self.repository.update(user).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    pub async fn check_password(&self, id: Uuid, password: &str) -> UserResult<bool> {
        let user = self.get_user(id, ReadScope::Active).await?;
        Ok(self.hasher.verify(password, &user.password_hash))
    }

    pub async fn get_user(&self, id: Uuid, scope: ReadScope) -> UserResult<User> {
        self.repository
            .get_by_id(id, scope)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn get_user_by_phone(&self, phone_number: &str) -> UserResult<User> {
        self.repository
            .get_by_phone(phone_number, ReadScope::Active)
            .await?
            .ok_or_else(|| UserError::NotFoundByPhone(phone_number.to_string()))
    }

    /// A page of users plus the total matching the filter.
    /// The page never exceeds [`MAX_PAGE_SIZE`](crate::models::MAX_PAGE_SIZE) rows.
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<(Vec<User>, u64)> {
        let filter = filter.clamped();
        let total = self.repository.count(filter.clone()).await?;
        let users = self.repository.list(filter).await?;
        Ok((users, total))
    }

    /// The user who may log in with this phone number, if any
    pub async fn login_data(&self, phone_number: &str) -> UserResult<Option<User>> {
        self.repository.find_active_by_phone(phone_number.trim()).await
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<Option<User>> {
        let Some(user) = self.repository.get_by_email(email, ReadScope::Active).await? else {
            return Ok(None);
        };
        if !user.is_active || !self.hasher.verify(password, &user.password_hash) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Phone lookup, then password check against that account.
    /// `None` covers an unknown phone and a wrong password alike.
    pub async fn verify_login(
        &self,
        phone_number: &str,
        password: &str,
    ) -> UserResult<Option<User>> {
        let Some(candidate) = self.login_data(phone_number).await? else {
            return Ok(None);
        };
        let Some(mut user) = self.authenticate(&candidate.email, password).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        self.repository.record_login(user.id, now).await?;
        user.last_login = Some(now);

        Ok(Some(user))
    }

    /// Reports whether the code is valid; account state is left alone
    pub fn verify_otp(&self, phone_number: &str, code: &str) -> bool {
        self.otp.verify(phone_number, code)
    }

    /// NotFound only when the row is gone; soft-deleting twice succeeds
    pub async fn delete_user(&self, id: Uuid, mode: DeleteMode) -> UserResult<()> {
        if !self.repository.delete(id, mode).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    pub async fn restore_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .restore(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MAX_PAGE_SIZE, Role};
    use crate::otp::MockOtpVerifier;
    use crate::password::MockPasswordHasher;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn create_input(phone: &str, email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            phone_number: phone.to_string(),
            first_name: "Halima".to_string(),
            last_name: "Mwinyi".to_string(),
            password: "usafi-kwanza".to_string(),
            role: Role::Household,
            ward_id: None,
        }
    }

    fn plain_hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|plaintext| Ok(format!("digest:{}", plaintext)));
        hasher
            .expect_verify()
            .returning(|plaintext, digest| digest == format!("digest:{}", plaintext));
        hasher
    }

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new()).with_hasher(plain_hasher())
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let user = service()
            .create_user(create_input("0712000001", "halima@example.com"))
            .await
            .unwrap();

        assert_eq!(user.password_hash, "digest:usafi-kwanza");
        assert!(user.is_active);
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn test_create_user_with_argon2_verifies() {
        let service = UserService::new(InMemoryUserRepository::new());
        let user = service
            .create_user(create_input("0712000001", "halima@example.com"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "usafi-kwanza");
        assert!(service.check_password(user.id, "usafi-kwanza").await.unwrap());
        assert!(!service.check_password(user.id, "something-else").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_email() {
        let result = service()
            .create_user(create_input("0712000001", "not-an-email"))
            .await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_propagates_unique_violation() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(UserError::duplicate_email()));

        let service = UserService::new(repo).with_hasher(plain_hasher());
        let result = service
            .create_user(create_input("0712000001", "halima@example.com"))
            .await;

        assert!(matches!(
            result,
            Err(UserError::UniqueConstraintViolation { field: "email" })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let id = Uuid::now_v7();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .with(eq(id), eq(ReadScope::Active))
            .returning(|_, _| Ok(None));
        repo.expect_update().never();

        let service = UserService::new(repo);
        let result = service.update_user(id, UpdateUser::default()).await;

        assert!(matches!(result, Err(UserError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_update_trims_phone_before_unique_check() {
        let service = service();
        service
            .create_user(create_input("0712000001", "a@example.com"))
            .await
            .unwrap();
        let other = service
            .create_user(create_input("0712000002", "b@example.com"))
            .await
            .unwrap();

        let padded = UpdateUser {
            phone_number: Some("0712000001 ".to_string()),
            ..UpdateUser::default()
        };
        assert!(matches!(
            service.update_user(other.id, padded).await,
            Err(UserError::UniqueConstraintViolation { field: "phone_number" })
        ));

        let moved = UpdateUser {
            phone_number: Some(" 0712000003 ".to_string()),
            first_name: Some(" Rehema ".to_string()),
            ..UpdateUser::default()
        };
        let updated = service.update_user(other.id, moved).await.unwrap();
        assert_eq!(updated.phone_number, "0712000003");
        assert_eq!(updated.first_name, "Rehema");
        assert!(service.verify_login("0712000003", "usafi-kwanza").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_input_before_lookup() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().never();
        repo.expect_update().never();

        let service = UserService::new(repo);
        let input = UpdateUser {
            email: Some("not-an-email".to_string()),
            first_name: Some(String::new()),
            ..UpdateUser::default()
        };
        let result = service.update_user(Uuid::now_v7(), input).await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_password_then_login() {
        let service = service();
        let user = service
            .create_user(create_input("0712000001", "halima@example.com"))
            .await
            .unwrap();

        service.change_password(user.id, "new-secret-99").await.unwrap();

        assert!(service.verify_login("0712000001", "usafi-kwanza").await.unwrap().is_none());
        let logged_in = service
            .verify_login("0712000001", "new-secret-99")
            .await
            .unwrap()
            .unwrap();
        assert!(logged_in.last_login.is_some());

        let stored = service.get_user(user.id, ReadScope::Active).await.unwrap();
        assert_eq!(stored.last_login, logged_in.last_login);
    }

    #[tokio::test]
    async fn test_verify_login_unknown_phone_and_wrong_password_match() {
        let service = service();
        service
            .create_user(create_input("0712000001", "halima@example.com"))
            .await
            .unwrap();

        let unknown = service.verify_login("0799999999", "usafi-kwanza").await.unwrap();
        let wrong = service.verify_login("0712000001", "wrong").await.unwrap();

        assert!(unknown.is_none());
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn test_inactive_and_deleted_users_cannot_login() {
        let service = service();
        let inactive = service
            .create_user(create_input("0712000001", "a@example.com"))
            .await
            .unwrap();
        let mut stored = service.get_user(inactive.id, ReadScope::Active).await.unwrap();
        stored.is_active = false;
        service.repository.update(stored).await.unwrap();

        let deleted = service
            .create_user(create_input("0712000002", "b@example.com"))
            .await
            .unwrap();
        service.delete_user(deleted.id, DeleteMode::Soft).await.unwrap();

        assert!(service.verify_login("0712000001", "usafi-kwanza").await.unwrap().is_none());
        assert!(service.verify_login("0712000002", "usafi-kwanza").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_login_does_not_record() {
        let user = User::new(
            create_input("0712000001", "halima@example.com"),
            "digest:usafi-kwanza".to_string(),
        );
        let email = user.email.clone();

        let mut repo = MockUserRepository::new();
        let found = user.clone();
        repo.expect_find_active_by_phone()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_get_by_email()
            .withf(move |e, scope| e == email && *scope == ReadScope::Active)
            .returning(move |_, _| Ok(Some(user.clone())));
        repo.expect_record_login().never();

        let service = UserService::new(repo).with_hasher(plain_hasher());
        assert!(service.verify_login("0712000001", "wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_caps_page_size() {
        let mut repo = MockUserRepository::new();
        repo.expect_count().returning(|_| Ok(0));
        repo.expect_list()
            .withf(|filter| filter.limit == MAX_PAGE_SIZE && filter.offset == 5)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = UserService::new(repo);
        let filter = UserFilter {
            limit: 1_000_000,
            offset: 5,
            ..UserFilter::default()
        };
        let (users, total) = service.list_users(filter).await.unwrap();

        assert!(users.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_verify_otp_delegates() {
        let mut otp = MockOtpVerifier::new();
        otp.expect_verify()
            .withf(|phone, code| phone == "0712000001" && code == "4321")
            .returning(|_, _| true);

        let service = service().with_otp_verifier(otp);
        assert!(service.verify_otp("0712000001", "4321"));
    }

    #[tokio::test]
    async fn test_delete_and_restore_missing_user() {
        let service = service();
        let id = Uuid::now_v7();

        assert!(matches!(
            service.delete_user(id, DeleteMode::Hard).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.restore_user(id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_default_scope() {
        let service = service();
        let user = service
            .create_user(create_input("0712000001", "halima@example.com"))
            .await
            .unwrap();

        service.delete_user(user.id, DeleteMode::Soft).await.unwrap();
        service.delete_user(user.id, DeleteMode::Soft).await.unwrap();
        assert!(service.get_user(user.id, ReadScope::Active).await.is_err());

        let (deleted, total) = service
            .list_users(UserFilter {
                scope: ReadScope::DeletedOnly,
                ..UserFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(deleted[0].id, user.id);

        let restored = service.restore_user(user.id).await.unwrap();
        assert!(restored.soft_delete.deleted_at().is_none());
        assert!(service.get_user(user.id, ReadScope::Active).await.is_ok());
    }
}
