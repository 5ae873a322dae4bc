use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::{BaseRepository, DeleteMode, ReadScope};
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{User, UserFilter},
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository
///
/// Writes pre-check uniqueness inside the transaction and still translate
/// a unique-index violation from the insert, so a concurrent writer
/// surfaces as the same error.
pub struct PgUserRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.base.db()
    }
}

fn db_error(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

fn map_write_error(e: DbErr) -> UserError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("phone_number") => {
            UserError::duplicate_phone()
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => UserError::duplicate_email(),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            UserError::Validation("Unknown ward".to_string())
        }
        _ => db_error(e),
    }
}

fn scoped(scope: ReadScope) -> Select<entity::Entity> {
    entity::Entity::find().filter(scope.condition(entity::Column::IsDeleted))
}

/// Case-insensitive match on the email column
fn email_eq(email: &str) -> Condition {
    Condition::all()
        .add(Expr::expr(Func::lower(Expr::col(entity::Column::Email))).eq(email.to_lowercase()))
}

fn filtered(filter: &UserFilter) -> Select<entity::Entity> {
    let mut condition = Condition::all();
    if let Some(role) = filter.role {
        condition = condition.add(entity::Column::Role.eq(role));
    }
    if let Some(ward_id) = filter.ward_id {
        condition = condition.add(entity::Column::WardId.eq(ward_id));
    }
    scoped(filter.scope).filter(condition)
}

/// Email then phone, over every row other than `own_id`
async fn check_unique<C: ConnectionTrait>(
    conn: &C,
    user: &User,
    own_id: Option<Uuid>,
) -> UserResult<()> {
    let others = || match own_id {
        Some(id) => entity::Entity::find().filter(entity::Column::Id.ne(id)),
        None => entity::Entity::find(),
    };

    let email_taken = others()
        .filter(email_eq(&user.email))
        .one(conn)
        .await
        .map_err(db_error)?
        .is_some();
    if email_taken {
        return Err(UserError::duplicate_email());
    }

    let phone_taken = others()
        .filter(entity::Column::PhoneNumber.eq(&user.phone_number))
        .one(conn)
        .await
        .map_err(db_error)?
        .is_some();
    if phone_taken {
        return Err(UserError::duplicate_phone());
    }

    Ok(())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let txn = self.db().begin().await.map_err(db_error)?;

        check_unique(&txn, &user, None).await?;

        let model = entity::ActiveModel::from(&user)
            .insert(&txn)
            .await
            .map_err(map_write_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(user_id = %model.id, role = %model.role, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid, scope: ReadScope) -> UserResult<Option<User>> {
        let model = scoped(scope)
            .filter(entity::Column::Id.eq(id))
            .one(self.db())
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str, scope: ReadScope) -> UserResult<Option<User>> {
        let model = scoped(scope)
            .filter(email_eq(email))
            .one(self.db())
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn get_by_phone(
        &self,
        phone_number: &str,
        scope: ReadScope,
    ) -> UserResult<Option<User>> {
        let model = scoped(scope)
            .filter(entity::Column::PhoneNumber.eq(phone_number))
            .one(self.db())
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn find_active_by_phone(&self, phone_number: &str) -> UserResult<Option<User>> {
        let model = scoped(ReadScope::Active)
            .filter(entity::Column::PhoneNumber.eq(phone_number))
            .filter(entity::Column::IsActive.eq(true))
            .one(self.db())
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let models = filtered(&filter)
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(self.db())
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        filtered(&filter).count(self.db()).await.map_err(db_error)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let txn = self.db().begin().await.map_err(db_error)?;

        entity::Entity::find_by_id(user.id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(UserError::NotFound(user.id))?;

        check_unique(&txn, &user, Some(user.id)).await?;

        let model = entity::ActiveModel::from(&user)
            .update(&txn)
            .await
            .map_err(map_write_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(user_id = %model.id, "Updated user");
        Ok(model.into())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> UserResult<()> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::LastLogin, Expr::value(at))
            .filter(entity::Column::Id.eq(id))
            .exec(self.db())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, mode: DeleteMode) -> UserResult<bool> {
        let deleted = match mode {
            DeleteMode::Hard => self.base.delete_by_id(id).await.map_err(db_error)?,
            DeleteMode::Soft => {
                let now = Utc::now();
                let result = entity::Entity::update_many()
                    .col_expr(entity::Column::IsDeleted, Expr::value(true))
                    .col_expr(entity::Column::DeletedAt, Expr::value(now))
                    .col_expr(entity::Column::UpdatedAt, Expr::value(now))
                    .filter(entity::Column::Id.eq(id))
                    .exec(self.db())
                    .await
                    .map_err(db_error)?;
                result.rows_affected > 0
            }
        };

        if deleted {
            tracing::info!(user_id = %id, ?mode, "Deleted user");
        }
        Ok(deleted)
    }

    async fn restore(&self, id: Uuid) -> UserResult<Option<User>> {
        let txn = self.db().begin().await.map_err(db_error)?;

        let Some(model) = entity::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        let mut active: entity::ActiveModel = model.into();
        active.is_deleted = Set(false);
        active.deleted_at = Set(None);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(user_id = %id, "Restored user");
        Ok(Some(model.into()))
    }
}
