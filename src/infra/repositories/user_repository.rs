//! User repository: port and SeaORM adapter.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, NotSet, QueryFilter, Set, SqlErr,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::session::Session;
use crate::domain::{normalize_email, User, UserId};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return its assigned id
    async fn create(&self, user: &User) -> AppResult<UserId>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find user by email address (normalized before lookup)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Overwrite a stored user; `NotFound` if it does not exist
    async fn update(&self, user: &User) -> AppResult<()>;
}

/// SeaORM implementation bound to one unit of work
pub struct UserStore {
    session: Session,
}

impl UserStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

/// A concurrent registration can slip past the service's existence check;
/// the unique index on `email` still decides, and the loser sees a conflict.
fn duplicate_email_as_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("User"),
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: &User) -> AppResult<UserId> {
        let conn = self.session.conn().await?;
        let now = Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            email: Set(user.email().to_string()),
            password_hash: Set(user.password_hash().to_string()),
            name: Set(user.name().map(str::to_string)),
            is_active: Set(user.is_active()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = UserEntity::insert(active_model)
            .exec(&*conn)
            .await
            .map_err(duplicate_email_as_conflict)?;
        Ok(UserId(result.last_insert_id))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let conn = self.session.conn().await?;
        UserEntity::find_by_id(id.0)
            .one(&*conn)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let conn = self.session.conn().await?;
        UserEntity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&*conn)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let id = user.id().ok_or(AppError::NotFound)?;
        let conn = self.session.conn().await?;

        let existing = UserEntity::find_by_id(id.0)
            .one(&*conn)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        active.password_hash = Set(user.password_hash().to_string());
        active.name = Set(user.name().map(str::to_string));
        active.is_active = Set(user.is_active());
        active.updated_at = Set(Utc::now());

        active.update(&*conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserChanges;
    use crate::infra::Database;
    use sea_orm::TransactionTrait;

    async fn store() -> (Database, UserStore) {
        let db = Database::in_memory().await.unwrap();
        let txn = db.connection().begin().await.unwrap();
        (db, UserStore::new(Session::new(txn)))
    }

    #[tokio::test]
    async fn test_create_and_find_by_email_normalizes() {
        let (_db, store) = store().await;
        let user = User::create("Jane@Example.com", "hash", Some("Jane".into())).unwrap();
        let id = store.create(&user).await.unwrap();

        let found = store.find_by_email("  JANE@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id(), Some(id));
        assert_eq!(found.email(), "jane@example.com");
        assert_eq!(found.name(), Some("Jane"));
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_by_store() {
        let (_db, store) = store().await;
        let user = User::create("dup@example.com", "hash", None).unwrap();
        store.create(&user).await.unwrap();

        let again = store.create(&user).await;
        assert!(matches!(again, Err(AppError::Conflict(ref entity)) if entity == "User"));
    }

    #[tokio::test]
    async fn test_update_changes_profile() {
        let (_db, store) = store().await;
        let id = store
            .create(&User::create("a@b.c", "hash", None).unwrap())
            .await
            .unwrap();
        let stored = store.find_by_id(id).await.unwrap().unwrap();

        let changed = stored
            .with_updates(UserChanges {
                name: Some("Ann".into()),
                is_active: Some(false),
                password_hash: Some("rehash".into()),
            })
            .unwrap();
        store.update(&changed).await.unwrap();

        let reloaded = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.name(), Some("Ann"));
        assert_eq!(reloaded.password_hash(), "rehash");
        assert!(!reloaded.is_active());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_db, store) = store().await;
        let now = Utc::now();
        let ghost = User::create("ghost@b.c", "hash", None)
            .unwrap()
            .persisted(UserId(5), now, now);

        assert!(matches!(store.update(&ghost).await, Err(AppError::NotFound)));
        assert!(store.find_by_id(UserId(5)).await.unwrap().is_none());
    }
}
