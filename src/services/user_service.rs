//! User service - Handles profile reads and changes.
//!
//! The email address is fixed at registration; only the display name,
//! password and active flag change here.

use std::sync::Arc;

use async_trait::async_trait;

use super::auth_service::hash_blocking;
use crate::domain::{User, UserChanges, UserId};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWorkFactory;
use crate::security::PasswordHasher;
use crate::with_unit_of_work;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get(&self, id: UserId) -> AppResult<User>;

    /// Change display name and/or password (rehashed)
    async fn update_profile(
        &self,
        id: UserId,
        name: Option<String>,
        password: Option<String>,
    ) -> AppResult<User>;

    /// Clear the active flag; the account can no longer log in
    async fn deactivate(&self, id: UserId) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager {
    factory: Arc<dyn UnitOfWorkFactory>,
    hasher: PasswordHasher,
}

impl UserManager {
    pub fn new(factory: Arc<dyn UnitOfWorkFactory>, hasher: PasswordHasher) -> Self {
        Self { factory, hasher }
    }

    async fn apply(&self, id: UserId, changes: UserChanges) -> AppResult<User> {
        with_unit_of_work!(self.factory.as_ref(), |uow| {
            let existing = uow.users().find_by_id(id).await?.ok_or_not_found()?;
            let updated = existing.with_updates(changes)?;
            uow.users().update(&updated).await?;
            let stored = uow.users().find_by_id(id).await?.ok_or_not_found()?;
            uow.commit().await?;
            Ok(stored)
        })
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get(&self, id: UserId) -> AppResult<User> {
        with_unit_of_work!(self.factory.as_ref(), |uow| {
            uow.users().find_by_id(id).await?.ok_or_not_found()
        })
    }

    async fn update_profile(
        &self,
        id: UserId,
        name: Option<String>,
        password: Option<String>,
    ) -> AppResult<User> {
        let password_hash = match password {
            Some(password) => Some(hash_blocking(&self.hasher, password).await?),
            None => None,
        };

        let user = self
            .apply(
                id,
                UserChanges {
                    name,
                    password_hash,
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %id, "User profile updated");
        Ok(user)
    }

    async fn deactivate(&self, id: UserId) -> AppResult<()> {
        self.apply(
            id,
            UserChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = %id, "User deactivated");
        Ok(())
    }
}
