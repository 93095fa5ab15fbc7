//! Service Container - Centralized service access.
//!
//! SOLID (DIP): Depends on service traits, not implementations.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, ProductCatalog, ProductService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Persistence, UnitOfWorkFactory};
use crate::security::{PasswordHasher, TokenService};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn products(&self) -> Arc<dyn ProductService>;

    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    /// Store behind the services, for health checks
    fn store(&self) -> Arc<dyn UnitOfWorkFactory>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    product_service: Arc<dyn ProductService>,
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    store: Arc<dyn UnitOfWorkFactory>,
}

impl Services {
    /// Wire every service against one store.
    pub fn from_factory(store: Arc<dyn UnitOfWorkFactory>, config: &Config) -> AppResult<Self> {
        let hasher = PasswordHasher::new(config.password_hash_cost)?;
        let tokens = TokenService::from_config(config);

        Ok(Self {
            product_service: Arc::new(ProductCatalog::new(store.clone())),
            auth_service: Arc::new(Authenticator::new(store.clone(), hasher.clone(), tokens)),
            user_service: Arc::new(UserManager::new(store.clone(), hasher)),
            store,
        })
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> AppResult<Self> {
        Self::from_factory(Arc::new(Persistence::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn store(&self) -> Arc<dyn UnitOfWorkFactory> {
        self.store.clone()
    }
}
