//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::UnitOfWorkFactory;
use crate::services::{AuthService, ProductService, ServiceContainer, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Product catalog service
    pub product_service: Arc<dyn ProductService>,
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User profile service
    pub user_service: Arc<dyn UserService>,
    /// Store behind the services, pinged by `/health`
    pub store: Arc<dyn UnitOfWorkFactory>,
}

impl AppState {
    /// Create application state with every service wired against `store`.
    pub fn from_config(store: Arc<dyn UnitOfWorkFactory>, config: &Config) -> AppResult<Self> {
        Ok(Self::from_container(&Services::from_factory(store, config)?))
    }

    /// Create application state from any service container.
    pub fn from_container(container: &dyn ServiceContainer) -> Self {
        Self {
            product_service: container.products(),
            auth_service: container.auth(),
            user_service: container.users(),
            store: container.store(),
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        product_service: Arc<dyn ProductService>,
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        store: Arc<dyn UnitOfWorkFactory>,
    ) -> Self {
        Self {
            product_service,
            auth_service,
            user_service,
            store,
        }
    }
}
