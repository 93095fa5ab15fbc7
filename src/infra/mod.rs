//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - Repository ports with SQL and in-memory adapters
//! - Unit of Work for transaction management

pub mod db;
pub mod memory;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use memory::InMemoryStore;
pub use repositories::{ProductFilters, ProductRepository, ProductStore, UserRepository, UserStore};
pub use unit_of_work::{
    run_in_unit_of_work, Persistence, SeaOrmUnitOfWork, UnitOfWork, UnitOfWorkFactory,
    UnitOfWorkFuture,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockProductRepository, MockUserRepository};
