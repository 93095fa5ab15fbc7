//! Product catalog API
//!
//! A layered CRUD backend for a product catalog and user accounts,
//! built on Axum and SeaORM.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities and value objects (`Product`, `User`, `Money`, `Stock`)
//! - **services**: Use cases and the service facades over them
//! - **infra**: Database, repositories and the unit of work
//! - **security**: Password hashing and access tokens
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Load sample products
//! cargo run -- seed
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod security;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Money, Product, ProductId, Stock, User, UserId};
pub use errors::{AppError, AppResult};
