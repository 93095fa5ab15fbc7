//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! Contains: Entities (`Product`, `User`), Value Objects (`Money`, `Stock`)
//! and the domain error taxonomy.

mod errors;
pub mod product;
pub mod user;
mod value_objects;

pub use errors::DomainError;
pub use product::{Product, ProductChanges, ProductId};
pub use user::{normalize_email, User, UserChanges, UserId, UserResponse};
pub use value_objects::{Money, Stock};
