//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{Page, PaginationParams};
pub use response::{Created, NoContent};
