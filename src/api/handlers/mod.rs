//! HTTP request handlers.

pub mod auth_handler;
pub mod product_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use product_handler::{product_read_routes, product_write_routes};
pub use user_handler::user_routes;
