//! Security helpers - password hashing and signed tokens.

mod password;
mod token;

pub use password::{hash_password, verify_password, PasswordHasher};
pub use token::{AccessClaims, TokenResponse, TokenService};
