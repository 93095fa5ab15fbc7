//! Domain rule violations.

use thiserror::Error;

/// Errors raised while constructing or updating domain objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Product name is required")]
    InvalidProductName,

    #[error("Invalid money amount: {0}")]
    InvalidAmount(String),

    #[error("Stock units must be a non-negative integer, got {0}")]
    InvalidStock(i64),

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password hash is required")]
    MissingPasswordHash,
}

impl DomainError {
    /// Stable code reported to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidProductName => "INVALID_PRODUCT_NAME",
            DomainError::InvalidAmount(_) => "INVALID_AMOUNT",
            DomainError::InvalidStock(_) => "INVALID_STOCK",
            DomainError::InvalidEmail => "INVALID_EMAIL",
            DomainError::MissingPasswordHash => "MISSING_PASSWORD_HASH",
        }
    }
}
