//! Product aggregate root.
//!
//! A `Product` can only be obtained through [`Product::create`] or by
//! deriving a new snapshot with [`Product::with_updates`], so every
//! instance in memory satisfies the catalog invariants: a non-blank name,
//! a normalized non-negative price and a non-negative stock count.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DomainError, Money, Stock};

/// Product identifier assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: Option<ProductId>,
    name: String,
    price: Money,
    stock: Stock,
    category: String,
    description: Option<String>,
    is_active: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

/// Fields to replace in [`Product::with_updates`]. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price_amount: Option<String>,
    pub stock_units: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Product {
    /// Validate inputs and build a new, active, not yet persisted product.
    ///
    /// # Errors
    /// - `InvalidProductName` when `name` is blank
    /// - `InvalidAmount` / `InvalidStock` from the value objects
    pub fn create(
        name: &str,
        price_amount: &str,
        stock_units: i64,
        category: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = normalize_name(name)?;
        let price = Money::parse(price_amount)?;
        let stock = Stock::new(stock_units)?;

        Ok(Self {
            id: None,
            name,
            price,
            stock,
            category: category.into(),
            description,
            is_active: true,
            created_at: None,
            updated_at: None,
        })
    }

    /// Derive a new snapshot with the given fields replaced.
    ///
    /// The receiver is left untouched; identity and timestamps carry over.
    pub fn with_updates(&self, changes: ProductChanges) -> Result<Self, DomainError> {
        let name = match changes.name {
            Some(name) => normalize_name(&name)?,
            None => self.name.clone(),
        };
        let price = match changes.price_amount {
            Some(raw) => Money::parse(&raw)?,
            None => self.price,
        };
        let stock = match changes.stock_units {
            Some(units) => Stock::new(units)?,
            None => self.stock,
        };

        Ok(Self {
            id: self.id,
            name,
            price,
            stock,
            category: changes.category.unwrap_or_else(|| self.category.clone()),
            description: changes.description.or_else(|| self.description.clone()),
            is_active: changes.is_active.unwrap_or(self.is_active),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    /// Attach store-assigned identity and timestamps.
    ///
    /// Used by repository adapters when materializing persisted rows.
    pub fn persisted(
        self,
        id: ProductId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
            ..self
        }
    }

    /// Rebuild a stored product, re-checking every invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ProductId,
        name: &str,
        price: Decimal,
        stock_units: i64,
        category: impl Into<String>,
        description: Option<String>,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: Some(id),
            name: normalize_name(name)?,
            price: Money::from_decimal(price)?,
            stock: Stock::new(stock_units)?,
            category: category.into(),
            description,
            is_active,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        })
    }

    pub fn id(&self) -> Option<ProductId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> Stock {
        self.stock
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

fn normalize_name(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidProductName);
    }
    Ok(trimmed.to_string())
}
