//! Seed command - Loads a small sample catalog.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, Persistence, UnitOfWorkFactory};
use crate::services::use_cases::{CreateProductInput, ListProductsFilters};
use crate::services::{ProductCatalog, ProductService};
use crate::types::PaginationParams;

/// (name, price, stock, category, description)
const SAMPLE_PRODUCTS: &[(&str, &str, i64, &str, &str)] = &[
    ("Mechanical Keyboard", "89.90", 25, "Peripherals", "Tenkeyless, brown switches"),
    ("Wireless Mouse", "24.50", 60, "Peripherals", "2.4 GHz receiver"),
    ("27\" Monitor", "219.00", 12, "Displays", "1440p IPS panel"),
    ("USB-C Hub", "39.99", 40, "Accessories", "7 ports with power delivery"),
    ("Laptop Stand", "29.00", 0, "Accessories", "Aluminium, adjustable height"),
];

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let inserted = seed(Arc::new(Persistence::from_database(&db))).await?;
    tracing::info!(inserted, "Seeding finished");
    Ok(())
}

/// Insert the sample catalog unless any product already exists.
///
/// Returns how many products were inserted.
pub async fn seed(store: Arc<dyn UnitOfWorkFactory>) -> AppResult<usize> {
    let catalog = ProductCatalog::new(store);

    let existing = catalog
        .list(
            ListProductsFilters {
                include_inactive: true,
                ..Default::default()
            },
            PaginationParams::new(Some(1), None),
        )
        .await?;
    if existing.total > 0 {
        tracing::info!(existing = existing.total, "Catalog not empty, skipping seed");
        return Ok(0);
    }

    for (name, price, stock, category, description) in SAMPLE_PRODUCTS {
        catalog
            .create(CreateProductInput {
                name: name.to_string(),
                price: price.to_string(),
                stock: *stock,
                category: category.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
    }

    Ok(SAMPLE_PRODUCTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryStore;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let store = Arc::new(InMemoryStore::new());

        assert_eq!(seed(store.clone()).await.unwrap(), SAMPLE_PRODUCTS.len());
        assert_eq!(seed(store.clone()).await.unwrap(), 0);

        let page = ProductCatalog::new(store)
            .list(ListProductsFilters::default(), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, SAMPLE_PRODUCTS.len() as u64);
    }
}
