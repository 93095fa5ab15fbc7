use serde::Deserialize;

use crate::domain::{Product, ProductChanges, ProductId};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateProductInput> for ProductChanges {
    fn from(input: UpdateProductInput) -> Self {
        Self {
            name: input.name,
            price_amount: input.price,
            stock_units: input.stock,
            category: input.category,
            description: input.description,
            is_active: input.is_active,
        }
    }
}

/// Load, revalidate, persist and commit. Returns the stored snapshot.
pub async fn update_product(
    uow: &mut dyn UnitOfWork,
    id: ProductId,
    input: UpdateProductInput,
) -> AppResult<Product> {
    let existing = uow.products().get_by_id(id).await?.ok_or_not_found()?;
    let updated = existing.with_updates(input.into())?;

    uow.products().update(&updated).await?;
    let stored = uow.products().get_by_id(id).await?.ok_or_not_found()?;
    uow.commit().await?;

    tracing::info!(product_id = %id, "Product updated");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::errors::AppError;
    use crate::infra::MockProductRepository;
    use crate::services::use_cases::test_support::TestUnitOfWork;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    fn stored(id: i32) -> Product {
        Product::create("Widget", "10", 3, "Tools", None)
            .unwrap()
            .persisted(ProductId(id), Utc::now(), Utc::now())
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let mut uow = TestUnitOfWork::new(repo);
        let result = update_product(&mut uow, ProductId(9), UpdateProductInput::default()).await;

        assert!(matches!(result, Err(AppError::NotFound)));
        assert_eq!(uow.commits, 0);
    }

    #[tokio::test]
    async fn test_applies_partial_changes_and_commits() {
        let saved: Arc<Mutex<Option<Product>>> = Arc::default();
        let sink = saved.clone();

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|id| Ok(Some(stored(id.0))));
        repo.expect_update().times(1).returning(move |p| {
            *sink.lock().unwrap() = Some(p.clone());
            Ok(())
        });

        let mut uow = TestUnitOfWork::new(repo);
        update_product(
            &mut uow,
            ProductId(2),
            UpdateProductInput {
                price: Some("12.345".into()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let written = saved.lock().unwrap().clone().unwrap();
        assert_eq!(written.id(), Some(ProductId(2)));
        assert_eq!(written.name(), "Widget");
        assert_eq!(written.price().to_string(), "12.34");
        assert_eq!(written.stock().units(), 3);
        assert!(!written.is_active());
        assert_eq!(uow.commits, 1);
    }

    #[tokio::test]
    async fn test_invalid_change_is_rejected_before_write() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|id| Ok(Some(stored(id.0))));
        repo.expect_update().never();

        let mut uow = TestUnitOfWork::new(repo);
        let result = update_product(
            &mut uow,
            ProductId(2),
            UpdateProductInput {
                stock: Some(-4),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InvalidStock(-4)))
        ));
    }
}
