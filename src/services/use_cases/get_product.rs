use crate::domain::{Product, ProductId};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Read-through lookup; an absent product is `None`, not an error.
pub async fn get_product(uow: &dyn UnitOfWork, id: ProductId) -> AppResult<Option<Product>> {
    uow.products().get_by_id(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockProductRepository;
    use crate::services::use_cases::test_support::TestUnitOfWork;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_absent_product_is_none() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .with(eq(ProductId(42)))
            .returning(|_| Ok(None));

        let uow = TestUnitOfWork::new(repo);
        assert!(get_product(&uow, ProductId(42)).await.unwrap().is_none());
        assert_eq!(uow.commits, 0);
    }
}
