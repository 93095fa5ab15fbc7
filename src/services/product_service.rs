//! Product service - one unit of work per catalog operation.

use std::sync::Arc;

use async_trait::async_trait;

use super::use_cases::{
    create_product, delete_product, get_product, list_products, update_product,
    CreateProductInput, DeleteProductInput, ListProductsFilters, UpdateProductInput,
};
use crate::domain::{Product, ProductId};
use crate::errors::AppResult;
use crate::infra::UnitOfWorkFactory;
use crate::types::{Page, PaginationParams};
use crate::with_unit_of_work;

/// Product service trait for dependency injection.
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, input: CreateProductInput) -> AppResult<ProductId>;

    /// `None` when the product does not exist
    async fn get(&self, id: ProductId) -> AppResult<Option<Product>>;

    async fn list(
        &self,
        filters: ListProductsFilters,
        page: PaginationParams,
    ) -> AppResult<Page<Product>>;

    async fn update(&self, id: ProductId, input: UpdateProductInput) -> AppResult<Product>;

    async fn delete(&self, id: ProductId, input: DeleteProductInput) -> AppResult<()>;
}

/// Concrete implementation of ProductService over a unit of work factory.
pub struct ProductCatalog {
    factory: Arc<dyn UnitOfWorkFactory>,
}

impl ProductCatalog {
    pub fn new(factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl ProductService for ProductCatalog {
    async fn create(&self, input: CreateProductInput) -> AppResult<ProductId> {
        with_unit_of_work!(self.factory.as_ref(), |uow| create_product(uow, input).await)
    }

    async fn get(&self, id: ProductId) -> AppResult<Option<Product>> {
        with_unit_of_work!(self.factory.as_ref(), |uow| get_product(uow, id).await)
    }

    async fn list(
        &self,
        filters: ListProductsFilters,
        page: PaginationParams,
    ) -> AppResult<Page<Product>> {
        with_unit_of_work!(self.factory.as_ref(), |uow| list_products(uow, filters, page).await)
    }

    async fn update(&self, id: ProductId, input: UpdateProductInput) -> AppResult<Product> {
        with_unit_of_work!(self.factory.as_ref(), |uow| update_product(uow, id, input).await)
    }

    async fn delete(&self, id: ProductId, input: DeleteProductInput) -> AppResult<()> {
        with_unit_of_work!(self.factory.as_ref(), |uow| delete_product(uow, id, input).await)
    }
}
