use serde::Deserialize;

use crate::domain::{Product, ProductId};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Fields for a new product. Price travels as a decimal string.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub price: String,
    pub stock: i64,
    pub category: String,
    pub description: Option<String>,
}

/// Validate, persist and commit a new product.
pub async fn create_product(
    uow: &mut dyn UnitOfWork,
    input: CreateProductInput,
) -> AppResult<ProductId> {
    let product = Product::create(
        &input.name,
        &input.price,
        input.stock,
        input.category,
        input.description,
    )?;

    let id = uow.products().create(&product).await?;
    uow.commit().await?;

    tracing::info!(product_id = %id, "Product created");
    Ok(id)
}
