use serde::Deserialize;

use crate::domain::ProductId;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeleteProductInput {
    /// Flip the active flag instead of removing the row
    pub soft: bool,
}

impl Default for DeleteProductInput {
    fn default() -> Self {
        Self { soft: true }
    }
}

/// Delete and commit. A missing id is not an error.
pub async fn delete_product(
    uow: &mut dyn UnitOfWork,
    id: ProductId,
    input: DeleteProductInput,
) -> AppResult<()> {
    uow.products().delete(id, input.soft).await?;
    uow.commit().await?;

    tracing::info!(product_id = %id, soft = input.soft, "Product deleted");
    Ok(())
}
