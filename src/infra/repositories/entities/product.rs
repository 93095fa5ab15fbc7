//! Product row entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Product, ProductId};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub search_name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub stock: i64,
    pub category: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Rows are re-validated on the way out; a row that breaks a product
/// invariant is a storage fault, not a caller error.
impl TryFrom<Model> for Product {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        let id = model.id;
        Product::restore(
            ProductId(id),
            &model.name,
            model.price,
            model.stock,
            model.category,
            model.description,
            model.is_active,
            model.created_at,
            model.updated_at,
        )
        .map_err(|e| AppError::internal(format!("Corrupt product row {}: {}", id, e)))
    }
}
