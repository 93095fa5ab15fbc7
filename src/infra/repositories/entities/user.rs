//! User row entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{User, UserId};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        let id = model.id;
        User::restore(
            UserId(id),
            &model.email,
            model.password_hash,
            model.name,
            model.is_active,
            model.created_at,
            model.updated_at,
        )
        .map_err(|e| AppError::internal(format!("Corrupt user row {}: {}", id, e)))
    }
}
