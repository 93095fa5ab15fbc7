use serde::Deserialize;

use crate::domain::{Money, Product};
use crate::errors::AppResult;
use crate::infra::{ProductFilters, UnitOfWork};
use crate::types::{Page, PaginationParams};

/// Listing filters as they arrive at the boundary.
///
/// Blank strings count as absent. Price bounds are decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsFilters {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ListProductsFilters {
    fn into_filters(self) -> AppResult<ProductFilters> {
        let price = |raw: Option<String>| -> AppResult<Option<Money>> {
            Ok(non_blank(raw).map(|v| Money::parse(&v)).transpose()?)
        };

        Ok(ProductFilters {
            category: non_blank(self.category),
            min_price: price(self.min_price)?,
            max_price: price(self.max_price)?,
            search: non_blank(self.search),
            include_inactive: self.include_inactive,
        })
    }
}

/// One page of products plus the total match count.
pub async fn list_products(
    uow: &dyn UnitOfWork,
    filters: ListProductsFilters,
    page: PaginationParams,
) -> AppResult<Page<Product>> {
    let filters = filters.into_filters()?;
    let (limit, offset) = (page.limit(), page.offset());

    let (items, total) = uow.products().list(&filters, limit, offset).await?;
    Ok(Page {
        items,
        total,
        limit,
        offset,
    })
}
