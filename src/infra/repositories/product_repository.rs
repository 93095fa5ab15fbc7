//! Product repository: port and SeaORM adapter.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, LikeExpr},
    ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use super::session::Session;
use crate::domain::{Money, Product, ProductId};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Listing filters. Every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<Money>,
    /// Inclusive upper price bound
    pub max_price: Option<Money>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    /// Also list soft-deleted products
    pub include_inactive: bool,
}

impl ProductFilters {
    /// In-process form of the listing predicate.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active() {
            return false;
        }
        if let Some(category) = &self.category {
            if product.category() != category {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price() < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price() > max) {
            return false;
        }
        match &self.search {
            Some(term) => search_key(product.name()).contains(&search_key(term)),
            None => true,
        }
    }
}

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page of matching products ordered by id, plus the total match count
    async fn list(
        &self,
        filters: &ProductFilters,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<Product>, u64)>;

    /// Find product by ID, active or not
    async fn get_by_id(&self, id: ProductId) -> AppResult<Option<Product>>;

    /// Insert a new product and return its assigned id
    async fn create(&self, product: &Product) -> AppResult<ProductId>;

    /// Overwrite a stored product; `NotFound` if it does not exist
    async fn update(&self, product: &Product) -> AppResult<()>;

    /// Soft delete clears the active flag, hard delete removes the row.
    /// A missing id is a no-op either way.
    async fn delete(&self, id: ProductId, soft: bool) -> AppResult<()>;
}

/// SeaORM implementation bound to one unit of work
pub struct ProductStore {
    session: Session,
}

impl ProductStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Case folding shared by every adapter's name search.
///
/// Unicode lower-casing happens in Rust, never in SQL, since SQLite's
/// `LOWER` only folds ASCII.
pub(crate) fn search_key(text: &str) -> String {
    text.to_lowercase()
}

/// Escape LIKE wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in search_key(term).chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn filtered(filters: &ProductFilters) -> Select<ProductEntity> {
    let mut query = ProductEntity::find();

    if !filters.include_inactive {
        query = query.filter(product::Column::IsActive.eq(true));
    }
    if let Some(category) = &filters.category {
        query = query.filter(product::Column::Category.eq(category.as_str()));
    }
    if let Some(min) = filters.min_price {
        query = query.filter(product::Column::Price.gte(min.amount()));
    }
    if let Some(max) = filters.max_price {
        query = query.filter(product::Column::Price.lte(max.amount()));
    }
    if let Some(term) = &filters.search {
        query = query.filter(
            Expr::col(product::Column::SearchName)
                .like(LikeExpr::new(like_pattern(term)).escape('\\')),
        );
    }

    query
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(
        &self,
        filters: &ProductFilters,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<Product>, u64)> {
        let conn = self.session.conn().await?;
        let query = filtered(filters);

        let total = query.clone().count(&*conn).await?;
        let rows = query
            .order_by_asc(product::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*conn)
            .await?;

        let items = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn get_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let conn = self.session.conn().await?;
        ProductEntity::find_by_id(id.0)
            .one(&*conn)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn create(&self, product: &Product) -> AppResult<ProductId> {
        let conn = self.session.conn().await?;
        let now = Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(product.name().to_string()),
            search_name: Set(search_key(product.name())),
            price: Set(product.price().amount()),
            stock: Set(product.stock().units()),
            category: Set(product.category().to_string()),
            description: Set(product.description().map(str::to_string)),
            is_active: Set(product.is_active()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = ProductEntity::insert(active_model).exec(&*conn).await?;
        Ok(ProductId(result.last_insert_id))
    }

    async fn update(&self, product: &Product) -> AppResult<()> {
        let id = product.id().ok_or(AppError::NotFound)?;
        let conn = self.session.conn().await?;

        let existing = ProductEntity::find_by_id(id.0)
            .one(&*conn)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(product.name().to_string());
        active.search_name = Set(search_key(product.name()));
        active.price = Set(product.price().amount());
        active.stock = Set(product.stock().units());
        active.category = Set(product.category().to_string());
        active.description = Set(product.description().map(str::to_string));
        active.is_active = Set(product.is_active());
        active.updated_at = Set(Utc::now());

        active.update(&*conn).await?;
        Ok(())
    }

    async fn delete(&self, id: ProductId, soft: bool) -> AppResult<()> {
        let conn = self.session.conn().await?;

        if soft {
            ProductEntity::update_many()
                .col_expr(product::Column::IsActive, Expr::value(false))
                .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(product::Column::Id.eq(id.0))
                .exec(&*conn)
                .await?;
        } else {
            ProductEntity::delete_by_id(id.0).exec(&*conn).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Database;
    use sea_orm::TransactionTrait;

    async fn store() -> (Database, ProductStore) {
        let db = Database::in_memory().await.unwrap();
        let txn = db.connection().begin().await.unwrap();
        (db, ProductStore::new(Session::new(txn)))
    }

    fn product(name: &str, price: &str, category: &str) -> Product {
        Product::create(name, price, 10, category, None).unwrap()
    }

    async fn seed(store: &ProductStore) -> Vec<ProductId> {
        let rows = [
            ("Laptop", "999.99", "Electronics"),
            ("Headphones", "79.99", "Electronics"),
            ("Keyboard", "80.00", "Electronics"),
            ("Monitor", "200.00", "Electronics"),
            ("Desk Lamp", "200.01", "Home"),
            ("Coffee Mug", "12.50", "Kitchen"),
            ("USB Cable", "9.99", "Electronics"),
        ];
        let mut ids = Vec::new();
        for (name, price, category) in rows {
            ids.push(store.create(&product(name, price, category)).await.unwrap());
        }
        ids
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Mug"), "%mug%");
        assert_eq!(like_pattern("100%_x\\"), "%100\\%\\_x\\\\%");
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let (_db, store) = store().await;
        let id = store
            .create(&Product::create("Widget", "19.999", 5, "Tools", Some("Blue".into())).unwrap())
            .await
            .unwrap();

        let found = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.id(), Some(id));
        assert_eq!(found.price().to_string(), "20.00");
        assert_eq!(found.stock().units(), 5);
        assert_eq!(found.description(), Some("Blue"));
        assert!(found.is_active());
        assert!(found.created_at().is_some());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (_db, store) = store().await;
        assert!(store.get_by_id(ProductId(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_category_counts_all_matches() {
        let (_db, store) = store().await;
        seed(&store).await;

        let filters = ProductFilters {
            category: Some("Electronics".into()),
            ..Default::default()
        };
        let (items, total) = store.list(&filters, 2, 0).await.unwrap();

        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|p| p.category() == "Electronics"));
    }

    #[tokio::test]
    async fn test_list_price_bounds_are_inclusive() {
        let (_db, store) = store().await;
        seed(&store).await;

        let filters = ProductFilters {
            min_price: Some(Money::parse("80").unwrap()),
            max_price: Some(Money::parse("200").unwrap()),
            ..Default::default()
        };
        let (items, total) = store.list(&filters, 20, 0).await.unwrap();
        let names: Vec<_> = items.iter().map(|p| p.name()).collect();

        assert_eq!(total, 2);
        assert_eq!(names, vec!["Keyboard", "Monitor"]);
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive_and_literal() {
        let (_db, store) = store().await;
        seed(&store).await;
        store.create(&product("100% Cotton_Shirt", "15", "Apparel")).await.unwrap();

        let search = |term: &str| ProductFilters {
            search: Some(term.into()),
            ..Default::default()
        };

        let (items, _) = store.list(&search("LAMP"), 20, 0).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "Desk Lamp");

        let (items, _) = store.list(&search("0% c"), 20, 0).await.unwrap();
        assert_eq!(items.len(), 1);

        // `_` must not act as a single-character wildcard
        let (items, _) = store.list(&search("b_e"), 20, 0).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_like_in_process_filter() {
        let (_db, store) = store().await;
        let screen = product("Écran Plat", "150", "Electronics");
        store.create(&screen).await.unwrap();
        store.create(&product("STRAßE Map", "5", "Books")).await.unwrap();

        for term in ["écran", "ÉCRAN", "plat", "straße"] {
            let filters = ProductFilters {
                search: Some(term.into()),
                ..Default::default()
            };
            let (items, total) = store.list(&filters, 20, 0).await.unwrap();
            assert_eq!(total, 1, "{}", term);
            assert!(filters.matches(&items[0]), "{}", term);
        }

        let filters = ProductFilters {
            search: Some("écran".into()),
            ..Default::default()
        };
        assert!(filters.matches(&screen));
    }

    #[tokio::test]
    async fn test_update_refreshes_search_name() {
        let (_db, store) = store().await;
        let id = store.create(&product("Old Name", "1", "Misc")).await.unwrap();
        let stored = store.get_by_id(id).await.unwrap().unwrap();
        let renamed = stored
            .with_updates(crate::domain::ProductChanges {
                name: Some("Équerre".into()),
                ..Default::default()
            })
            .unwrap();
        store.update(&renamed).await.unwrap();

        let search = |term: &str| ProductFilters {
            search: Some(term.into()),
            ..Default::default()
        };
        assert_eq!(store.list(&search("équerre"), 20, 0).await.unwrap().1, 1);
        assert_eq!(store.list(&search("old"), 20, 0).await.unwrap().1, 0);
    }

    #[tokio::test]
    async fn test_pagination_yields_disjoint_pages_in_id_order() {
        let (_db, store) = store().await;
        let ids = seed(&store).await;

        let (first, total) = store.list(&ProductFilters::default(), 5, 0).await.unwrap();
        let (second, _) = store.list(&ProductFilters::default(), 5, 5).await.unwrap();
        let first_ids: Vec<_> = first.iter().filter_map(Product::id).collect();
        let second_ids: Vec<_> = second.iter().filter_map(Product::id).collect();

        assert_eq!(total, 7);
        assert_eq!(first_ids, ids[..5].to_vec());
        assert_eq!(second_ids, ids[5..].to_vec());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listing_but_keeps_row() {
        let (_db, store) = store().await;
        let ids = seed(&store).await;

        store.delete(ids[0], true).await.unwrap();

        let (items, total) = store.list(&ProductFilters::default(), 20, 0).await.unwrap();
        assert_eq!(total, 6);
        assert!(items.iter().all(|p| p.id() != Some(ids[0])));

        let kept = store.get_by_id(ids[0]).await.unwrap().unwrap();
        assert!(!kept.is_active());

        let all = ProductFilters {
            include_inactive: true,
            ..Default::default()
        };
        assert_eq!(store.list(&all, 20, 0).await.unwrap().1, 7);
    }

    #[tokio::test]
    async fn test_hard_delete_removes_row() {
        let (_db, store) = store().await;
        let ids = seed(&store).await;

        store.delete(ids[1], false).await.unwrap();
        assert!(store.get_by_id(ids[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let (_db, store) = store().await;

        store.delete(ProductId(99), true).await.unwrap();
        store.delete(ProductId(99), false).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let (_db, store) = store().await;
        let id = store.create(&product("Widget", "5", "Tools")).await.unwrap();
        let stored = store.get_by_id(id).await.unwrap().unwrap();

        let changed = stored
            .with_updates(crate::domain::ProductChanges {
                price_amount: Some("7.505".into()),
                stock_units: Some(0),
                ..Default::default()
            })
            .unwrap();
        store.update(&changed).await.unwrap();

        let reloaded = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.price().to_string(), "7.50");
        assert_eq!(reloaded.stock().units(), 0);
        assert_eq!(reloaded.name(), "Widget");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_db, store) = store().await;

        let unsaved = product("Ghost", "1", "Tools");
        assert!(matches!(store.update(&unsaved).await, Err(AppError::NotFound)));

        let now = Utc::now();
        let phantom = unsaved.persisted(ProductId(77), now, now);
        assert!(matches!(store.update(&phantom).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let (_db, store) = store().await;
        if let Some(txn) = store.session.close().await {
            txn.rollback().await.unwrap();
        }

        assert!(matches!(
            store.get_by_id(ProductId(1)).await,
            Err(AppError::Internal(_))
        ));
    }
}
