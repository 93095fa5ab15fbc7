//! In-memory store with the same contracts as the SQL adapters.
//!
//! A unit of work holds the store lock for its whole lifetime and edits a
//! private copy of the state; commit publishes the copy, rollback drops
//! it. Units are therefore serialized.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::repositories::{ProductFilters, ProductRepository, UserRepository};
use super::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::{normalize_email, Product, ProductChanges, ProductId, User, UserId};
use crate::errors::{AppError, AppResult, OptionExt};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, User>,
    last_product_id: i32,
    last_user_id: i32,
}

struct Scope {
    committed: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

type SharedScope = Arc<Mutex<Option<Scope>>>;

fn with_state<R>(scope: &SharedScope, f: impl FnOnce(&mut MemoryState) -> AppResult<R>) -> AppResult<R> {
    let mut guard = scope
        .lock()
        .map_err(|_| AppError::internal("In-memory store lock poisoned"))?;
    let scope = guard
        .as_mut()
        .ok_or_else(|| AppError::internal("Unit of work is closed"))?;
    f(&mut scope.working)
}

/// Unit of work factory over process memory.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<AsyncMutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let committed = self.state.clone().lock_owned().await;
        let working = (*committed).clone();
        let scope: SharedScope = Arc::new(Mutex::new(Some(Scope { committed, working })));

        Ok(Box::new(InMemoryUnitOfWork {
            products: MemoryProducts {
                scope: scope.clone(),
            },
            users: MemoryUsers {
                scope: scope.clone(),
            },
            scope,
        }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

struct InMemoryUnitOfWork {
    scope: SharedScope,
    products: MemoryProducts,
    users: MemoryUsers,
}

impl InMemoryUnitOfWork {
    fn close(&self) -> AppResult<Option<Scope>> {
        let mut guard = self
            .scope
            .lock()
            .map_err(|_| AppError::internal("In-memory store lock poisoned"))?;
        Ok(guard.take())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    async fn commit(&mut self) -> AppResult<()> {
        if let Some(Scope {
            mut committed,
            working,
        }) = self.close()?
        {
            *committed = working;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.close()?;
        Ok(())
    }
}

struct MemoryProducts {
    scope: SharedScope,
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn list(
        &self,
        filters: &ProductFilters,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<Product>, u64)> {
        with_state(&self.scope, |state| {
            let matching: Vec<&Product> = state
                .products
                .values()
                .filter(|p| filters.matches(p))
                .collect();
            let total = matching.len() as u64;
            let items = matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect();
            Ok((items, total))
        })
    }

    async fn get_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        with_state(&self.scope, |state| Ok(state.products.get(&id).cloned()))
    }

    async fn create(&self, product: &Product) -> AppResult<ProductId> {
        with_state(&self.scope, |state| {
            state.last_product_id += 1;
            let id = ProductId(state.last_product_id);
            let now = Utc::now();
            state
                .products
                .insert(id, product.clone().persisted(id, now, now));
            Ok(id)
        })
    }

    async fn update(&self, product: &Product) -> AppResult<()> {
        let id = product.id().ok_or(AppError::NotFound)?;
        with_state(&self.scope, |state| {
            let existing = state.products.get_mut(&id).ok_or_not_found()?;
            let now = Utc::now();
            let created_at = existing.created_at().unwrap_or(now);
            *existing = product.clone().persisted(id, created_at, now);
            Ok(())
        })
    }

    async fn delete(&self, id: ProductId, soft: bool) -> AppResult<()> {
        with_state(&self.scope, |state| {
            if !soft {
                state.products.remove(&id);
                return Ok(());
            }
            if let Some(existing) = state.products.get_mut(&id) {
                let now = Utc::now();
                let created_at = existing.created_at().unwrap_or(now);
                *existing = existing
                    .with_updates(ProductChanges {
                        is_active: Some(false),
                        ..Default::default()
                    })?
                    .persisted(id, created_at, now);
            }
            Ok(())
        })
    }
}

struct MemoryUsers {
    scope: SharedScope,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create(&self, user: &User) -> AppResult<UserId> {
        with_state(&self.scope, |state| {
            if state.users.values().any(|u| u.email() == user.email()) {
                return Err(AppError::conflict("User"));
            }
            state.last_user_id += 1;
            let id = UserId(state.last_user_id);
            let now = Utc::now();
            state.users.insert(id, user.clone().persisted(id, now, now));
            Ok(id)
        })
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        with_state(&self.scope, |state| Ok(state.users.get(&id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        with_state(&self.scope, |state| {
            Ok(state.users.values().find(|u| u.email() == email).cloned())
        })
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let id = user.id().ok_or(AppError::NotFound)?;
        with_state(&self.scope, |state| {
            let existing = state.users.get_mut(&id).ok_or_not_found()?;
            let now = Utc::now();
            let created_at = existing.created_at().unwrap_or(now);
            *existing = user.clone().persisted(id, created_at, now);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;
    use crate::infra::run_in_unit_of_work;

    fn product(name: &str, price: &str, category: &str) -> Product {
        Product::create(name, price, 3, category, None).unwrap()
    }

    async fn seeded() -> (InMemoryStore, Vec<ProductId>) {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let mut ids = Vec::new();
        for (name, price, category) in [
            ("Laptop", "999.99", "Electronics"),
            ("Keyboard", "80", "Electronics"),
            ("Monitor", "200", "Electronics"),
            ("Desk Lamp", "200.01", "Home"),
            ("Mouse", "25.5", "Electronics"),
            ("Kettle", "40", "Kitchen"),
        ] {
            ids.push(uow.products().create(&product(name, price, category)).await.unwrap());
        }
        uow.commit().await.unwrap();
        (store, ids)
    }

    #[tokio::test]
    async fn test_ids_ascend_in_insertion_order() {
        let (_, ids) = seeded().await;
        assert_eq!(ids, (1..=6).map(ProductId).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let (store, _) = seeded().await;
        let mut uow = store.begin().await.unwrap();

        let filters = ProductFilters {
            category: Some("Electronics".into()),
            min_price: Some(Money::parse("80").unwrap()),
            max_price: Some(Money::parse("200").unwrap()),
            ..Default::default()
        };
        let (items, total) = uow.products().list(&filters, 20, 0).await.unwrap();
        let names: Vec<_> = items.iter().map(Product::name).collect();
        assert_eq!(total, 2);
        assert_eq!(names, vec!["Keyboard", "Monitor"]);

        let search = ProductFilters {
            search: Some("LAMP".into()),
            ..Default::default()
        };
        assert_eq!(uow.products().list(&search, 20, 0).await.unwrap().1, 1);
        uow.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_pagination_total_counts_all_matches() {
        let (store, ids) = seeded().await;
        let mut uow = store.begin().await.unwrap();

        let (first, total) = uow.products().list(&Default::default(), 4, 0).await.unwrap();
        let (second, _) = uow.products().list(&Default::default(), 4, 4).await.unwrap();
        assert_eq!(total, 6);
        assert_eq!(first.iter().filter_map(Product::id).collect::<Vec<_>>(), ids[..4]);
        assert_eq!(second.iter().filter_map(Product::id).collect::<Vec<_>>(), ids[4..]);
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_rollback_discards_and_commit_publishes() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.products().create(&product("Temp", "1", "X")).await.unwrap();
        uow.rollback().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.products().list(&Default::default(), 20, 0).await.unwrap().1, 0);
        uow.products().create(&product("Kept", "1", "X")).await.unwrap();
        uow.commit().await.unwrap();

        let (items, _) = run_in_unit_of_work(&store, move |uow| {
            Box::pin(async move { uow.products().list(&Default::default(), 20, 0).await })
        })
        .await
        .unwrap();
        assert_eq!(items[0].name(), "Kept");
    }

    #[tokio::test]
    async fn test_closed_unit_rejects_calls() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.commit().await.unwrap();
        uow.commit().await.unwrap();

        assert!(matches!(
            uow.products().get_by_id(ProductId(1)).await,
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_soft_and_hard_delete() {
        let (store, ids) = seeded().await;
        let mut uow = store.begin().await.unwrap();

        uow.products().delete(ids[0], true).await.unwrap();
        uow.products().delete(ids[1], false).await.unwrap();
        uow.products().delete(ProductId(999), true).await.unwrap();
        uow.products().delete(ProductId(999), false).await.unwrap();

        let soft = uow.products().get_by_id(ids[0]).await.unwrap().unwrap();
        assert!(!soft.is_active());
        assert!(uow.products().get_by_id(ids[1]).await.unwrap().is_none());
        assert_eq!(uow.products().list(&Default::default(), 20, 0).await.unwrap().1, 4);
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let now = Utc::now();
        let ghost = product("Ghost", "1", "X").persisted(ProductId(8), now, now);

        assert!(matches!(uow.products().update(&ghost).await, Err(AppError::NotFound)));
        uow.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_users_lookup_by_normalized_email() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let user = User::create("Ann@Example.com", "hash", None).unwrap();
        let id = uow.users().create(&user).await.unwrap();

        let found = uow.users().find_by_email(" ANN@example.com ").await.unwrap().unwrap();
        assert_eq!(found.id(), Some(id));
        assert!(matches!(uow.users().create(&user).await, Err(AppError::Conflict(_))));
        uow.commit().await.unwrap();
    }
}
