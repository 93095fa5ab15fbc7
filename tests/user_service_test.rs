//! User service unit tests over mocked repositories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;

use catalog_api::config::PasswordHashCost;
use catalog_api::domain::{User, UserId};
use catalog_api::errors::{AppError, AppResult};
use catalog_api::infra::{
    MockProductRepository, MockUserRepository, ProductRepository, UnitOfWork, UnitOfWorkFactory,
    UserRepository,
};
use catalog_api::security::PasswordHasher;
use catalog_api::services::{UserManager, UserService};

fn create_test_user(id: UserId) -> User {
    User::restore(
        id,
        "test@example.com",
        "original-hash",
        Some("Test User".to_string()),
        true,
        Utc::now(),
        Utc::now(),
    )
    .unwrap()
}

fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new(PasswordHashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

/// Repository mock backed by one stored row: reads return it, updates replace it.
fn stateful_repo(row: Arc<Mutex<Option<User>>>) -> MockUserRepository {
    let mut repo = MockUserRepository::new();
    let read = row.clone();
    repo.expect_find_by_id()
        .returning(move |_| Ok(read.lock().unwrap().clone()));
    repo.expect_update().times(1).returning(move |user| {
        *row.lock().unwrap() = Some(user.clone());
        Ok(())
    });
    repo
}

#[derive(Default)]
struct Counters {
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Test mock for UnitOfWork that wraps a MockUserRepository
struct TestUnitOfWork {
    products: MockProductRepository,
    users: MockUserRepository,
    counters: Arc<Counters>,
    closed: bool,
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    async fn commit(&mut self) -> AppResult<()> {
        if !std::mem::replace(&mut self.closed, true) {
            self.counters.commits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if !std::mem::replace(&mut self.closed, true) {
            self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Hands out a single unit of work built around the given mock
struct TestFactory {
    users: Mutex<Option<MockUserRepository>>,
    counters: Arc<Counters>,
}

impl TestFactory {
    fn new(users: MockUserRepository) -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(Some(users)),
            counters: Arc::new(Counters::default()),
        })
    }

    fn commits(&self) -> usize {
        self.counters.commits.load(Ordering::SeqCst)
    }

    fn rollbacks(&self) -> usize {
        self.counters.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWorkFactory for TestFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let users = self
            .users
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AppError::internal("test factory used twice"))?;
        Ok(Box::new(TestUnitOfWork {
            products: MockProductRepository::new(),
            users,
            counters: self.counters.clone(),
            closed: false,
        }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_get_user_success() {
    let user_id = UserId(7);

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(create_test_user(id))));

    let factory = TestFactory::new(repo);
    let service = UserManager::new(factory.clone(), fast_hasher());

    let user = service.get(user_id).await.unwrap();
    assert_eq!(user.id(), Some(user_id));
    assert_eq!(user.email(), "test@example.com");
    assert_eq!(factory.commits(), 1);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let factory = TestFactory::new(repo);
    let service = UserManager::new(factory.clone(), fast_hasher());

    let result = service.get(UserId(404)).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(factory.rollbacks(), 1);
}

#[tokio::test]
async fn test_update_profile_name_keeps_password() {
    let user_id = UserId(1);
    let row = Arc::new(Mutex::new(Some(create_test_user(user_id))));

    let factory = TestFactory::new(stateful_repo(row.clone()));
    let service = UserManager::new(factory.clone(), fast_hasher());

    let user = service
        .update_profile(user_id, Some("Renamed".to_string()), None)
        .await
        .unwrap();
    assert_eq!(user.name(), Some("Renamed"));
    assert_eq!(user.password_hash(), "original-hash");
    assert_eq!(factory.commits(), 1);
    assert_eq!(factory.rollbacks(), 0);
}

#[tokio::test]
async fn test_update_profile_rehashes_password() {
    let user_id = UserId(1);
    let row = Arc::new(Mutex::new(Some(create_test_user(user_id))));

    let factory = TestFactory::new(stateful_repo(row.clone()));
    let hasher = fast_hasher();
    let service = UserManager::new(factory, hasher.clone());

    let user = service
        .update_profile(user_id, None, Some("NewPassword456".to_string()))
        .await
        .unwrap();
    assert_ne!(user.password_hash(), "original-hash");
    assert_ne!(user.password_hash(), "NewPassword456");
    assert!(hasher.verify("NewPassword456", user.password_hash()));

    let stored = row.lock().unwrap().clone().unwrap();
    assert_eq!(stored.password_hash(), user.password_hash());
}

#[tokio::test]
async fn test_deactivate_clears_active_flag() {
    let row = Arc::new(Mutex::new(Some(create_test_user(UserId(3)))));

    let factory = TestFactory::new(stateful_repo(row.clone()));
    let service = UserManager::new(factory.clone(), fast_hasher());

    service.deactivate(UserId(3)).await.unwrap();
    assert!(!row.lock().unwrap().as_ref().unwrap().is_active());
    assert_eq!(factory.commits(), 1);
}

#[tokio::test]
async fn test_update_missing_user_never_writes() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));
    repo.expect_update().never();

    let factory = TestFactory::new(repo);
    let service = UserManager::new(factory.clone(), fast_hasher());

    let result = service.deactivate(UserId(9)).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(factory.commits(), 0);
    assert_eq!(factory.rollbacks(), 1);
}
