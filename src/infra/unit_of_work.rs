//! Unit of Work pattern implementation.
//!
//! A unit of work owns one database transaction and the repositories
//! bound to it. Everything written through those repositories becomes
//! visible atomically on `commit` and is discarded on `rollback`.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, IsolationLevel,
    TransactionTrait,
};

use super::db::Database;
use super::repositories::{ProductRepository, ProductStore, Session, UserRepository, UserStore};
use crate::errors::AppResult;

/// One transactional scope over the repositories.
///
/// `commit` and `rollback` end the scope; calling either again is a
/// no-op. Repository calls after the scope has ended fail.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn products(&self) -> &dyn ProductRepository;

    fn users(&self) -> &dyn UserRepository;

    async fn commit(&mut self) -> AppResult<()>;

    async fn rollback(&mut self) -> AppResult<()>;
}

/// Opens units of work against a store.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Closure shape accepted by [`run_in_unit_of_work`].
pub type UnitOfWorkFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Run `f` inside a fresh unit of work.
///
/// Commits when `f` succeeds (a no-op if `f` already committed) and
/// rolls back when it fails. A failing rollback is logged; the caller
/// still sees the original error.
pub async fn run_in_unit_of_work<F, T>(factory: &dyn UnitOfWorkFactory, f: F) -> AppResult<T>
where
    F: for<'a> FnOnce(&'a mut dyn UnitOfWork) -> UnitOfWorkFuture<'a, T> + Send,
    T: Send,
{
    let mut uow = factory.begin().await?;

    match f(uow.as_mut()).await {
        Ok(result) => {
            uow.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// SeaORM-backed unit of work.
pub struct SeaOrmUnitOfWork {
    session: Session,
    products: ProductStore,
    users: UserStore,
}

impl SeaOrmUnitOfWork {
    fn new(session: Session) -> Self {
        Self {
            products: ProductStore::new(session.clone()),
            users: UserStore::new(session.clone()),
            session,
        }
    }
}

#[async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    async fn commit(&mut self) -> AppResult<()> {
        if let Some(txn) = self.session.close().await {
            txn.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if let Some(txn) = self.session.close().await {
            txn.rollback().await?;
        }
        Ok(())
    }
}

/// Unit of work factory over a SeaORM connection pool
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn from_database(database: &Database) -> Self {
        Self::new(database.get_connection())
    }
}

#[async_trait]
impl UnitOfWorkFactory for Persistence {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        // SQLite transactions are always serializable and take no options
        let txn = match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => self.db.begin().await?,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::ReadCommitted),
                        Some(AccessMode::ReadWrite),
                    )
                    .await?
            }
        };
        Ok(Box::new(SeaOrmUnitOfWork::new(Session::new(txn))))
    }

    async fn ping(&self) -> AppResult<()> {
        Database::from_connection(self.db.clone()).ping().await?;
        Ok(())
    }
}

/// Simpler API for running a block inside a unit of work.
///
/// ```ignore
/// let id = with_unit_of_work!(factory, |uow| create_product(uow, input).await)?;
/// ```
#[macro_export]
macro_rules! with_unit_of_work {
    ($factory:expr, |$uow:ident| $body:expr) => {
        $crate::infra::run_in_unit_of_work($factory, move |$uow| Box::pin(async move { $body })).await
    };
}
