//! Transaction handle shared by the repositories of one unit of work.

use std::sync::Arc;

use sea_orm::DatabaseTransaction;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::errors::{AppError, AppResult};

/// Shared, closable handle to an open database transaction.
///
/// Repositories borrow the transaction for each statement; the unit of
/// work takes it out to commit or roll back, after which every borrow
/// fails.
#[derive(Clone)]
pub struct Session {
    txn: Arc<RwLock<Option<DatabaseTransaction>>>,
}

impl Session {
    pub fn new(txn: DatabaseTransaction) -> Self {
        Self {
            txn: Arc::new(RwLock::new(Some(txn))),
        }
    }

    /// Borrow the open transaction.
    pub async fn conn(&self) -> AppResult<RwLockReadGuard<'_, DatabaseTransaction>> {
        let guard = self.txn.read().await;
        RwLockReadGuard::try_map(guard, Option::as_ref)
            .map_err(|_| AppError::internal("Unit of work is closed"))
    }

    /// Take the transaction out, closing the session.
    pub async fn close(&self) -> Option<DatabaseTransaction> {
        self.txn.write().await.take()
    }
}
