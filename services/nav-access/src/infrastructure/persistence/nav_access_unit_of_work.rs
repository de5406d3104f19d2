//! PostgreSQL Unit of Work 实现

use async_trait::async_trait;
use console_adapter_postgres::TransactionManager;
use console_errors::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::tx_repositories::{SharedTx, TxRolePermissionRepository};
use crate::domain::role::RolePermissionRepository;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// Postgres Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    tx_manager: TransactionManager,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(tx_manager: TransactionManager) -> Self {
        Self { tx_manager }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.tx_manager.begin().await?;
        let tx: SharedTx = Arc::new(Mutex::new(Some(tx)));

        Ok(Box::new(PostgresUnitOfWork {
            role_permission_repo: TxRolePermissionRepository::new(tx.clone()),
            tx,
        }))
    }
}

/// Postgres Unit of Work 实现
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    role_permission_repo: TxRolePermissionRepository,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        &self.role_permission_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        TransactionManager::commit(tx).await
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        TransactionManager::rollback(tx).await
    }
}
