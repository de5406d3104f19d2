//! 事务内仓储
//!
//! 与连接池实现共用 SQL，但所有语句都走共享事务。

use async_trait::async_trait;
use console_errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::role_permission_repository::{
    delete_function_permissions, delete_module_permissions, insert_function_rows,
    insert_module_rows, select_function_permissions, select_module_permissions,
};
use crate::domain::role::{
    RoleFunctionPermission, RoleId, RoleModulePermission, RolePermissionRepository,
};

/// 共享事务，提交或回滚后为 None
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxRolePermissionRepository);

/// 取出事务连接执行一段操作
macro_rules! with_tx {
    ($self:ident, |$conn:ident| $body:expr) => {{
        let mut guard = $self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        let $conn = &mut **tx;
        $body.await
    }};
}

#[async_trait]
impl RolePermissionRepository for TxRolePermissionRepository {
    async fn find_module_permissions(&self, role_id: &RoleId) -> AppResult<Vec<RoleModulePermission>> {
        with_tx!(self, |conn| select_module_permissions(conn, &[role_id.0]))
    }

    async fn find_module_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleModulePermission>> {
        let ids: Vec<Uuid> = role_ids.iter().map(|r| r.0).collect();
        with_tx!(self, |conn| select_module_permissions(conn, &ids))
    }

    async fn find_function_permissions(
        &self,
        role_id: &RoleId,
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        with_tx!(self, |conn| select_function_permissions(conn, &[role_id.0]))
    }

    async fn find_function_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        let ids: Vec<Uuid> = role_ids.iter().map(|r| r.0).collect();
        with_tx!(self, |conn| select_function_permissions(conn, &ids))
    }

    async fn clear_module_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        with_tx!(self, |conn| delete_module_permissions(conn, role_id))
    }

    async fn clear_function_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        with_tx!(self, |conn| delete_function_permissions(conn, role_id))
    }

    async fn insert_module_permissions(&self, rows: &[RoleModulePermission]) -> AppResult<()> {
        with_tx!(self, |conn| insert_module_rows(conn, rows))
    }

    async fn insert_function_permissions(&self, rows: &[RoleFunctionPermission]) -> AppResult<()> {
        with_tx!(self, |conn| insert_function_rows(conn, rows))
    }
}
