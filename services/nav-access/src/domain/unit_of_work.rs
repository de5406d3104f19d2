//! Unit of Work
//!
//! 将多步写入包在一个事务里，提交前的任何失败都可整体回滚。

use async_trait::async_trait;
use console_errors::AppResult;

use crate::domain::role::RolePermissionRepository;

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 事务内的角色权限仓储
    fn role_permissions(&self) -> &dyn RolePermissionRepository;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
