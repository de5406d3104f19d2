//! 模块查询处理器

use std::sync::Arc;

use console_errors::AppResult;

use crate::domain::module::{Module, ModuleId, ModuleRepository};
use crate::error::NavAccessError;

pub struct ModuleQueryHandler<R>
where
    R: ModuleRepository,
{
    module_repo: Arc<R>,
}

impl<R> ModuleQueryHandler<R>
where
    R: ModuleRepository,
{
    pub fn new(module_repo: Arc<R>) -> Self {
        Self { module_repo }
    }

    /// 获取模块，不存在或已删除返回 NotFound
    pub async fn get_module(&self, module_id: &ModuleId) -> AppResult<Module> {
        self.module_repo
            .find_by_id(module_id)
            .await?
            .ok_or_else(|| NavAccessError::ModuleNotFound(module_id.clone()).into())
    }

    /// 子模块列表，`None` 为根模块
    pub async fn list_children(&self, parent_id: Option<&ModuleId>) -> AppResult<Vec<Module>> {
        self.module_repo.get_modules_by_parent(parent_id).await
    }

    /// 管理列表：所有未删除模块
    pub async fn list_all(&self) -> AppResult<Vec<Module>> {
        self.module_repo.find_all().await
    }
}
