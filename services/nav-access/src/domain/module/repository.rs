//! 模块仓储接口

use async_trait::async_trait;
use console_common::UserId;
use console_errors::AppResult;

use super::module::{Module, ModuleId, ModulePatch, NewModule};

/// 模块仓储接口
///
/// 所有读取默认排除已软删除的模块。
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// 激活且未删除的模块，按 sort_order、id 排序
    async fn get_all_active_modules(&self) -> AppResult<Vec<Module>>;

    /// 指定父模块下的子模块，`None` 表示根模块
    async fn get_modules_by_parent(&self, parent_id: Option<&ModuleId>) -> AppResult<Vec<Module>>;

    async fn find_by_id(&self, id: &ModuleId) -> AppResult<Option<Module>>;

    /// 所有未删除模块 (含未激活)
    async fn find_all(&self) -> AppResult<Vec<Module>>;

    async fn exists_by_code(&self, code: &str) -> AppResult<bool>;

    async fn create(&self, draft: NewModule, actor: &UserId) -> AppResult<Module>;

    /// 版本不匹配返回 Conflict，不存在或已删除返回 NotFound
    async fn update(&self, id: &ModuleId, patch: ModulePatch, actor: &UserId)
    -> AppResult<Module>;

    /// 软删除，重复删除返回 true；从未存在的 ID 返回 NotFound
    async fn delete(&self, id: &ModuleId, actor: &UserId) -> AppResult<bool>;
}
