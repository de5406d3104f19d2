//! 角色相关仓储接口

use async_trait::async_trait;
use console_common::UserId;
use console_errors::AppResult;

use super::permission::{RoleFunctionPermission, RoleModulePermission};
use super::role::{NewRole, Role, RoleId, RolePatch};
use super::user_role::UserRole;

/// 角色仓储接口
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// 未删除的角色
    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// 激活且未删除，按名称排序
    async fn list_active(&self) -> AppResult<Vec<Role>>;

    async fn create(&self, draft: NewRole, actor: &UserId) -> AppResult<Role>;

    async fn update(&self, id: &RoleId, patch: RolePatch, actor: &UserId) -> AppResult<Role>;

    /// 软删除，幂等
    async fn delete(&self, id: &RoleId, actor: &UserId) -> AppResult<bool>;
}

/// 角色权限仓储接口
///
/// 权限行没有更新操作，只能按角色整体替换。
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    async fn find_module_permissions(&self, role_id: &RoleId) -> AppResult<Vec<RoleModulePermission>>;

    async fn find_module_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleModulePermission>>;

    async fn find_function_permissions(
        &self,
        role_id: &RoleId,
    ) -> AppResult<Vec<RoleFunctionPermission>>;

    async fn find_function_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleFunctionPermission>>;

    /// 返回删除的行数
    async fn clear_module_permissions(&self, role_id: &RoleId) -> AppResult<u64>;

    async fn clear_function_permissions(&self, role_id: &RoleId) -> AppResult<u64>;

    async fn insert_module_permissions(&self, rows: &[RoleModulePermission]) -> AppResult<()>;

    async fn insert_function_permissions(&self, rows: &[RoleFunctionPermission]) -> AppResult<()>;
}

/// 用户角色仓储接口
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// 用户持有的角色，只包含激活且未删除的角色和未删除的关联
    async fn find_roles_by_user(&self, user_id: &UserId) -> AppResult<Vec<Role>>;

    /// 用户的有效关联记录
    async fn find_assignments(&self, user_id: &UserId) -> AppResult<Vec<UserRole>>;

    /// 分配角色，已移除的关联会被恢复
    async fn assign(&self, user_id: &UserId, role_id: &RoleId, actor: &UserId) -> AppResult<UserRole>;

    /// 软删除关联，返回此前是否存在有效关联
    async fn remove(&self, user_id: &UserId, role_id: &RoleId, actor: &UserId) -> AppResult<bool>;
}
