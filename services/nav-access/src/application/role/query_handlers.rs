//! 角色查询处理器

use std::sync::Arc;

use console_common::UserId;
use console_errors::AppResult;

use crate::domain::role::{
    Role, RoleId, RolePermissionRepository, RolePermissionSet, RoleRepository, UserRoleRepository,
};
use crate::error::NavAccessError;

pub struct RoleQueryHandler<R, P, U>
where
    R: RoleRepository,
    P: RolePermissionRepository,
    U: UserRoleRepository,
{
    role_repo: Arc<R>,
    permission_repo: Arc<P>,
    user_role_repo: Arc<U>,
}

impl<R, P, U> RoleQueryHandler<R, P, U>
where
    R: RoleRepository,
    P: RolePermissionRepository,
    U: UserRoleRepository,
{
    pub fn new(role_repo: Arc<R>, permission_repo: Arc<P>, user_role_repo: Arc<U>) -> Self {
        Self {
            role_repo,
            permission_repo,
            user_role_repo,
        }
    }

    pub async fn get_role(&self, role_id: &RoleId) -> AppResult<Role> {
        self.role_repo
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| NavAccessError::RoleNotFound(role_id.clone()).into())
    }

    pub async fn list_active_roles(&self) -> AppResult<Vec<Role>> {
        self.role_repo.list_active().await
    }

    /// 用户当前生效的角色
    pub async fn user_roles(&self, user_id: &UserId) -> AppResult<Vec<Role>> {
        self.user_role_repo.find_roles_by_user(user_id).await
    }

    /// 角色的完整权限集合
    pub async fn role_permissions(&self, role_id: &RoleId) -> AppResult<RolePermissionSet> {
        let role = self.get_role(role_id).await?;
        let module_permissions = self.permission_repo.find_module_permissions(&role.id).await?;
        let function_permissions = self
            .permission_repo
            .find_function_permissions(&role.id)
            .await?;

        Ok(RolePermissionSet {
            role_id: role.id,
            module_permissions,
            function_permissions,
        })
    }
}
