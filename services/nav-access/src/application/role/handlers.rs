//! 角色命令处理器

use std::sync::Arc;

use console_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::domain::role::{Role, RoleRepository, UserRole, UserRoleRepository};
use crate::error::NavAccessError;

/// 角色命令处理器
pub struct RoleCommandHandler<R, U>
where
    R: RoleRepository,
    U: UserRoleRepository,
{
    role_repo: Arc<R>,
    user_role_repo: Arc<U>,
}

impl<R, U> RoleCommandHandler<R, U>
where
    R: RoleRepository,
    U: UserRoleRepository,
{
    pub fn new(role_repo: Arc<R>, user_role_repo: Arc<U>) -> Self {
        Self {
            role_repo,
            user_role_repo,
        }
    }

    /// 创建角色
    pub async fn handle_create(&self, cmd: CreateRoleCommand) -> AppResult<Role> {
        cmd.validate().map_err(AppError::validation)?;

        let performed_by = cmd.performed_by.clone();
        let draft = cmd.into_draft();

        if self.role_repo.find_by_name(&draft.name).await?.is_some() {
            return Err(NavAccessError::DuplicateRoleName(draft.name).into());
        }

        let role = self.role_repo.create(draft, &performed_by).await?;

        info!(role_id = %role.id, name = %role.name, by = %performed_by, "Role created");
        Ok(role)
    }

    /// 更新角色
    pub async fn handle_update(&self, cmd: UpdateRoleCommand) -> AppResult<Role> {
        cmd.validate().map_err(AppError::validation)?;

        let role_id = cmd.role_id.clone();
        let performed_by = cmd.performed_by.clone();
        let patch = cmd.into_patch();

        if let Some(name) = &patch.name
            && let Some(existing) = self.role_repo.find_by_name(name).await?
            && existing.id != role_id
        {
            return Err(NavAccessError::DuplicateRoleName(name.clone()).into());
        }

        let role = self.role_repo.update(&role_id, patch, &performed_by).await?;

        info!(role_id = %role.id, version = role.version, by = %performed_by, "Role updated");
        Ok(role)
    }

    /// 软删除角色
    pub async fn handle_delete(&self, cmd: DeleteRoleCommand) -> AppResult<bool> {
        let deleted = self
            .role_repo
            .delete(&cmd.role_id, &cmd.performed_by)
            .await?;

        info!(role_id = %cmd.role_id, by = %cmd.performed_by, "Role deleted");
        Ok(deleted)
    }

    /// 为用户分配角色
    pub async fn handle_assign_roles(&self, cmd: AssignRolesToUserCommand) -> AppResult<Vec<UserRole>> {
        if cmd.role_ids.is_empty() {
            return Err(AppError::validation("At least one role must be given"));
        }

        // 先全部校验，避免只分配了一部分
        for role_id in &cmd.role_ids {
            if self.role_repo.find_by_id(role_id).await?.is_none() {
                return Err(NavAccessError::RoleNotFound(role_id.clone()).into());
            }
        }

        let mut assigned = Vec::with_capacity(cmd.role_ids.len());
        for role_id in &cmd.role_ids {
            assigned.push(
                self.user_role_repo
                    .assign(&cmd.user_id, role_id, &cmd.performed_by)
                    .await?,
            );
        }

        info!(
            user_id = %cmd.user_id,
            roles = assigned.len(),
            by = %cmd.performed_by,
            "Roles assigned to user"
        );
        Ok(assigned)
    }

    /// 移除用户角色，返回实际移除的数量
    pub async fn handle_remove_roles(&self, cmd: RemoveRolesFromUserCommand) -> AppResult<usize> {
        let mut removed = 0;
        for role_id in &cmd.role_ids {
            if self
                .user_role_repo
                .remove(&cmd.user_id, role_id, &cmd.performed_by)
                .await?
            {
                removed += 1;
            }
        }

        info!(user_id = %cmd.user_id, removed, by = %cmd.performed_by, "Roles removed from user");
        Ok(removed)
    }
}
