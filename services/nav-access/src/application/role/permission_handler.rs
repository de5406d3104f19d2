//! 角色权限整体替换
//!
//! 在一个 Unit of Work 中依次执行：清空模块权限、清空功能权限、写入模块权限、写入功能权限、提交。
//! 任一步失败即回滚；回滚本身失败时返回 PartialFailure，需要重新执行整个替换。

use std::sync::Arc;
use std::time::Instant;

use console_errors::{AppError, AppResult};
use metrics::{counter, histogram};
use tracing::{error, info, warn};

use super::commands::ReplaceRolePermissionsCommand;
use crate::domain::role::{
    RoleFunctionPermission, RoleId, RoleModulePermission, RolePermissionSet, RoleRepository,
};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::error::NavAccessError;

/// 替换步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceStep {
    ClearModulePermissions,
    ClearFunctionPermissions,
    InsertModulePermissions,
    InsertFunctionPermissions,
    Commit,
}

impl std::fmt::Display for ReplaceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReplaceStep::ClearModulePermissions => "clear module permissions",
            ReplaceStep::ClearFunctionPermissions => "clear function permissions",
            ReplaceStep::InsertModulePermissions => "insert module permissions",
            ReplaceStep::InsertFunctionPermissions => "insert function permissions",
            ReplaceStep::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// 角色权限命令处理器
pub struct RolePermissionCommandHandler<R>
where
    R: RoleRepository,
{
    role_repo: Arc<R>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl<R> RolePermissionCommandHandler<R>
where
    R: RoleRepository,
{
    pub fn new(role_repo: Arc<R>, uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            role_repo,
            uow_factory,
        }
    }

    /// 整体替换角色的模块权限与功能权限
    pub async fn handle_replace(
        &self,
        cmd: ReplaceRolePermissionsCommand,
    ) -> AppResult<RolePermissionSet> {
        cmd.validate().map_err(AppError::validation)?;

        let role = self
            .role_repo
            .find_by_id(&cmd.role_id)
            .await?
            .ok_or_else(|| NavAccessError::RoleNotFound(cmd.role_id.clone()))?;

        let module_rows: Vec<RoleModulePermission> = cmd
            .module_permissions
            .into_iter()
            .map(|p| {
                RoleModulePermission::new(role.id.clone(), p.module_id, p.access)
                    .granted_by(&cmd.performed_by)
            })
            .collect();
        let function_rows: Vec<RoleFunctionPermission> = cmd
            .function_permissions
            .into_iter()
            .map(|p| {
                RoleFunctionPermission::new(role.id.clone(), p.function_code.trim(), p.is_enabled)
                    .granted_by(&cmd.performed_by)
            })
            .collect();

        let start = Instant::now();
        let uow = self.uow_factory.begin().await?;

        let written = Self::write_all(uow.as_ref(), &role.id, &module_rows, &function_rows).await;
        let outcome = match written {
            Ok(()) => uow
                .commit()
                .await
                .map_err(|e| e.with_context(&ReplaceStep::Commit.to_string())),
            Err(e) => {
                warn!(role_id = %role.id, error = %e, "Permission replace failed, rolling back");
                match uow.rollback().await {
                    Ok(()) => Err(e),
                    Err(rollback_err) => {
                        error!(
                            role_id = %role.id,
                            error = %e,
                            rollback_error = %rollback_err,
                            "Rollback failed, role permissions may be inconsistent"
                        );
                        counter!("role_permission_replacements_total", "outcome" => "partial_failure")
                            .increment(1);
                        return Err(AppError::partial_failure(format!(
                            "Permission update for role {} failed ({}) and rollback failed ({}); re-run the whole update",
                            role.id, e, rollback_err
                        )));
                    }
                }
            }
        };

        histogram!("role_permission_replace_duration_ms").record(start.elapsed().as_millis() as f64);

        match outcome {
            Ok(()) => {
                counter!("role_permission_replacements_total", "outcome" => "committed").increment(1);
                info!(
                    role_id = %role.id,
                    module_rows = module_rows.len(),
                    function_rows = function_rows.len(),
                    by = %cmd.performed_by,
                    "Role permissions replaced"
                );
                Ok(RolePermissionSet {
                    role_id: role.id,
                    module_permissions: module_rows,
                    function_permissions: function_rows,
                })
            }
            Err(e) => {
                counter!("role_permission_replacements_total", "outcome" => "rolled_back").increment(1);
                Err(e)
            }
        }
    }

    async fn write_all(
        uow: &dyn UnitOfWork,
        role_id: &RoleId,
        module_rows: &[RoleModulePermission],
        function_rows: &[RoleFunctionPermission],
    ) -> AppResult<()> {
        let repo = uow.role_permissions();

        repo.clear_module_permissions(role_id)
            .await
            .map_err(|e| e.with_context(&ReplaceStep::ClearModulePermissions.to_string()))?;

        repo.clear_function_permissions(role_id)
            .await
            .map_err(|e| e.with_context(&ReplaceStep::ClearFunctionPermissions.to_string()))?;

        if !module_rows.is_empty() {
            repo.insert_module_permissions(module_rows)
                .await
                .map_err(|e| e.with_context(&ReplaceStep::InsertModulePermissions.to_string()))?;
        }

        if !function_rows.is_empty() {
            repo.insert_function_permissions(function_rows)
                .await
                .map_err(|e| e.with_context(&ReplaceStep::InsertFunctionPermissions.to_string()))?;
        }

        Ok(())
    }
}
