//! 授权检查服务
//!
//! 按用户持有的角色汇总模块权限，每次调用重新计算。

use std::collections::HashMap;
use std::sync::Arc;

use console_common::UserId;
use console_errors::{AppError, AppResult};
use metrics::{counter, histogram};
use tracing::debug;

use crate::domain::module::ModuleId;
use crate::domain::role::{
    ModuleAccess, ModuleAction, RoleId, RoleModulePermission, RolePermissionRepository,
    UserRoleRepository, resolve_all_module_access, resolve_function_access,
    resolve_module_access,
};

/// 授权检查请求
#[derive(Debug, Clone)]
pub struct AuthorizationCheckRequest {
    pub user_id: UserId,
    pub module_id: ModuleId,
    pub action: ModuleAction,
}

/// 授权结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub decision_source: DecisionSource,
    /// 拒绝原因 (如果被拒绝)
    pub denied_reason: Option<String>,
}

/// 决策来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// 角色模块权限
    Rbac,
    /// 没有任何角色授予该操作
    DefaultDeny,
}

impl std::fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionSource::Rbac => write!(f, "RBAC"),
            DecisionSource::DefaultDeny => write!(f, "DEFAULT_DENY"),
        }
    }
}

/// 授权服务
pub struct AuthorizationService<U, P>
where
    U: UserRoleRepository,
    P: RolePermissionRepository,
{
    user_role_repo: Arc<U>,
    permission_repo: Arc<P>,
}

impl<U, P> AuthorizationService<U, P>
where
    U: UserRoleRepository,
    P: RolePermissionRepository,
{
    pub fn new(user_role_repo: Arc<U>, permission_repo: Arc<P>) -> Self {
        Self {
            user_role_repo,
            permission_repo,
        }
    }

    /// 用户当前生效的角色 ID (仓储已过滤停用和删除的角色)
    async fn role_ids(&self, user_id: &UserId) -> AppResult<Vec<RoleId>> {
        Ok(self
            .user_role_repo
            .find_roles_by_user(user_id)
            .await?
            .into_iter()
            .map(|role| role.id)
            .collect())
    }

    async fn module_rows(&self, user_id: &UserId) -> AppResult<Vec<RoleModulePermission>> {
        let role_ids = self.role_ids(user_id).await?;
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.permission_repo
            .find_module_permissions_by_roles(&role_ids)
            .await
    }

    /// 用户在某个模块上的权限
    pub async fn module_access(&self, user_id: &UserId, module_id: &ModuleId) -> AppResult<ModuleAccess> {
        let rows = self.module_rows(user_id).await?;
        Ok(resolve_module_access(&rows, module_id))
    }

    /// 用户在所有模块上的权限，没有出现的模块即无权限
    pub async fn effective_permissions(
        &self,
        user_id: &UserId,
    ) -> AppResult<HashMap<ModuleId, ModuleAccess>> {
        let rows = self.module_rows(user_id).await?;
        Ok(resolve_all_module_access(&rows))
    }

    /// 执行授权检查
    pub async fn check(&self, request: AuthorizationCheckRequest) -> AppResult<AuthorizationDecision> {
        let start = std::time::Instant::now();

        let result = self.check_internal(&request).await;

        if let Ok(ref decision) = result {
            counter!("authorization_checks_total",
                "decision" => decision.decision_source.to_string(),
                "allowed" => decision.allowed.to_string()
            )
            .increment(1);
        } else {
            counter!("authorization_checks_errors_total").increment(1);
        }

        histogram!("authorization_check_duration_ms").record(start.elapsed().as_millis() as f64);

        result
    }

    /// 边界处使用：未授权时返回 Forbidden
    pub async fn require(&self, request: AuthorizationCheckRequest) -> AppResult<()> {
        let decision = self.check(request).await?;
        if decision.allowed {
            return Ok(());
        }
        Err(AppError::forbidden(
            decision
                .denied_reason
                .unwrap_or_else(|| "Access denied".to_string()),
        ))
    }

    async fn check_internal(
        &self,
        request: &AuthorizationCheckRequest,
    ) -> AppResult<AuthorizationDecision> {
        let access = self.module_access(&request.user_id, &request.module_id).await?;

        let decision = if access.allows(request.action) {
            AuthorizationDecision {
                allowed: true,
                decision_source: DecisionSource::Rbac,
                denied_reason: None,
            }
        } else {
            AuthorizationDecision {
                allowed: false,
                decision_source: DecisionSource::DefaultDeny,
                denied_reason: Some(format!(
                    "No role grants '{}' on module {}",
                    request.action, request.module_id
                )),
            }
        };

        debug!(
            user_id = %request.user_id,
            module_id = %request.module_id,
            action = %request.action,
            allowed = decision.allowed,
            "Authorization check"
        );
        Ok(decision)
    }

    /// 功能开关是否对用户启用
    pub async fn function_enabled(&self, user_id: &UserId, function_code: &str) -> AppResult<bool> {
        let role_ids = self.role_ids(user_id).await?;
        if role_ids.is_empty() {
            return Ok(false);
        }
        let rows = self
            .permission_repo
            .find_function_permissions_by_roles(&role_ids)
            .await?;
        Ok(resolve_function_access(&rows, function_code))
    }
}
