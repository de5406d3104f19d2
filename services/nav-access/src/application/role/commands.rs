//! 角色相关命令定义

use console_common::{UserId, non_blank};

use crate::domain::module::ModuleId;
use crate::domain::role::{ModuleAccess, NewRole, RoleId, RolePatch};

fn validate_role_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Role name cannot be empty".to_string());
    }
    if name.len() > 200 {
        return Err("Role name cannot exceed 200 characters".to_string());
    }
    Ok(())
}

/// 创建角色命令
#[derive(Debug, Clone)]
pub struct CreateRoleCommand {
    pub name: String,
    pub description: Option<String>,
    pub performed_by: UserId,
}

impl CreateRoleCommand {
    pub fn validate(&self) -> Result<(), String> {
        validate_role_name(&self.name)?;
        if let Some(ref desc) = self.description
            && desc.len() > 1000
        {
            return Err("Role description cannot exceed 1000 characters".to_string());
        }
        Ok(())
    }

    pub fn into_draft(self) -> NewRole {
        NewRole {
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            is_active: true,
        }
    }
}

/// 更新角色命令
#[derive(Debug, Clone)]
pub struct UpdateRoleCommand {
    pub role_id: RoleId,
    pub expected_version: i32,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub performed_by: UserId,
}

impl UpdateRoleCommand {
    pub fn validate(&self) -> Result<(), String> {
        if self.expected_version < 1 {
            return Err("Expected version must be supplied".to_string());
        }
        if let Some(name) = &self.name {
            validate_role_name(name)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> RolePatch {
        RolePatch {
            expected_version: self.expected_version,
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(non_blank),
            is_active: self.is_active,
        }
    }
}

/// 删除角色命令
#[derive(Debug, Clone)]
pub struct DeleteRoleCommand {
    pub role_id: RoleId,
    pub performed_by: UserId,
}

/// 为用户分配角色命令
#[derive(Debug, Clone)]
pub struct AssignRolesToUserCommand {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
    pub performed_by: UserId,
}

/// 移除用户角色命令
#[derive(Debug, Clone)]
pub struct RemoveRolesFromUserCommand {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
    pub performed_by: UserId,
}

/// 单个模块的授权
#[derive(Debug, Clone, PartialEq)]
pub struct ModulePermissionInput {
    pub module_id: ModuleId,
    pub access: ModuleAccess,
}

/// 单个功能的授权
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPermissionInput {
    pub function_code: String,
    pub is_enabled: bool,
}

/// 整体替换角色权限命令
///
/// 两个列表都为空时清空角色的全部权限。
#[derive(Debug, Clone)]
pub struct ReplaceRolePermissionsCommand {
    pub role_id: RoleId,
    pub module_permissions: Vec<ModulePermissionInput>,
    pub function_permissions: Vec<FunctionPermissionInput>,
    pub performed_by: UserId,
}

impl ReplaceRolePermissionsCommand {
    /// 同一模块或同一功能编码只能出现一次
    pub fn validate(&self) -> Result<(), String> {
        let mut modules = std::collections::HashSet::new();
        for entry in &self.module_permissions {
            if !modules.insert(&entry.module_id) {
                return Err(format!(
                    "Module {} appears more than once in the permission set",
                    entry.module_id
                ));
            }
        }

        let mut functions = std::collections::HashSet::new();
        for entry in &self.function_permissions {
            let code = entry.function_code.trim();
            if code.is_empty() {
                return Err("Function code cannot be empty".to_string());
            }
            if !functions.insert(code) {
                return Err(format!(
                    "Function '{}' appears more than once in the permission set",
                    code
                ));
            }
        }
        Ok(())
    }
}
