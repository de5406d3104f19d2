//! 角色权限
//!
//! 模块权限与功能权限都是默认拒绝：没有授权行即无权限，且不沿模块树继承。

use std::ops::{BitOr, BitOrAssign};

use chrono::{DateTime, Utc};
use console_common::UserId;
use serde::{Deserialize, Serialize};

use super::role::RoleId;
use crate::domain::module::ModuleId;

/// 模块操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleAction {
    View,
    Create,
    Edit,
    Delete,
    Execute,
}

impl ModuleAction {
    pub const ALL: [ModuleAction; 5] = [
        ModuleAction::View,
        ModuleAction::Create,
        ModuleAction::Edit,
        ModuleAction::Delete,
        ModuleAction::Execute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleAction::View => "view",
            ModuleAction::Create => "create",
            ModuleAction::Edit => "edit",
            ModuleAction::Delete => "delete",
            ModuleAction::Execute => "execute",
        }
    }
}

impl std::fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModuleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(ModuleAction::View),
            "create" => Ok(ModuleAction::Create),
            "edit" => Ok(ModuleAction::Edit),
            "delete" => Ok(ModuleAction::Delete),
            "execute" => Ok(ModuleAction::Execute),
            other => Err(format!("Unknown module action: {}", other)),
        }
    }
}

/// 一个模块上的五个独立权限位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccess {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_execute: bool,
}

impl ModuleAccess {
    /// 全部拒绝
    pub fn none() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
            can_execute: true,
        }
    }

    pub fn view_only() -> Self {
        Self {
            can_view: true,
            ..Self::default()
        }
    }

    pub fn allows(&self, action: ModuleAction) -> bool {
        match action {
            ModuleAction::View => self.can_view,
            ModuleAction::Create => self.can_create,
            ModuleAction::Edit => self.can_edit,
            ModuleAction::Delete => self.can_delete,
            ModuleAction::Execute => self.can_execute,
        }
    }

    pub fn is_empty(&self) -> bool {
        !ModuleAction::ALL.iter().any(|a| self.allows(*a))
    }
}

impl BitOr for ModuleAccess {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            can_view: self.can_view || rhs.can_view,
            can_create: self.can_create || rhs.can_create,
            can_edit: self.can_edit || rhs.can_edit,
            can_delete: self.can_delete || rhs.can_delete,
            can_execute: self.can_execute || rhs.can_execute,
        }
    }
}

impl BitOrAssign for ModuleAccess {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// 角色在某个模块上的授权行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleModulePermission {
    pub role_id: RoleId,
    pub module_id: ModuleId,
    #[serde(flatten)]
    pub access: ModuleAccess,
    pub granted_by: Option<UserId>,
    pub granted_at: DateTime<Utc>,
}

impl RoleModulePermission {
    pub fn new(role_id: RoleId, module_id: ModuleId, access: ModuleAccess) -> Self {
        Self {
            role_id,
            module_id,
            access,
            granted_by: None,
            granted_at: Utc::now(),
        }
    }

    pub fn granted_by(mut self, actor: &UserId) -> Self {
        self.granted_by = Some(actor.clone());
        self
    }
}

/// 角色的功能开关授权行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleFunctionPermission {
    pub role_id: RoleId,
    pub function_code: String,
    pub is_enabled: bool,
    pub granted_by: Option<UserId>,
    pub granted_at: DateTime<Utc>,
}

impl RoleFunctionPermission {
    pub fn new(role_id: RoleId, function_code: impl Into<String>, is_enabled: bool) -> Self {
        Self {
            role_id,
            function_code: function_code.into(),
            is_enabled,
            granted_by: None,
            granted_at: Utc::now(),
        }
    }

    pub fn granted_by(mut self, actor: &UserId) -> Self {
        self.granted_by = Some(actor.clone());
        self
    }
}

/// 一个角色的完整权限集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermissionSet {
    pub role_id: RoleId,
    pub module_permissions: Vec<RoleModulePermission>,
    pub function_permissions: Vec<RoleFunctionPermission>,
}

impl RolePermissionSet {
    pub fn is_empty(&self) -> bool {
        self.module_permissions.is_empty() && self.function_permissions.is_empty()
    }
}
