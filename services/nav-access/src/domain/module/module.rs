//! 导航模块实体

use console_common::{AuditInfo, UserId};
use console_domain_core::{AggregateRoot, Entity, SoftDeletable, Versioned};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 模块 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct ModuleId(pub Uuid);

impl ModuleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for ModuleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 导航模块
///
/// 模块通过 `parent_id` 组成任意深度的树，同时作为按模块授权的粒度。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    /// 点分命名的唯一编码，例如 `HR.EMPLOYEES`
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// 图标的符号名，由导航层解析为具体字形
    pub icon: Option<String>,
    pub route: Option<String>,
    pub parent_id: Option<ModuleId>,
    pub sort_order: i32,
    pub is_visible: bool,
    pub is_active: bool,
    /// 旧版单角色门禁，仅保存，鉴权以角色模块权限为准
    pub required_role: Option<String>,
    pub version: i32,
    pub is_deleted: bool,
    pub audit_info: AuditInfo,
}

/// 新建模块所需字段
#[derive(Debug, Clone, Default)]
pub struct NewModule {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    pub parent_id: Option<ModuleId>,
    pub sort_order: i32,
    pub is_visible: bool,
    pub is_active: bool,
    pub required_role: Option<String>,
}

/// 模块部分更新
///
/// `None` 表示不修改；`parent_id: Some(None)` 表示移动到根级。
#[derive(Debug, Clone, Default)]
pub struct ModulePatch {
    pub expected_version: i32,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub route: Option<Option<String>>,
    pub parent_id: Option<Option<ModuleId>>,
    pub sort_order: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_active: Option<bool>,
    pub required_role: Option<Option<String>>,
}

impl ModulePatch {
    pub fn new(expected_version: i32) -> Self {
        Self {
            expected_version,
            ..Default::default()
        }
    }
}

impl Module {
    /// 以操作人身份创建模块 (版本 1，未删除)
    pub fn create(draft: NewModule, actor: &UserId) -> Self {
        Self {
            id: ModuleId::new(),
            code: draft.code,
            name: draft.name,
            description: draft.description,
            icon: draft.icon,
            route: draft.route,
            parent_id: draft.parent_id,
            sort_order: draft.sort_order,
            is_visible: draft.is_visible,
            is_active: draft.is_active,
            required_role: draft.required_role,
            version: 1,
            is_deleted: false,
            audit_info: AuditInfo::created_by(actor),
        }
    }

    /// 应用字段修改，不处理版本和审计
    pub fn apply(&mut self, patch: ModulePatch) {
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(route) = patch.route {
            self.route = route;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(is_visible) = patch.is_visible {
            self.is_visible = is_visible;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(required_role) = patch.required_role {
            self.required_role = required_role;
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// 实际使用的路由：未配置时由编码推导
    pub fn effective_route(&self) -> String {
        match self.route.as_deref().map(str::trim) {
            Some(route) if !route.is_empty() => route.to_string(),
            _ => route_from_code(&self.code),
        }
    }
}

/// `HR.EMPLOYEES` → `/hr/employees`
pub fn route_from_code(code: &str) -> String {
    format!("/{}", code.trim().to_lowercase().replace('.', "/"))
}

impl Entity for Module {
    type Id = ModuleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Module {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl Versioned for Module {
    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

impl SoftDeletable for Module {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_deleted_flags(&mut self, is_deleted: bool, is_active: bool) {
        self.is_deleted = is_deleted;
        self.is_active = is_active;
    }
}
