//! 模块相关命令定义

use console_common::{UserId, non_blank};

use crate::domain::module::{ModuleId, ModulePatch, NewModule};

const MAX_CODE_LEN: usize = 100;
const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_ROUTE_LEN: usize = 500;

/// 校验模块编码：`SEGMENT(.SEGMENT)*`，段内只允许字母、数字和下划线
pub fn validate_module_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Module code cannot be empty".to_string());
    }
    if code.len() > MAX_CODE_LEN {
        return Err(format!("Module code cannot exceed {} characters", MAX_CODE_LEN));
    }
    let well_formed = code.split('.').all(|segment| {
        !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if !well_formed {
        return Err(
            "Module code must be dot-separated segments of letters, digits and underscores"
                .to_string(),
        );
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Module name cannot be empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("Module name cannot exceed {} characters", MAX_NAME_LEN));
    }
    Ok(())
}

fn validate_optional(
    value: Option<&str>,
    field: &str,
    max: usize,
) -> Result<(), String> {
    match value {
        Some(v) if v.len() > max => Err(format!("Module {} cannot exceed {} characters", field, max)),
        _ => Ok(()),
    }
}

/// 创建模块命令
#[derive(Debug, Clone)]
pub struct CreateModuleCommand {
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
    pub performed_by: UserId,
}

impl CreateModuleCommand {
    pub fn new(code: impl Into<String>, name: impl Into<String>, performed_by: UserId) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            icon: None,
            route: None,
            parent_id: None,
            sort_order: 0,
            is_visible: true,
            is_active: true,
            required_role: None,
            performed_by,
        }
    }

    pub fn with_parent(mut self, parent_id: ModuleId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_module_code(self.code.trim())?;
        validate_name(&self.name)?;
        validate_optional(self.description.as_deref(), "description", MAX_DESCRIPTION_LEN)?;
        validate_optional(self.route.as_deref(), "route", MAX_ROUTE_LEN)?;
        Ok(())
    }

    /// 转换为领域草稿，空白的可选字段视为未设置
    pub fn into_draft(self) -> NewModule {
        NewModule {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            icon: non_blank(self.icon),
            route: non_blank(self.route),
            parent_id: self.parent_id,
            sort_order: self.sort_order,
            is_visible: self.is_visible,
            is_active: self.is_active,
            required_role: non_blank(self.required_role),
        }
    }
}

/// 更新模块命令
///
/// 可选字段为 `None` 时不修改；`parent_id: Some(None)` 表示移到根级。
#[derive(Debug, Clone)]
pub struct UpdateModuleCommand {
    pub module_id: ModuleId,
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
    pub performed_by: UserId,
}

impl UpdateModuleCommand {
    pub fn new(module_id: ModuleId, expected_version: i32, performed_by: UserId) -> Self {
        Self {
            module_id,
            expected_version,
            code: None,
            name: None,
            description: None,
            icon: None,
            route: None,
            parent_id: None,
            sort_order: None,
            is_visible: None,
            is_active: None,
            required_role: None,
            performed_by,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.expected_version < 1 {
            return Err("Expected version must be supplied".to_string());
        }
        if let Some(code) = &self.code {
            validate_module_code(code.trim())?;
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_optional(description.as_deref(), "description", MAX_DESCRIPTION_LEN)?;
        }
        if let Some(route) = &self.route {
            validate_optional(route.as_deref(), "route", MAX_ROUTE_LEN)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> ModulePatch {
        ModulePatch {
            expected_version: self.expected_version,
            code: self.code.map(|c| c.trim().to_string()),
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(non_blank),
            icon: self.icon.map(non_blank),
            route: self.route.map(non_blank),
            parent_id: self.parent_id,
            sort_order: self.sort_order,
            is_visible: self.is_visible,
            is_active: self.is_active,
            required_role: self.required_role.map(non_blank),
        }
    }
}

/// 删除模块命令
#[derive(Debug, Clone)]
pub struct DeleteModuleCommand {
    pub module_id: ModuleId,
    pub performed_by: UserId,
}
