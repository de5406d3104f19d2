//! 权限解析
//!
//! 纯函数，每次调用重新计算，不做缓存。输入的授权行必须只来自激活且未删除的角色，
//! 这一过滤由 `UserRoleRepository::find_roles_by_user` 完成，这里不再复查。

use std::collections::HashMap;

use super::permission::{ModuleAccess, RoleFunctionPermission, RoleModulePermission};
use crate::domain::module::ModuleId;

/// 对指定模块的所有授权行按位取或，没有授权行时全部为 false
pub fn resolve_module_access(rows: &[RoleModulePermission], module_id: &ModuleId) -> ModuleAccess {
    rows.iter()
        .filter(|row| &row.module_id == module_id)
        .fold(ModuleAccess::none(), |acc, row| acc | row.access)
}

/// 按模块汇总所有授权行
pub fn resolve_all_module_access(rows: &[RoleModulePermission]) -> HashMap<ModuleId, ModuleAccess> {
    let mut resolved: HashMap<ModuleId, ModuleAccess> = HashMap::new();
    for row in rows {
        *resolved.entry(row.module_id.clone()).or_default() |= row.access;
    }
    resolved
}

/// 任一授权行启用即为 true
pub fn resolve_function_access(rows: &[RoleFunctionPermission], function_code: &str) -> bool {
    rows.iter()
        .any(|row| row.function_code == function_code && row.is_enabled)
}
