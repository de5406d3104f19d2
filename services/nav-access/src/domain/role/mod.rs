//! 角色与权限领域

#![allow(clippy::module_inception)]

pub mod permission;
pub mod repository;
pub mod resolver;
pub mod role;
pub mod user_role;

pub use permission::{
    ModuleAccess, ModuleAction, RoleFunctionPermission, RoleModulePermission, RolePermissionSet,
};
pub use repository::{RolePermissionRepository, RoleRepository, UserRoleRepository};
pub use resolver::{resolve_all_module_access, resolve_function_access, resolve_module_access};
pub use role::{NewRole, Role, RoleId, RolePatch};
pub use user_role::UserRole;
