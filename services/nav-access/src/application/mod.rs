//! 应用层

pub mod authorization;
pub mod module;
pub mod navigation;
pub mod role;

pub use authorization::{
    AuthorizationCheckRequest, AuthorizationDecision, AuthorizationService, DecisionSource,
};
pub use module::{
    CreateModuleCommand, DeleteModuleCommand, ModuleCommandHandler, ModuleQueryHandler,
    UpdateModuleCommand,
};
pub use navigation::{IconRegistry, NavItem, NavigationService};
pub use role::{
    AssignRolesToUserCommand, CreateRoleCommand, DeleteRoleCommand, FunctionPermissionInput,
    ModulePermissionInput, RemoveRolesFromUserCommand, ReplaceRolePermissionsCommand, ReplaceStep,
    RoleCommandHandler, RolePermissionCommandHandler, RoleQueryHandler, UpdateRoleCommand,
};
