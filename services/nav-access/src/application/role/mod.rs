//! 角色管理用例

pub mod commands;
pub mod handlers;
pub mod permission_handler;
pub mod query_handlers;

pub use commands::*;
pub use handlers::RoleCommandHandler;
pub use permission_handler::{ReplaceStep, RolePermissionCommandHandler};
pub use query_handlers::RoleQueryHandler;
