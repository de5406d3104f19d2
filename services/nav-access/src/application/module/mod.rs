//! 模块管理用例

pub mod commands;
pub mod handlers;
pub mod query_handlers;

pub use commands::{CreateModuleCommand, DeleteModuleCommand, UpdateModuleCommand};
pub use handlers::ModuleCommandHandler;
pub use query_handlers::ModuleQueryHandler;
