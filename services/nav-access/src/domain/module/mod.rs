//! 导航模块领域

#![allow(clippy::module_inception)]

pub mod hierarchy;
pub mod module;
pub mod repository;

pub use hierarchy::{ModuleNode, build_hierarchy, would_create_cycle};
pub use module::{Module, ModuleId, ModulePatch, NewModule, route_from_code};
pub use repository::ModuleRepository;
