//! nav-access - 导航模块层级与角色权限服务
//!
//! 模块组成任意深度的树，既用于渲染导航，也作为按模块授权的粒度。

pub mod application;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use context::AppContext;
pub use error::NavAccessError;
