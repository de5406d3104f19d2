//! 导航用例

pub mod icons;
pub mod service;

pub use icons::IconRegistry;
pub use service::{NavItem, NavigationService};
