//! domain-core - 跨 context 的领域核心类型
//!
//! 实体、聚合根以及统一的乐观锁 / 软删除约定

mod entity;

pub use entity::*;

// Re-export common types
pub use console_common::{AuditInfo, UserId};
