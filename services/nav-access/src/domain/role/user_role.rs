//! 用户角色关联

use chrono::{DateTime, Utc};
use console_common::UserId;
use serde::{Deserialize, Serialize};

use super::role::RoleId;

/// 用户与角色的关联
///
/// 移除时只做软删除，重新分配时复活并刷新 `assigned_at`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<UserId>,
    pub is_deleted: bool,
}

impl UserRole {
    pub fn new(user_id: UserId, role_id: RoleId, assigned_by: Option<UserId>) -> Self {
        Self {
            user_id,
            role_id,
            assigned_at: Utc::now(),
            assigned_by,
            is_deleted: false,
        }
    }
}
