//! 角色实体

use console_common::{AuditInfo, UserId};
use console_domain_core::{AggregateRoot, Entity, SoftDeletable, Versioned};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 角色 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct RoleId(pub Uuid);

impl RoleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for RoleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 角色实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// 未删除角色之间唯一
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub version: i32,
    pub audit_info: AuditInfo,
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// 角色部分更新
#[derive(Debug, Clone, Default)]
pub struct RolePatch {
    pub expected_version: i32,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl Role {
    pub fn create(draft: NewRole, actor: &UserId) -> Self {
        Self {
            id: RoleId::new(),
            name: draft.name,
            description: draft.description,
            is_active: draft.is_active,
            is_deleted: false,
            version: 1,
            audit_info: AuditInfo::created_by(actor),
        }
    }

    pub fn apply(&mut self, patch: RolePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Role {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl Versioned for Role {
    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

impl SoftDeletable for Role {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_deleted_flags(&mut self, is_deleted: bool, is_active: bool) {
        self.is_deleted = is_deleted;
        self.is_active = is_active;
    }
}
