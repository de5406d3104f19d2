//! 实体基础 trait

use std::fmt::Display;

use console_common::{AuditInfo, UserId};
use console_errors::{AppError, AppResult};

/// 实体 trait
pub trait Entity {
    type Id: Display;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
    fn audit_info_mut(&mut self) -> &mut AuditInfo;
}

/// 乐观锁版本号
///
/// 新建实体版本为 1，每次更新 (包括软删除) 加 1
pub trait Versioned {
    fn version(&self) -> i32;
    fn set_version(&mut self, version: i32);

    fn bump_version(&mut self) {
        let next = self.version() + 1;
        self.set_version(next);
    }
}

/// 软删除
///
/// 删除时 `is_deleted = true` 与 `is_active = false` 必须同时设置
pub trait SoftDeletable {
    fn is_deleted(&self) -> bool;
    fn is_active(&self) -> bool;
    fn set_deleted_flags(&mut self, is_deleted: bool, is_active: bool);

    /// 标记删除，已删除时返回 false
    fn mark_deleted(&mut self) -> bool {
        if self.is_deleted() {
            return false;
        }
        self.set_deleted_flags(true, false);
        true
    }

    /// 未删除且处于激活状态
    fn is_live(&self) -> bool {
        !self.is_deleted() && self.is_active()
    }
}

/// 校验调用方提供的期望版本
pub fn ensure_version<T>(entity: &T, expected: i32) -> AppResult<()>
where
    T: Entity + Versioned,
{
    if entity.version() != expected {
        return Err(AppError::conflict(format!(
            "{} was modified concurrently (expected version {}, found {})",
            entity.id(),
            expected,
            entity.version()
        )));
    }
    Ok(())
}

/// 对聚合根执行一次带审计的更新：版本加 1 并记录操作人
pub fn stamp_update<T>(entity: &mut T, actor: &UserId)
where
    T: AggregateRoot + Versioned,
{
    entity.bump_version();
    entity.audit_info_mut().touch(actor);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        id: String,
        version: i32,
        is_deleted: bool,
        is_active: bool,
        audit_info: AuditInfo,
    }

    impl Entity for Doc {
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    impl AggregateRoot for Doc {
        fn audit_info(&self) -> &AuditInfo {
            &self.audit_info
        }

        fn audit_info_mut(&mut self) -> &mut AuditInfo {
            &mut self.audit_info
        }
    }

    impl Versioned for Doc {
        fn version(&self) -> i32 {
            self.version
        }

        fn set_version(&mut self, version: i32) {
            self.version = version;
        }
    }

    impl SoftDeletable for Doc {
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

    fn doc() -> Doc {
        Doc {
            id: "doc-1".to_string(),
            version: 1,
            is_deleted: false,
            is_active: true,
            audit_info: AuditInfo::default(),
        }
    }

    #[test]
    fn test_ensure_version() {
        let d = doc();
        assert!(ensure_version(&d, 1).is_ok());

        let err = ensure_version(&d, 2).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_mark_deleted_deactivates() {
        let mut d = doc();
        assert!(d.is_live());
        assert!(d.mark_deleted());
        assert!(d.is_deleted());
        assert!(!d.is_active());
        assert!(!d.is_live());

        // 重复删除不改变状态
        assert!(!d.mark_deleted());
    }

    #[test]
    fn test_stamp_update() {
        let mut d = doc();
        let actor = UserId::new();
        stamp_update(&mut d, &actor);
        assert_eq!(d.version(), 2);
        assert_eq!(d.audit_info().updated_by, Some(actor));
    }
}
