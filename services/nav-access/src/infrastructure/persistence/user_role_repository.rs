//! PostgreSQL 用户角色仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use console_common::UserId;
use console_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use super::error_mapper::map_sqlx_error_in;
use super::role_repository::RoleRow;
use crate::domain::role::{Role, RoleId, UserRole, UserRoleRepository};

pub struct PostgresUserRoleRepository {
    pool: PgPool,
}

impl PostgresUserRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRoleRepository for PostgresUserRoleRepository {
    async fn find_roles_by_user(&self, user_id: &UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.description, r.is_active, r.version, r.is_deleted,
                   r.created_at, r.created_by, r.updated_at, r.updated_by
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
              AND NOT ur.is_deleted
              AND r.is_active
              AND NOT r.is_deleted
            ORDER BY r.name
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error_in("user_roles.find_roles_by_user"))?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn find_assignments(&self, user_id: &UserId) -> AppResult<Vec<UserRole>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id, assigned_at, assigned_by, is_deleted
            FROM user_roles
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY assigned_at
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error_in("user_roles.find_assignments"))?;

        Ok(rows.into_iter().map(UserRoleRow::into_user_role).collect())
    }

    async fn assign(&self, user_id: &UserId, role_id: &RoleId, actor: &UserId) -> AppResult<UserRole> {
        // 已移除的关联被恢复并刷新分配时间，有效关联保持原样
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_at, assigned_by, is_deleted)
            VALUES ($1, $2, $3, $4, FALSE)
            ON CONFLICT (user_id, role_id) DO UPDATE
            SET assigned_at = CASE WHEN user_roles.is_deleted THEN EXCLUDED.assigned_at ELSE user_roles.assigned_at END,
                assigned_by = CASE WHEN user_roles.is_deleted THEN EXCLUDED.assigned_by ELSE user_roles.assigned_by END,
                is_deleted = FALSE,
                removed_at = NULL,
                removed_by = NULL
            RETURNING user_id, role_id, assigned_at, assigned_by, is_deleted
            "#,
        )
        .bind(user_id.0)
        .bind(role_id.0)
        .bind(Utc::now())
        .bind(actor.0)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error_in("user_roles.assign"))?;

        Ok(row.into_user_role())
    }

    async fn remove(&self, user_id: &UserId, role_id: &RoleId, actor: &UserId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_roles
            SET is_deleted = TRUE, removed_at = NOW(), removed_by = $3
            WHERE user_id = $1 AND role_id = $2 AND NOT is_deleted
            "#,
        )
        .bind(user_id.0)
        .bind(role_id.0)
        .bind(actor.0)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("user_roles.remove"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct UserRoleRow {
    user_id: Uuid,
    role_id: Uuid,
    assigned_at: DateTime<Utc>,
    assigned_by: Option<Uuid>,
    is_deleted: bool,
}

impl UserRoleRow {
    fn into_user_role(self) -> UserRole {
        UserRole {
            user_id: UserId::from_uuid(self.user_id),
            role_id: RoleId::from_uuid(self.role_id),
            assigned_at: self.assigned_at,
            assigned_by: self.assigned_by.map(UserId::from_uuid),
            is_deleted: self.is_deleted,
        }
    }
}
