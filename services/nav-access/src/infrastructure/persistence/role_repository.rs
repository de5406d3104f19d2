//! PostgreSQL 角色仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use console_common::{AuditInfo, UserId};
use console_domain_core::{SoftDeletable, ensure_version, stamp_update};
use console_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::error_mapper::map_sqlx_error_in;
use crate::domain::role::{NewRole, Role, RoleId, RolePatch, RoleRepository};

pub(super) const ROLE_COLUMNS: &str =
    "id, name, description, is_active, version, is_deleted, created_at, created_by, updated_at, updated_by";

pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_any(&self, id: &RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE id = $1",
            ROLE_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error_in("roles.find"))?;

        Ok(row.map(RoleRow::into_role))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.find_any(id).await?.filter(|r| !r.is_deleted))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE name = $1 AND NOT is_deleted",
            ROLE_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error_in("roles.find_by_name"))?;

        Ok(row.map(RoleRow::into_role))
    }

    async fn list_active(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE is_active AND NOT is_deleted ORDER BY name",
            ROLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error_in("roles.list_active"))?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn create(&self, draft: NewRole, actor: &UserId) -> AppResult<Role> {
        let role = Role::create(draft, actor);

        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, is_active, version, is_deleted,
                               created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(role.id.0)
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.is_active)
        .bind(role.version)
        .bind(role.is_deleted)
        .bind(role.audit_info.created_at)
        .bind(role.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(role.audit_info.updated_at)
        .bind(role.audit_info.updated_by.as_ref().map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("roles.create"))?;

        Ok(role)
    }

    async fn update(&self, id: &RoleId, patch: RolePatch, actor: &UserId) -> AppResult<Role> {
        let mut role = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))?;

        let expected_version = patch.expected_version;
        ensure_version(&role, expected_version)?;
        role.apply(patch);
        stamp_update(&mut role, actor);

        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $3, description = $4, is_active = $5, version = $6,
                updated_at = $7, updated_by = $8
            WHERE id = $1 AND version = $2 AND NOT is_deleted
            "#,
        )
        .bind(role.id.0)
        .bind(expected_version)
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.is_active)
        .bind(role.version)
        .bind(role.audit_info.updated_at)
        .bind(role.audit_info.updated_by.as_ref().map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("roles.update"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Role {} was modified concurrently (expected version {})",
                id, expected_version
            )));
        }

        Ok(role)
    }

    async fn delete(&self, id: &RoleId, actor: &UserId) -> AppResult<bool> {
        let mut role = self
            .find_any(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))?;

        if !role.mark_deleted() {
            return Ok(true);
        }
        stamp_update(&mut role, actor);

        sqlx::query(
            r#"
            UPDATE roles
            SET is_deleted = TRUE, is_active = FALSE, version = version + 1,
                updated_at = $2, updated_by = $3
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id.0)
        .bind(role.audit_info.updated_at)
        .bind(actor.0)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("roles.delete"))?;

        Ok(true)
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct RoleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
    version: i32,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl RoleRow {
    pub(super) fn into_role(self) -> Role {
        Role {
            id: RoleId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            is_deleted: self.is_deleted,
            version: self.version,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}
