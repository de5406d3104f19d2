//! PostgreSQL 角色权限仓储实现
//!
//! SQL 写在以连接为参数的函数里，连接池实现与事务实现共用。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use console_common::UserId;
use console_errors::AppResult;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::error_mapper::map_sqlx_error_in;
use crate::domain::module::ModuleId;
use crate::domain::role::{
    ModuleAccess, RoleFunctionPermission, RoleId, RoleModulePermission, RolePermissionRepository,
};

/// 单条 INSERT 的最大行数，避免超过 PostgreSQL 的绑定参数上限
const INSERT_CHUNK: usize = 1000;

pub struct PostgresRolePermissionRepository {
    pool: PgPool,
}

impl PostgresRolePermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RolePermissionRepository for PostgresRolePermissionRepository {
    async fn find_module_permissions(&self, role_id: &RoleId) -> AppResult<Vec<RoleModulePermission>> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        select_module_permissions(&mut conn, &[role_id.0]).await
    }

    async fn find_module_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleModulePermission>> {
        let ids: Vec<Uuid> = role_ids.iter().map(|r| r.0).collect();
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        select_module_permissions(&mut conn, &ids).await
    }

    async fn find_function_permissions(
        &self,
        role_id: &RoleId,
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        select_function_permissions(&mut conn, &[role_id.0]).await
    }

    async fn find_function_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        let ids: Vec<Uuid> = role_ids.iter().map(|r| r.0).collect();
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        select_function_permissions(&mut conn, &ids).await
    }

    async fn clear_module_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        delete_module_permissions(&mut conn, role_id).await
    }

    async fn clear_function_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        delete_function_permissions(&mut conn, role_id).await
    }

    async fn insert_module_permissions(&self, rows: &[RoleModulePermission]) -> AppResult<()> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        insert_module_rows(&mut conn, rows).await
    }

    async fn insert_function_permissions(&self, rows: &[RoleFunctionPermission]) -> AppResult<()> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error_in("acquire"))?;
        insert_function_rows(&mut conn, rows).await
    }
}

pub(super) async fn select_module_permissions(
    conn: &mut PgConnection,
    role_ids: &[Uuid],
) -> AppResult<Vec<RoleModulePermission>> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, ModulePermissionRow>(
        r#"
        SELECT role_id, module_id, can_view, can_create, can_edit, can_delete, can_execute,
               granted_by, granted_at
        FROM role_module_permissions
        WHERE role_id = ANY($1)
        ORDER BY role_id, module_id
        "#,
    )
    .bind(role_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error_in("role_module_permissions.select"))?;

    Ok(rows.into_iter().map(ModulePermissionRow::into_permission).collect())
}

pub(super) async fn select_function_permissions(
    conn: &mut PgConnection,
    role_ids: &[Uuid],
) -> AppResult<Vec<RoleFunctionPermission>> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, FunctionPermissionRow>(
        r#"
        SELECT role_id, function_code, is_enabled, granted_by, granted_at
        FROM role_function_permissions
        WHERE role_id = ANY($1)
        ORDER BY role_id, function_code
        "#,
    )
    .bind(role_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_error_in("role_function_permissions.select"))?;

    Ok(rows.into_iter().map(FunctionPermissionRow::into_permission).collect())
}

pub(super) async fn delete_module_permissions(
    conn: &mut PgConnection,
    role_id: &RoleId,
) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM role_module_permissions WHERE role_id = $1")
        .bind(role_id.0)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error_in("role_module_permissions.delete"))?;
    Ok(result.rows_affected())
}

pub(super) async fn delete_function_permissions(
    conn: &mut PgConnection,
    role_id: &RoleId,
) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM role_function_permissions WHERE role_id = $1")
        .bind(role_id.0)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error_in("role_function_permissions.delete"))?;
    Ok(result.rows_affected())
}

pub(super) async fn insert_module_rows(
    conn: &mut PgConnection,
    rows: &[RoleModulePermission],
) -> AppResult<()> {
    for chunk in rows.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO role_module_permissions \
             (role_id, module_id, can_view, can_create, can_edit, can_delete, can_execute, granted_by, granted_at) ",
        );
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.role_id.0)
                .push_bind(row.module_id.0)
                .push_bind(row.access.can_view)
                .push_bind(row.access.can_create)
                .push_bind(row.access.can_edit)
                .push_bind(row.access.can_delete)
                .push_bind(row.access.can_execute)
                .push_bind(row.granted_by.as_ref().map(|u| u.0))
                .push_bind(row.granted_at);
        });

        builder
            .build()
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error_in("role_module_permissions.insert"))?;
    }
    Ok(())
}

pub(super) async fn insert_function_rows(
    conn: &mut PgConnection,
    rows: &[RoleFunctionPermission],
) -> AppResult<()> {
    for chunk in rows.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO role_function_permissions \
             (role_id, function_code, is_enabled, granted_by, granted_at) ",
        );
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.role_id.0)
                .push_bind(&row.function_code)
                .push_bind(row.is_enabled)
                .push_bind(row.granted_by.as_ref().map(|u| u.0))
                .push_bind(row.granted_at);
        });

        builder
            .build()
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error_in("role_function_permissions.insert"))?;
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct ModulePermissionRow {
    role_id: Uuid,
    module_id: Uuid,
    can_view: bool,
    can_create: bool,
    can_edit: bool,
    can_delete: bool,
    can_execute: bool,
    granted_by: Option<Uuid>,
    granted_at: DateTime<Utc>,
}

impl ModulePermissionRow {
    fn into_permission(self) -> RoleModulePermission {
        RoleModulePermission {
            role_id: RoleId::from_uuid(self.role_id),
            module_id: ModuleId::from_uuid(self.module_id),
            access: ModuleAccess {
                can_view: self.can_view,
                can_create: self.can_create,
                can_edit: self.can_edit,
                can_delete: self.can_delete,
                can_execute: self.can_execute,
            },
            granted_by: self.granted_by.map(UserId::from_uuid),
            granted_at: self.granted_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FunctionPermissionRow {
    role_id: Uuid,
    function_code: String,
    is_enabled: bool,
    granted_by: Option<Uuid>,
    granted_at: DateTime<Utc>,
}

impl FunctionPermissionRow {
    fn into_permission(self) -> RoleFunctionPermission {
        RoleFunctionPermission {
            role_id: RoleId::from_uuid(self.role_id),
            function_code: self.function_code,
            is_enabled: self.is_enabled,
            granted_by: self.granted_by.map(UserId::from_uuid),
            granted_at: self.granted_at,
        }
    }
}
