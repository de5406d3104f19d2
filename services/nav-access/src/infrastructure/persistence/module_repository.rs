//! PostgreSQL 模块仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use console_common::{AuditInfo, UserId};
use console_domain_core::{SoftDeletable, ensure_version, stamp_update};
use console_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::error_mapper::map_sqlx_error_in;
use crate::domain::module::{Module, ModuleId, ModulePatch, ModuleRepository, NewModule};

const MODULE_COLUMNS: &str = "id, code, name, description, icon, route, parent_id, sort_order, \
    is_visible, is_active, required_role, version, is_deleted, \
    created_at, created_by, updated_at, updated_by";

pub struct PostgresModuleRepository {
    pool: PgPool,
}

impl PostgresModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 包含已删除的行，用于区分 "已删除" 与 "从未存在"
    async fn find_any(&self, id: &ModuleId) -> AppResult<Option<Module>> {
        let row = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {} FROM modules WHERE id = $1",
            MODULE_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.find"))?;

        Ok(row.map(ModuleRow::into_module))
    }
}

#[async_trait]
impl ModuleRepository for PostgresModuleRepository {
    async fn get_all_active_modules(&self) -> AppResult<Vec<Module>> {
        let rows = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {} FROM modules WHERE is_active AND NOT is_deleted ORDER BY sort_order, id",
            MODULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.get_all_active"))?;

        Ok(rows.into_iter().map(ModuleRow::into_module).collect())
    }

    async fn get_modules_by_parent(&self, parent_id: Option<&ModuleId>) -> AppResult<Vec<Module>> {
        let rows = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {} FROM modules WHERE parent_id IS NOT DISTINCT FROM $1 AND NOT is_deleted \
             ORDER BY sort_order, id",
            MODULE_COLUMNS
        ))
        .bind(parent_id.map(|p| p.0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.get_by_parent"))?;

        Ok(rows.into_iter().map(ModuleRow::into_module).collect())
    }

    async fn find_by_id(&self, id: &ModuleId) -> AppResult<Option<Module>> {
        Ok(self.find_any(id).await?.filter(|m| !m.is_deleted))
    }

    async fn find_all(&self) -> AppResult<Vec<Module>> {
        let rows = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {} FROM modules WHERE NOT is_deleted ORDER BY sort_order, id",
            MODULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.find_all"))?;

        Ok(rows.into_iter().map(ModuleRow::into_module).collect())
    }

    async fn exists_by_code(&self, code: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM modules WHERE code = $1 AND NOT is_deleted)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.exists_by_code"))?;

        Ok(exists)
    }

    async fn create(&self, draft: NewModule, actor: &UserId) -> AppResult<Module> {
        let module = Module::create(draft, actor);

        sqlx::query(
            r#"
            INSERT INTO modules (id, code, name, description, icon, route, parent_id, sort_order,
                                 is_visible, is_active, required_role, version, is_deleted,
                                 created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(module.id.0)
        .bind(&module.code)
        .bind(&module.name)
        .bind(&module.description)
        .bind(&module.icon)
        .bind(&module.route)
        .bind(module.parent_id.as_ref().map(|p| p.0))
        .bind(module.sort_order)
        .bind(module.is_visible)
        .bind(module.is_active)
        .bind(&module.required_role)
        .bind(module.version)
        .bind(module.is_deleted)
        .bind(module.audit_info.created_at)
        .bind(module.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(module.audit_info.updated_at)
        .bind(module.audit_info.updated_by.as_ref().map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.create"))?;

        Ok(module)
    }

    async fn update(&self, id: &ModuleId, patch: ModulePatch, actor: &UserId) -> AppResult<Module> {
        let mut module = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Module {} not found", id)))?;

        let expected_version = patch.expected_version;
        ensure_version(&module, expected_version)?;
        module.apply(patch);
        stamp_update(&mut module, actor);

        let result = sqlx::query(
            r#"
            UPDATE modules
            SET code = $3, name = $4, description = $5, icon = $6, route = $7, parent_id = $8,
                sort_order = $9, is_visible = $10, is_active = $11, required_role = $12,
                version = $13, updated_at = $14, updated_by = $15
            WHERE id = $1 AND version = $2 AND NOT is_deleted
            "#,
        )
        .bind(module.id.0)
        .bind(expected_version)
        .bind(&module.code)
        .bind(&module.name)
        .bind(&module.description)
        .bind(&module.icon)
        .bind(&module.route)
        .bind(module.parent_id.as_ref().map(|p| p.0))
        .bind(module.sort_order)
        .bind(module.is_visible)
        .bind(module.is_active)
        .bind(&module.required_role)
        .bind(module.version)
        .bind(module.audit_info.updated_at)
        .bind(module.audit_info.updated_by.as_ref().map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.update"))?;

        // 读取之后被并发修改或删除
        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Module {} was modified concurrently (expected version {})",
                id, expected_version
            )));
        }

        Ok(module)
    }

    async fn delete(&self, id: &ModuleId, actor: &UserId) -> AppResult<bool> {
        let mut module = self
            .find_any(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Module {} not found", id)))?;

        if !module.mark_deleted() {
            return Ok(true);
        }
        stamp_update(&mut module, actor);

        sqlx::query(
            r#"
            UPDATE modules
            SET is_deleted = TRUE, is_active = FALSE, version = version + 1,
                updated_at = $2, updated_by = $3
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id.0)
        .bind(module.audit_info.updated_at)
        .bind(actor.0)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error_in("modules.delete"))?;

        Ok(true)
    }
}

#[derive(sqlx::FromRow)]
struct ModuleRow {
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    route: Option<String>,
    parent_id: Option<Uuid>,
    sort_order: i32,
    is_visible: bool,
    is_active: bool,
    required_role: Option<String>,
    version: i32,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl ModuleRow {
    fn into_module(self) -> Module {
        Module {
            id: ModuleId::from_uuid(self.id),
            code: self.code,
            name: self.name,
            description: self.description,
            icon: self.icon,
            route: self.route,
            parent_id: self.parent_id.map(ModuleId::from_uuid),
            sort_order: self.sort_order,
            is_visible: self.is_visible,
            is_active: self.is_active,
            required_role: self.required_role,
            version: self.version,
            is_deleted: self.is_deleted,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}
