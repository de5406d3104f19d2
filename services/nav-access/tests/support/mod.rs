//! 测试用内存存储，实现全部仓储接口并支持故障注入

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use console_common::UserId;
use console_domain_core::{SoftDeletable, ensure_version, stamp_update};
use console_errors::{AppError, AppResult};

use nav_access::domain::module::{Module, ModuleId, ModulePatch, ModuleRepository, NewModule};
use nav_access::domain::role::{
    NewRole, Role, RoleFunctionPermission, RoleId, RoleModulePermission, RolePatch,
    RolePermissionRepository, RoleRepository, UserRole, UserRoleRepository,
};
use nav_access::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

#[derive(Debug, Clone, Default)]
pub struct PermissionTables {
    pub module_rows: Vec<RoleModulePermission>,
    pub function_rows: Vec<RoleFunctionPermission>,
}

impl PermissionTables {
    fn modules_for(&self, role_ids: &[RoleId]) -> Vec<RoleModulePermission> {
        self.module_rows
            .iter()
            .filter(|r| role_ids.contains(&r.role_id))
            .cloned()
            .collect()
    }

    fn functions_for(&self, role_ids: &[RoleId]) -> Vec<RoleFunctionPermission> {
        self.function_rows
            .iter()
            .filter(|r| role_ids.contains(&r.role_id))
            .cloned()
            .collect()
    }

    fn clear_modules(&mut self, role_id: &RoleId) -> u64 {
        let before = self.module_rows.len();
        self.module_rows.retain(|r| &r.role_id != role_id);
        (before - self.module_rows.len()) as u64
    }

    fn clear_functions(&mut self, role_id: &RoleId) -> u64 {
        let before = self.function_rows.len();
        self.function_rows.retain(|r| &r.role_id != role_id);
        (before - self.function_rows.len()) as u64
    }

    fn insert_modules(&mut self, rows: &[RoleModulePermission]) -> AppResult<()> {
        for row in rows {
            if self
                .module_rows
                .iter()
                .any(|r| r.role_id == row.role_id && r.module_id == row.module_id)
            {
                return Err(AppError::conflict("Duplicate role module permission"));
            }
            self.module_rows.push(row.clone());
        }
        Ok(())
    }

    fn insert_functions(&mut self, rows: &[RoleFunctionPermission]) -> AppResult<()> {
        for row in rows {
            if self
                .function_rows
                .iter()
                .any(|r| r.role_id == row.role_id && r.function_code == row.function_code)
            {
                return Err(AppError::conflict("Duplicate role function permission"));
            }
            self.function_rows.push(row.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct State {
    modules: Vec<Module>,
    roles: Vec<Role>,
    permissions: PermissionTables,
    user_roles: Vec<UserRole>,
}

#[derive(Debug, Default)]
pub struct Failures {
    operations: HashSet<String>,
    rollback: bool,
}

impl Failures {
    fn check(&self, operation: &str) -> AppResult<()> {
        if self.operations.contains(operation) {
            return Err(AppError::database(format!("injected failure in {}", operation)));
        }
        Ok(())
    }
}

/// 内存存储，克隆后共享同一份数据
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    failures: Arc<Mutex<Failures>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让指定操作失败，例如 `insert_module_permissions`、`commit`
    pub fn fail_on(&self, operation: &str) {
        self.failures
            .lock()
            .unwrap()
            .operations
            .insert(operation.to_string());
    }

    pub fn fail_rollback(&self) {
        self.failures.lock().unwrap().rollback = true;
    }

    pub fn clear_failures(&self) {
        *self.failures.lock().unwrap() = Failures::default();
    }

    fn check(&self, operation: &str) -> AppResult<()> {
        self.failures.lock().unwrap().check(operation)
    }

    /// 包含已删除模块的原始数据
    pub fn raw_module(&self, id: &ModuleId) -> Option<Module> {
        self.state
            .lock()
            .unwrap()
            .modules
            .iter()
            .find(|m| &m.id == id)
            .cloned()
    }

    pub fn permission_tables(&self) -> PermissionTables {
        self.state.lock().unwrap().permissions.clone()
    }

    pub fn unit_of_work_factory(&self) -> Arc<dyn UnitOfWorkFactory> {
        Arc::new(MemoryUnitOfWorkFactory {
            store: self.clone(),
        })
    }
}

#[async_trait]
impl ModuleRepository for InMemoryStore {
    async fn get_all_active_modules(&self) -> AppResult<Vec<Module>> {
        self.check("get_all_active_modules")?;
        let state = self.state.lock().unwrap();
        let mut modules: Vec<Module> = state
            .modules
            .iter()
            .filter(|m| m.is_live())
            .cloned()
            .collect();
        modules.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(modules)
    }

    async fn get_modules_by_parent(&self, parent_id: Option<&ModuleId>) -> AppResult<Vec<Module>> {
        self.check("get_modules_by_parent")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .modules
            .iter()
            .filter(|m| !m.is_deleted && m.parent_id.as_ref() == parent_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &ModuleId) -> AppResult<Option<Module>> {
        self.check("find_module")?;
        Ok(self.raw_module(id).filter(|m| !m.is_deleted))
    }

    async fn find_all(&self) -> AppResult<Vec<Module>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .modules
            .iter()
            .filter(|m| !m.is_deleted)
            .cloned()
            .collect())
    }

    async fn exists_by_code(&self, code: &str) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .modules
            .iter()
            .any(|m| !m.is_deleted && m.code == code))
    }

    async fn create(&self, draft: NewModule, actor: &UserId) -> AppResult<Module> {
        self.check("create_module")?;
        let module = Module::create(draft, actor);
        self.state.lock().unwrap().modules.push(module.clone());
        Ok(module)
    }

    async fn update(&self, id: &ModuleId, patch: ModulePatch, actor: &UserId) -> AppResult<Module> {
        self.check("update_module")?;
        let mut state = self.state.lock().unwrap();
        let module = state
            .modules
            .iter_mut()
            .find(|m| &m.id == id && !m.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Module {} not found", id)))?;

        ensure_version(&*module, patch.expected_version)?;
        module.apply(patch);
        stamp_update(module, actor);
        Ok(module.clone())
    }

    async fn delete(&self, id: &ModuleId, actor: &UserId) -> AppResult<bool> {
        self.check("delete_module")?;
        let mut state = self.state.lock().unwrap();
        let module = state
            .modules
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| AppError::not_found(format!("Module {} not found", id)))?;

        if module.mark_deleted() {
            stamp_update(module, actor);
        }
        Ok(true)
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .find(|r| &r.id == id && !r.is_deleted)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .find(|r| r.name == name && !r.is_deleted)
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Role>> {
        let state = self.state.lock().unwrap();
        let mut roles: Vec<Role> = state.roles.iter().filter(|r| r.is_live()).cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn create(&self, draft: NewRole, actor: &UserId) -> AppResult<Role> {
        self.check("create_role")?;
        let role = Role::create(draft, actor);
        self.state.lock().unwrap().roles.push(role.clone());
        Ok(role)
    }

    async fn update(&self, id: &RoleId, patch: RolePatch, actor: &UserId) -> AppResult<Role> {
        let mut state = self.state.lock().unwrap();
        let role = state
            .roles
            .iter_mut()
            .find(|r| &r.id == id && !r.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))?;

        ensure_version(&*role, patch.expected_version)?;
        role.apply(patch);
        stamp_update(role, actor);
        Ok(role.clone())
    }

    async fn delete(&self, id: &RoleId, actor: &UserId) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let role = state
            .roles
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))?;

        if role.mark_deleted() {
            stamp_update(role, actor);
        }
        Ok(true)
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryStore {
    async fn find_module_permissions(&self, role_id: &RoleId) -> AppResult<Vec<RoleModulePermission>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .permissions
            .modules_for(std::slice::from_ref(role_id)))
    }

    async fn find_module_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleModulePermission>> {
        self.check("find_module_permissions_by_roles")?;
        Ok(self.state.lock().unwrap().permissions.modules_for(role_ids))
    }

    async fn find_function_permissions(
        &self,
        role_id: &RoleId,
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .permissions
            .functions_for(std::slice::from_ref(role_id)))
    }

    async fn find_function_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        Ok(self.state.lock().unwrap().permissions.functions_for(role_ids))
    }

    async fn clear_module_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        Ok(self.state.lock().unwrap().permissions.clear_modules(role_id))
    }

    async fn clear_function_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        Ok(self.state.lock().unwrap().permissions.clear_functions(role_id))
    }

    async fn insert_module_permissions(&self, rows: &[RoleModulePermission]) -> AppResult<()> {
        self.state.lock().unwrap().permissions.insert_modules(rows)
    }

    async fn insert_function_permissions(&self, rows: &[RoleFunctionPermission]) -> AppResult<()> {
        self.state.lock().unwrap().permissions.insert_functions(rows)
    }
}

#[async_trait]
impl UserRoleRepository for InMemoryStore {
    async fn find_roles_by_user(&self, user_id: &UserId) -> AppResult<Vec<Role>> {
        self.check("find_roles_by_user")?;
        let state = self.state.lock().unwrap();
        let mut roles: Vec<Role> = state
            .user_roles
            .iter()
            .filter(|link| &link.user_id == user_id && !link.is_deleted)
            .filter_map(|link| state.roles.iter().find(|r| r.id == link.role_id))
            .filter(|role| role.is_live())
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_assignments(&self, user_id: &UserId) -> AppResult<Vec<UserRole>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .user_roles
            .iter()
            .filter(|link| &link.user_id == user_id && !link.is_deleted)
            .cloned()
            .collect())
    }

    async fn assign(&self, user_id: &UserId, role_id: &RoleId, actor: &UserId) -> AppResult<UserRole> {
        let mut state = self.state.lock().unwrap();
        if let Some(link) = state
            .user_roles
            .iter_mut()
            .find(|l| &l.user_id == user_id && &l.role_id == role_id)
        {
            if link.is_deleted {
                *link = UserRole::new(user_id.clone(), role_id.clone(), Some(actor.clone()));
            }
            return Ok(link.clone());
        }

        let link = UserRole::new(user_id.clone(), role_id.clone(), Some(actor.clone()));
        state.user_roles.push(link.clone());
        Ok(link)
    }

    async fn remove(&self, user_id: &UserId, role_id: &RoleId, _actor: &UserId) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .user_roles
            .iter_mut()
            .find(|l| &l.user_id == user_id && &l.role_id == role_id && !l.is_deleted)
        {
            Some(link) => {
                link.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// 事务内的权限表副本，提交时整体写回
struct StagedPermissions {
    tables: Mutex<PermissionTables>,
    failures: Arc<Mutex<Failures>>,
}

impl StagedPermissions {
    fn check(&self, operation: &str) -> AppResult<()> {
        self.failures.lock().unwrap().check(operation)
    }
}

#[async_trait]
impl RolePermissionRepository for StagedPermissions {
    async fn find_module_permissions(&self, role_id: &RoleId) -> AppResult<Vec<RoleModulePermission>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .modules_for(std::slice::from_ref(role_id)))
    }

    async fn find_module_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleModulePermission>> {
        Ok(self.tables.lock().unwrap().modules_for(role_ids))
    }

    async fn find_function_permissions(
        &self,
        role_id: &RoleId,
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .functions_for(std::slice::from_ref(role_id)))
    }

    async fn find_function_permissions_by_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<RoleFunctionPermission>> {
        Ok(self.tables.lock().unwrap().functions_for(role_ids))
    }

    async fn clear_module_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        self.check("clear_module_permissions")?;
        Ok(self.tables.lock().unwrap().clear_modules(role_id))
    }

    async fn clear_function_permissions(&self, role_id: &RoleId) -> AppResult<u64> {
        self.check("clear_function_permissions")?;
        Ok(self.tables.lock().unwrap().clear_functions(role_id))
    }

    async fn insert_module_permissions(&self, rows: &[RoleModulePermission]) -> AppResult<()> {
        self.check("insert_module_permissions")?;
        self.tables.lock().unwrap().insert_modules(rows)
    }

    async fn insert_function_permissions(&self, rows: &[RoleFunctionPermission]) -> AppResult<()> {
        self.check("insert_function_permissions")?;
        self.tables.lock().unwrap().insert_functions(rows)
    }
}

struct MemoryUnitOfWorkFactory {
    store: InMemoryStore,
}

#[async_trait]
impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.store.check("begin")?;
        let snapshot = self.store.permission_tables();
        Ok(Box::new(MemoryUnitOfWork {
            store: self.store.clone(),
            staged: StagedPermissions {
                tables: Mutex::new(snapshot),
                failures: self.store.failures.clone(),
            },
        }))
    }
}

struct MemoryUnitOfWork {
    store: InMemoryStore,
    staged: StagedPermissions,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        &self.staged
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { store, staged } = *self;
        store.check("commit")?;
        let tables = staged
            .tables
            .into_inner()
            .map_err(|_| AppError::internal("staged permissions poisoned"))?;
        store.state.lock().unwrap().permissions = tables;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        if self.store.failures.lock().unwrap().rollback {
            return Err(AppError::database("injected rollback failure"));
        }
        Ok(())
    }
}
