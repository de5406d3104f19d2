//! 模块命令处理器

use std::sync::Arc;

use console_errors::{AppError, AppResult};
use tracing::info;

use super::commands::{CreateModuleCommand, DeleteModuleCommand, UpdateModuleCommand};
use crate::domain::module::{Module, ModuleId, ModuleRepository, would_create_cycle};
use crate::error::NavAccessError;

/// 模块命令处理器
pub struct ModuleCommandHandler<R>
where
    R: ModuleRepository,
{
    module_repo: Arc<R>,
}

impl<R> ModuleCommandHandler<R>
where
    R: ModuleRepository,
{
    pub fn new(module_repo: Arc<R>) -> Self {
        Self { module_repo }
    }

    /// 创建模块
    pub async fn handle_create(&self, cmd: CreateModuleCommand) -> AppResult<Module> {
        cmd.validate().map_err(AppError::validation)?;

        let performed_by = cmd.performed_by.clone();
        let draft = cmd.into_draft();

        if self.module_repo.exists_by_code(&draft.code).await? {
            return Err(NavAccessError::DuplicateModuleCode(draft.code).into());
        }
        if let Some(parent_id) = &draft.parent_id {
            self.ensure_parent_available(parent_id).await?;
        }

        let module = self.module_repo.create(draft, &performed_by).await?;

        info!(module_id = %module.id, code = %module.code, by = %performed_by, "Module created");
        Ok(module)
    }

    /// 更新模块
    pub async fn handle_update(&self, cmd: UpdateModuleCommand) -> AppResult<Module> {
        cmd.validate().map_err(AppError::validation)?;

        let module_id = cmd.module_id.clone();
        let performed_by = cmd.performed_by.clone();
        let patch = cmd.into_patch();

        let current = self
            .module_repo
            .find_by_id(&module_id)
            .await?
            .ok_or_else(|| NavAccessError::ModuleNotFound(module_id.clone()))?;

        if let Some(code) = &patch.code
            && code != &current.code
            && self.module_repo.exists_by_code(code).await?
        {
            return Err(NavAccessError::DuplicateModuleCode(code.clone()).into());
        }

        if let Some(Some(parent_id)) = &patch.parent_id
            && current.parent_id.as_ref() != Some(parent_id)
        {
            if parent_id == &module_id {
                return Err(
                    NavAccessError::CycleDetected(module_id.clone(), parent_id.clone()).into(),
                );
            }
            self.ensure_parent_available(parent_id).await?;

            let all = self.module_repo.find_all().await?;
            if would_create_cycle(&all, &module_id, Some(parent_id)) {
                return Err(
                    NavAccessError::CycleDetected(module_id.clone(), parent_id.clone()).into(),
                );
            }
        }

        match patch.is_active {
            Some(false) if current.is_active => {
                let active_children = self.count_active_children(&module_id).await?;
                if active_children > 0 {
                    return Err(
                        NavAccessError::HasActiveChildren(module_id.clone(), active_children).into(),
                    );
                }
            }
            Some(true) => {
                let parent_id = match &patch.parent_id {
                    Some(target) => target.as_ref(),
                    None => current.parent_id.as_ref(),
                };
                if let Some(parent_id) = parent_id {
                    self.ensure_parent_available(parent_id).await?;
                }
            }
            _ => {}
        }

        let module = self
            .module_repo
            .update(&module_id, patch, &performed_by)
            .await?;

        info!(
            module_id = %module.id,
            version = module.version,
            by = %performed_by,
            "Module updated"
        );
        Ok(module)
    }

    /// 软删除模块，仍有激活子模块时拒绝
    pub async fn handle_delete(&self, cmd: DeleteModuleCommand) -> AppResult<bool> {
        let active_children = self.count_active_children(&cmd.module_id).await?;
        if active_children > 0 {
            return Err(
                NavAccessError::HasActiveChildren(cmd.module_id.clone(), active_children).into(),
            );
        }

        let deleted = self
            .module_repo
            .delete(&cmd.module_id, &cmd.performed_by)
            .await?;

        info!(module_id = %cmd.module_id, by = %cmd.performed_by, "Module deleted");
        Ok(deleted)
    }

    async fn count_active_children(&self, module_id: &ModuleId) -> AppResult<usize> {
        Ok(self
            .module_repo
            .get_modules_by_parent(Some(module_id))
            .await?
            .into_iter()
            .filter(|m| m.is_active)
            .count())
    }

    async fn ensure_parent_available(&self, parent_id: &ModuleId) -> AppResult<()> {
        match self.module_repo.find_by_id(parent_id).await? {
            Some(parent) if parent.is_active => Ok(()),
            _ => Err(NavAccessError::ParentUnavailable(parent_id.clone()).into()),
        }
    }
}
