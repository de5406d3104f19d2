//! 导航树服务

use std::collections::HashMap;
use std::sync::Arc;

use console_common::UserId;
use console_errors::AppResult;
use serde::Serialize;
use tracing::debug;

use super::icons::IconRegistry;
use crate::application::authorization::AuthorizationService;
use crate::domain::module::{ModuleId, ModuleNode, ModuleRepository, build_hierarchy};
use crate::domain::role::{ModuleAccess, RolePermissionRepository, UserRoleRepository};

/// 供界面渲染的导航项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub module_id: ModuleId,
    pub code: String,
    pub label: String,
    pub glyph: String,
    /// 只有叶子节点有路由
    pub route: Option<String>,
    pub children: Vec<NavItem>,
}

pub struct NavigationService<M, U, P>
where
    M: ModuleRepository,
    U: UserRoleRepository,
    P: RolePermissionRepository,
{
    module_repo: Arc<M>,
    authorization: Arc<AuthorizationService<U, P>>,
    icons: IconRegistry,
}

impl<M, U, P> NavigationService<M, U, P>
where
    M: ModuleRepository,
    U: UserRoleRepository,
    P: RolePermissionRepository,
{
    pub fn new(
        module_repo: Arc<M>,
        authorization: Arc<AuthorizationService<U, P>>,
        icons: IconRegistry,
    ) -> Self {
        Self {
            module_repo,
            authorization,
            icons,
        }
    }

    /// 完整模块树 (激活模块，不按用户过滤)
    pub async fn module_tree(&self) -> AppResult<Vec<ModuleNode>> {
        let modules = self.module_repo.get_all_active_modules().await?;
        Ok(build_hierarchy(modules))
    }

    /// 用户可见的导航树
    ///
    /// 节点需同时可见且用户有查看权限，否则整棵子树隐藏。
    pub async fn navigation_for_user(&self, user_id: &UserId) -> AppResult<Vec<NavItem>> {
        let tree = self.module_tree().await?;
        let permissions = self.authorization.effective_permissions(user_id).await?;

        let items = self.render(&tree, &permissions);
        debug!(user_id = %user_id, roots = items.len(), "Navigation built");
        Ok(items)
    }

    fn render(&self, nodes: &[ModuleNode], permissions: &HashMap<ModuleId, ModuleAccess>) -> Vec<NavItem> {
        nodes
            .iter()
            .filter(|node| {
                node.module.is_visible
                    && permissions
                        .get(&node.module.id)
                        .is_some_and(|access| access.can_view)
            })
            .map(|node| NavItem {
                module_id: node.module.id.clone(),
                code: node.module.code.clone(),
                label: node.module.name.clone(),
                glyph: self.icons.glyph(node.module.icon.as_deref()).to_string(),
                route: node.navigable_route(),
                children: self.render(&node.children, permissions),
            })
            .collect()
    }
}
