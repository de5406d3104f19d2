//! 模块层级构建
//!
//! 将扁平的模块列表组装为按 `sort_order` 排序的森林。

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::module::{Module, ModuleId};

/// 模块树节点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleNode {
    pub module: Module,
    pub children: Vec<ModuleNode>,
}

impl ModuleNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// 只有叶子节点可导航，分组节点即使配置了路由也返回 None
    pub fn navigable_route(&self) -> Option<String> {
        self.is_leaf().then(|| self.module.effective_route())
    }

    /// 先序遍历
    pub fn flatten(&self) -> Vec<&Module> {
        let mut out = Vec::with_capacity(self.count());
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Module>) {
        out.push(&self.module);
        for child in &self.children {
            child.collect_into(out);
        }
    }

    /// 子树节点数 (含自身)
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ModuleNode::count).sum::<usize>()
    }
}

/// 构建模块森林
///
/// - 重复 ID 以后出现的行为准，位置保留首次出现处
/// - 父节点不在输入中的模块作为根节点
/// - 同级按 `sort_order` 稳定排序
/// - 父链成环时，环上按输入顺序第一个模块提升为根，保证每个模块只输出一次
pub fn build_hierarchy(modules: Vec<Module>) -> Vec<ModuleNode> {
    let mut order: Vec<ModuleId> = Vec::with_capacity(modules.len());
    let mut by_id: HashMap<ModuleId, Module> = HashMap::with_capacity(modules.len());

    for module in modules {
        let id = module.id.clone();
        if by_id.insert(id.clone(), module).is_none() {
            order.push(id);
        }
    }

    let mut parent_of: HashMap<ModuleId, ModuleId> = HashMap::new();
    for (id, module) in &by_id {
        if let Some(parent) = &module.parent_id
            && parent != id
            && by_id.contains_key(parent)
        {
            parent_of.insert(id.clone(), parent.clone());
        }
    }

    // 从根出发到达不了的节点都挂在环上
    let children = index_children(&order, &parent_of);
    let mut reached: HashSet<ModuleId> = HashSet::with_capacity(order.len());
    for id in order.iter().filter(|id| !parent_of.contains_key(*id)) {
        mark_reachable(id, &children, &mut reached);
    }
    for id in &order {
        if !reached.contains(id) {
            parent_of.remove(id);
            mark_reachable(id, &children, &mut reached);
        }
    }

    let children = index_children(&order, &parent_of);
    let roots: Vec<ModuleId> = order
        .iter()
        .filter(|id| !parent_of.contains_key(*id))
        .cloned()
        .collect();

    attach(&roots, &children, &mut by_id)
}

fn index_children(
    order: &[ModuleId],
    parent_of: &HashMap<ModuleId, ModuleId>,
) -> HashMap<ModuleId, Vec<ModuleId>> {
    let mut children: HashMap<ModuleId, Vec<ModuleId>> = HashMap::new();
    for id in order {
        if let Some(parent) = parent_of.get(id) {
            children.entry(parent.clone()).or_default().push(id.clone());
        }
    }
    children
}

fn mark_reachable(
    start: &ModuleId,
    children: &HashMap<ModuleId, Vec<ModuleId>>,
    reached: &mut HashSet<ModuleId>,
) {
    let mut stack = vec![start.clone()];
    while let Some(id) = stack.pop() {
        if !reached.insert(id.clone()) {
            continue;
        }
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().filter(|k| !reached.contains(*k)).cloned());
        }
    }
}

fn attach(
    ids: &[ModuleId],
    children: &HashMap<ModuleId, Vec<ModuleId>>,
    by_id: &mut HashMap<ModuleId, Module>,
) -> Vec<ModuleNode> {
    let mut nodes = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(module) = by_id.remove(id) else {
            continue;
        };
        let kids = children.get(id).map(Vec::as_slice).unwrap_or_default();
        nodes.push(ModuleNode {
            module,
            children: attach(kids, children, by_id),
        });
    }
    // sort_by_key 是稳定排序
    nodes.sort_by_key(|node| node.module.sort_order);
    nodes
}

/// 把 `module_id` 挂到 `new_parent_id` 下是否会形成环 (包括挂到自己下面)
pub fn would_create_cycle(
    modules: &[Module],
    module_id: &ModuleId,
    new_parent_id: Option<&ModuleId>,
) -> bool {
    let Some(mut current) = new_parent_id.cloned() else {
        return false;
    };

    let parents: HashMap<&ModuleId, Option<&ModuleId>> = modules
        .iter()
        .map(|m| (&m.id, m.parent_id.as_ref()))
        .collect();

    let mut visited: HashSet<ModuleId> = HashSet::new();
    loop {
        if &current == module_id {
            return true;
        }
        if !visited.insert(current.clone()) {
            // 已存在的环不经过 module_id
            return false;
        }
        match parents.get(&current).copied().flatten() {
            Some(parent) => current = parent.clone(),
            None => return false,
        }
    }
}
