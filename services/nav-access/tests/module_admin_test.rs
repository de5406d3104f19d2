//! 模块管理流程测试

mod support;

use std::sync::Arc;

use console_common::UserId;
use console_errors::AppError;
use nav_access::application::{
    CreateModuleCommand, DeleteModuleCommand, ModuleCommandHandler, ModuleQueryHandler,
    UpdateModuleCommand,
};
use nav_access::domain::module::{Module, ModuleId};
use support::InMemoryStore;

struct Fixture {
    store: Arc<InMemoryStore>,
    commands: ModuleCommandHandler<InMemoryStore>,
    queries: ModuleQueryHandler<InMemoryStore>,
    admin: UserId,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    Fixture {
        commands: ModuleCommandHandler::new(store.clone()),
        queries: ModuleQueryHandler::new(store.clone()),
        store,
        admin: UserId::new(),
    }
}

impl Fixture {
    async fn create(&self, code: &str, sort_order: i32, parent: Option<&Module>) -> Module {
        let mut cmd = CreateModuleCommand::new(code, code, self.admin.clone()).with_sort_order(sort_order);
        if let Some(parent) = parent {
            cmd = cmd.with_parent(parent.id.clone());
        }
        self.commands.handle_create(cmd).await.unwrap()
    }
}

#[tokio::test]
async fn test_create_module_starts_at_version_one() {
    let fx = fixture();
    let module = fx.create("HR", 1, None).await;

    assert_eq!(module.version, 1);
    assert!(!module.is_deleted);
    assert!(module.is_active);
    assert_eq!(module.audit_info.created_by, Some(fx.admin.clone()));
}

#[tokio::test]
async fn test_create_rejects_duplicate_code() {
    let fx = fixture();
    fx.create("HR", 1, None).await;

    let err = fx
        .commands
        .handle_create(CreateModuleCommand::new("HR", "Again", fx.admin.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_code_of_deleted_module_can_be_reused() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    fx.commands
        .handle_delete(DeleteModuleCommand {
            module_id: hr.id.clone(),
            performed_by: fx.admin.clone(),
        })
        .await
        .unwrap();

    let again = fx.create("HR", 1, None).await;
    assert_ne!(again.id, hr.id);
}

#[tokio::test]
async fn test_create_rejects_malformed_code() {
    let fx = fixture();
    let err = fx
        .commands
        .handle_create(CreateModuleCommand::new("HR..EMP", "Bad", fx.admin.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_create_rejects_missing_or_inactive_parent() {
    let fx = fixture();

    let missing = CreateModuleCommand::new("HR.EMP", "Employees", fx.admin.clone())
        .with_parent(ModuleId::new());
    let err = fx.commands.handle_create(missing).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let hr = fx.create("HR", 1, None).await;
    let mut deactivate = UpdateModuleCommand::new(hr.id.clone(), hr.version, fx.admin.clone());
    deactivate.is_active = Some(false);
    fx.commands.handle_update(deactivate).await.unwrap();

    let under_inactive = CreateModuleCommand::new("HR.EMP", "Employees", fx.admin.clone())
        .with_parent(hr.id.clone());
    let err = fx.commands.handle_create(under_inactive).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_bumps_version_and_records_actor() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let editor = UserId::new();

    let mut cmd = UpdateModuleCommand::new(hr.id.clone(), 1, editor.clone());
    cmd.name = Some("Human Resources".to_string());
    let updated = fx.commands.handle_update(cmd).await.unwrap();

    assert_eq!(updated.version, 2);
    assert_eq!(updated.name, "Human Resources");
    assert_eq!(updated.audit_info.updated_by, Some(editor));
}

#[tokio::test]
async fn test_update_with_stale_version_is_conflict() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;

    let mut first = UpdateModuleCommand::new(hr.id.clone(), 1, fx.admin.clone());
    first.sort_order = Some(5);
    fx.commands.handle_update(first).await.unwrap();

    let mut stale = UpdateModuleCommand::new(hr.id.clone(), 1, fx.admin.clone());
    stale.sort_order = Some(9);
    let err = fx.commands.handle_update(stale).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let current = fx.queries.get_module(&hr.id).await.unwrap();
    assert_eq!(current.sort_order, 5);
    assert_eq!(current.version, 2);
}

#[tokio::test]
async fn test_update_of_unknown_module_is_not_found() {
    let fx = fixture();
    let err = fx
        .commands
        .handle_update(UpdateModuleCommand::new(ModuleId::new(), 1, fx.admin.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_rejects_reparenting_into_own_subtree() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let emp = fx.create("HR.EMP", 1, Some(&hr)).await;
    let payroll = fx.create("HR.EMP.PAYROLL", 1, Some(&emp)).await;

    let mut cmd = UpdateModuleCommand::new(hr.id.clone(), hr.version, fx.admin.clone());
    cmd.parent_id = Some(Some(payroll.id.clone()));
    let err = fx.commands.handle_update(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut self_parent = UpdateModuleCommand::new(hr.id.clone(), hr.version, fx.admin.clone());
    self_parent.parent_id = Some(Some(hr.id.clone()));
    let err = fx.commands.handle_update(self_parent).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_moves_module_to_root() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let emp = fx.create("HR.EMP", 1, Some(&hr)).await;

    let mut cmd = UpdateModuleCommand::new(emp.id.clone(), emp.version, fx.admin.clone());
    cmd.parent_id = Some(None);
    let moved = fx.commands.handle_update(cmd).await.unwrap();

    assert!(moved.is_root());
    let roots = fx.queries.list_children(None).await.unwrap();
    assert_eq!(roots.len(), 2);
}

#[tokio::test]
async fn test_delete_is_soft_and_idempotent() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let delete = || DeleteModuleCommand {
        module_id: hr.id.clone(),
        performed_by: fx.admin.clone(),
    };

    assert!(fx.commands.handle_delete(delete()).await.unwrap());
    assert!(fx.commands.handle_delete(delete()).await.unwrap());

    let raw = fx.store.raw_module(&hr.id).unwrap();
    assert!(raw.is_deleted);
    assert!(!raw.is_active);
    assert_eq!(raw.version, 2);

    let err = fx.queries.get_module(&hr.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(fx.queries.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_of_never_existing_module_is_not_found() {
    let fx = fixture();
    let err = fx
        .commands
        .handle_delete(DeleteModuleCommand {
            module_id: ModuleId::new(),
            performed_by: fx.admin.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_refused_while_active_children_remain() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let emp = fx.create("HR.EMP", 1, Some(&hr)).await;

    let err = fx
        .commands
        .handle_delete(DeleteModuleCommand {
            module_id: hr.id.clone(),
            performed_by: fx.admin.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FailedPrecondition(_)));

    fx.commands
        .handle_delete(DeleteModuleCommand {
            module_id: emp.id.clone(),
            performed_by: fx.admin.clone(),
        })
        .await
        .unwrap();
    assert!(
        fx.commands
            .handle_delete(DeleteModuleCommand {
                module_id: hr.id.clone(),
                performed_by: fx.admin.clone(),
            })
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_update_of_deleted_module_is_not_found() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    fx.commands
        .handle_delete(DeleteModuleCommand {
            module_id: hr.id.clone(),
            performed_by: fx.admin.clone(),
        })
        .await
        .unwrap();

    let err = fx
        .commands
        .handle_update(UpdateModuleCommand::new(hr.id.clone(), 2, fx.admin.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_deactivation_refused_while_active_children_remain() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let emp = fx.create("HR.EMP", 1, Some(&hr)).await;

    let mut deactivate = UpdateModuleCommand::new(hr.id.clone(), hr.version, fx.admin.clone());
    deactivate.is_active = Some(false);
    let err = fx.commands.handle_update(deactivate).await.unwrap_err();
    assert!(matches!(err, AppError::FailedPrecondition(_)));

    let parent = fx.queries.get_module(&hr.id).await.unwrap();
    assert!(parent.is_active);
    assert_eq!(parent.version, 1);

    let mut child_off = UpdateModuleCommand::new(emp.id.clone(), emp.version, fx.admin.clone());
    child_off.is_active = Some(false);
    fx.commands.handle_update(child_off).await.unwrap();

    let mut deactivate = UpdateModuleCommand::new(hr.id.clone(), 1, fx.admin.clone());
    deactivate.is_active = Some(false);
    let updated = fx.commands.handle_update(deactivate).await.unwrap();
    assert!(!updated.is_active);
}

#[tokio::test]
async fn test_reactivation_requires_active_parent() {
    let fx = fixture();
    let hr = fx.create("HR", 1, None).await;
    let emp = fx.create("HR.EMP", 1, Some(&hr)).await;

    let mut child_off = UpdateModuleCommand::new(emp.id.clone(), 1, fx.admin.clone());
    child_off.is_active = Some(false);
    fx.commands.handle_update(child_off).await.unwrap();
    let mut parent_off = UpdateModuleCommand::new(hr.id.clone(), 1, fx.admin.clone());
    parent_off.is_active = Some(false);
    fx.commands.handle_update(parent_off).await.unwrap();

    let mut child_on = UpdateModuleCommand::new(emp.id.clone(), 2, fx.admin.clone());
    child_on.is_active = Some(true);
    let err = fx.commands.handle_update(child_on).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(!fx.queries.get_module(&emp.id).await.unwrap().is_active);

    let mut parent_on = UpdateModuleCommand::new(hr.id.clone(), 2, fx.admin.clone());
    parent_on.is_active = Some(true);
    fx.commands.handle_update(parent_on).await.unwrap();

    let mut child_on = UpdateModuleCommand::new(emp.id.clone(), 2, fx.admin.clone());
    child_on.is_active = Some(true);
    let child = fx.commands.handle_update(child_on).await.unwrap();
    assert!(child.is_active);
    assert_eq!(child.version, 3);
}
