use console_errors::AppError;
use thiserror::Error;

use crate::domain::module::ModuleId;
use crate::domain::role::RoleId;

#[derive(Debug, Error)]
pub enum NavAccessError {
    #[error("Module {0} not found")]
    ModuleNotFound(ModuleId),
    #[error("Role {0} not found")]
    RoleNotFound(RoleId),
    #[error("Module with code '{0}' already exists")]
    DuplicateModuleCode(String),
    #[error("Role with name '{0}' already exists")]
    DuplicateRoleName(String),
    #[error("Parent module {0} does not exist or is not active")]
    ParentUnavailable(ModuleId),
    #[error("Moving module {0} under {1} would create a cycle")]
    CycleDetected(ModuleId, ModuleId),
    #[error("Module {0} still has {1} active child module(s)")]
    HasActiveChildren(ModuleId, usize),
    #[error("{0}")]
    InvalidCommand(String),
}

impl From<NavAccessError> for AppError {
    fn from(error: NavAccessError) -> Self {
        let message = error.to_string();
        match error {
            NavAccessError::ModuleNotFound(_) | NavAccessError::RoleNotFound(_) => {
                AppError::NotFound(message)
            }
            NavAccessError::DuplicateModuleCode(_) | NavAccessError::DuplicateRoleName(_) => {
                AppError::Conflict(message)
            }
            NavAccessError::ParentUnavailable(_)
            | NavAccessError::CycleDetected(_, _)
            | NavAccessError::InvalidCommand(_) => AppError::Validation(message),
            NavAccessError::HasActiveChildren(_, _) => AppError::FailedPrecondition(message),
        }
    }
}
