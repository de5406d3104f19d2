//! PostgreSQL 持久化

pub mod error_mapper;
pub mod migrations;
pub mod module_repository;
pub mod nav_access_unit_of_work;
pub mod role_permission_repository;
pub mod role_repository;
pub mod tx_repositories;
pub mod user_role_repository;

pub use migrations::run_migrations;
pub use module_repository::PostgresModuleRepository;
pub use nav_access_unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
pub use role_permission_repository::PostgresRolePermissionRepository;
pub use role_repository::PostgresRoleRepository;
pub use user_role_repository::PostgresUserRoleRepository;
