//! 应用上下文
//!
//! 显式构建所有仓储与服务，通过 Arc 共享。

use std::sync::Arc;

use console_adapter_postgres::{PostgresConfig, TransactionManager, check_connection, create_pool};
use console_errors::{AppError, AppResult};
use console_telemetry::{HealthStatus, PrometheusHandle};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::application::{
    AuthorizationService, IconRegistry, ModuleCommandHandler, ModuleQueryHandler,
    NavigationService, RoleCommandHandler, RolePermissionCommandHandler, RoleQueryHandler,
};
use crate::config::{NavAccessConfig, NavigationConfig};
use crate::infrastructure::persistence::{
    PostgresModuleRepository, PostgresRolePermissionRepository, PostgresRoleRepository,
    PostgresUnitOfWorkFactory, PostgresUserRoleRepository, run_migrations,
};

pub type PgAuthorizationService =
    AuthorizationService<PostgresUserRoleRepository, PostgresRolePermissionRepository>;
pub type PgNavigationService = NavigationService<
    PostgresModuleRepository,
    PostgresUserRoleRepository,
    PostgresRolePermissionRepository,
>;
pub type PgRoleQueryHandler = RoleQueryHandler<
    PostgresRoleRepository,
    PostgresRolePermissionRepository,
    PostgresUserRoleRepository,
>;

/// nav-access 应用上下文
pub struct AppContext {
    pub pool: PgPool,
    /// 启用指标时的 Prometheus 句柄，用于渲染抓取内容
    pub metrics: Option<PrometheusHandle>,
    pub module_commands: Arc<ModuleCommandHandler<PostgresModuleRepository>>,
    pub module_queries: Arc<ModuleQueryHandler<PostgresModuleRepository>>,
    pub role_commands: Arc<RoleCommandHandler<PostgresRoleRepository, PostgresUserRoleRepository>>,
    pub role_queries: Arc<PgRoleQueryHandler>,
    pub permission_commands: Arc<RolePermissionCommandHandler<PostgresRoleRepository>>,
    pub authorization: Arc<PgAuthorizationService>,
    pub navigation: Arc<PgNavigationService>,
}

impl AppContext {
    /// 基于已有连接池构建
    pub fn new(pool: PgPool, navigation: &NavigationConfig) -> Self {
        let module_repo = Arc::new(PostgresModuleRepository::new(pool.clone()));
        let role_repo = Arc::new(PostgresRoleRepository::new(pool.clone()));
        let permission_repo = Arc::new(PostgresRolePermissionRepository::new(pool.clone()));
        let user_role_repo = Arc::new(PostgresUserRoleRepository::new(pool.clone()));
        let uow_factory = Arc::new(PostgresUnitOfWorkFactory::new(TransactionManager::new(
            pool.clone(),
        )));

        let authorization = Arc::new(AuthorizationService::new(
            user_role_repo.clone(),
            permission_repo.clone(),
        ));

        Self {
            module_commands: Arc::new(ModuleCommandHandler::new(module_repo.clone())),
            module_queries: Arc::new(ModuleQueryHandler::new(module_repo.clone())),
            role_commands: Arc::new(RoleCommandHandler::new(
                role_repo.clone(),
                user_role_repo.clone(),
            )),
            role_queries: Arc::new(RoleQueryHandler::new(
                role_repo.clone(),
                permission_repo,
                user_role_repo,
            )),
            permission_commands: Arc::new(RolePermissionCommandHandler::new(role_repo, uow_factory)),
            navigation: Arc::new(NavigationService::new(
                module_repo,
                authorization.clone(),
                IconRegistry::from_config(navigation),
            )),
            authorization,
            metrics: None,
            pool,
        }
    }

    /// 从配置启动：初始化日志与指标、创建连接池、按需执行迁移
    pub async fn bootstrap(config_dir: &str) -> AppResult<Self> {
        let config = NavAccessConfig::load(config_dir)
            .map_err(|e| AppError::internal(e.to_string()))?;

        let telemetry = &config.app.telemetry;
        if telemetry.json {
            console_telemetry::init_tracing_json(&telemetry.log_level);
        } else {
            console_telemetry::init_tracing(&telemetry.log_level);
        }
        let metrics = if telemetry.metrics_enabled {
            Some(console_telemetry::init_metrics().map_err(AppError::internal)?)
        } else {
            None
        };

        let db = &config.app.database;
        let pool = create_pool(
            &PostgresConfig::new(db.url.expose_secret().as_str())
                .with_max_connections(db.max_connections),
        )
        .await?;
        let latency = check_connection(&pool).await?;
        info!(latency_ms = latency.as_millis() as u64, "Database connected");

        if db.run_migrations {
            run_migrations(&pool).await?;
        }

        info!(app = %config.app.app_name, env = %config.app.app_env, "nav-access context ready");
        let mut context = Self::new(pool, &config.navigation);
        context.metrics = metrics;
        Ok(context)
    }

    /// 数据库连通性检查
    pub async fn health(&self) -> HealthStatus {
        let mut status = HealthStatus::new();
        match check_connection(&self.pool).await {
            Ok(latency) => status.add_check(
                "postgres",
                true,
                Some(format!("{}ms", latency.as_millis())),
            ),
            Err(e) => status.add_check("postgres", false, Some(e.to_string())),
        }
        status
    }
}
