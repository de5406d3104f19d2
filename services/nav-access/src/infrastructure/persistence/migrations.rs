//! 内置数据库迁移

use console_adapter_postgres::{Migration, MigrationManager};
use console_errors::AppResult;
use sqlx::PgPool;
use tracing::info;

/// 本服务的全部迁移，按版本递增
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(
        1,
        "navigation_access",
        include_str!("../../../migrations/0001_navigation_access.sql"),
    )]
}

/// 执行待处理的迁移
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let result = MigrationManager::new(pool.clone())
        .with_table_name("_nav_access_migrations")
        .migrate(&migrations())
        .await?
        .into_result()?;

    info!(
        applied = result.applied_count(),
        skipped = result.skipped.len(),
        "Database migrations complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let all = migrations();
        assert!(!all.is_empty());
        assert!(all.windows(2).all(|w| w[0].version < w[1].version));
        assert!(all[0].sql.contains("CREATE TABLE IF NOT EXISTS modules"));
    }
}
