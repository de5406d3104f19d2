//! 数据库错误映射
//!
//! 将 SQLx 错误转换为 AppError，区分约束冲突与存储故障

use console_errors::AppError;

/// 将 SQLx 错误转换为 AppError
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // PostgreSQL 约束违规代码
            Some("23505") => AppError::conflict(format!(
                "Duplicate entry violates unique constraint{}",
                db_err
                    .constraint()
                    .map(|c| format!(" '{}'", c))
                    .unwrap_or_default()
            )),
            Some("23503") => AppError::validation("Foreign key constraint violation"),
            Some("23514") => AppError::validation("Check constraint violation"),
            Some("23502") => AppError::validation("Not null constraint violation"),
            Some("22001") => AppError::validation("String data too long"),
            Some(code) => AppError::database(format!("Database error ({}): {}", code, db_err)),
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut => AppError::internal("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::internal("Database connection pool is closed"),
        _ => AppError::database(e.to_string()),
    }
}

/// 附带操作名的错误映射
pub fn map_sqlx_error_in(operation: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| map_sqlx_error(e).with_context(operation)
}
