//! 事务辅助：可串行化事务的开启与并发冲突识别。
//!
//! PostgreSQL 在可串行化隔离级别下以 SQLSTATE 40001 / 40P01 报告冲突；
//! SQLite 没有隔离级别设置（本身即串行化），冲突表现为 BUSY / LOCKED。

use crate::error::AppError;
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, RuntimeErr, SqlErr,
    SqlxError, TransactionTrait,
};

const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

pub async fn begin_serializable(pool: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    pool.begin_with_config(Some(IsolationLevel::Serializable), None)
        .await
}

/// 判断数据库错误是否为可重试的并发冲突
pub fn is_transient_conflict(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };

    let RuntimeErr::SqlxError(SqlxError::Database(db_err)) = runtime else {
        return false;
    };

    if let Some(code) = db_err.code() {
        if code == PG_SERIALIZATION_FAILURE || code == PG_DEADLOCK_DETECTED {
            return true;
        }
        // SQLite 返回扩展错误码，低 8 位为主错误码
        if let Ok(n) = code.parse::<i32>()
            && matches!(n & 0xff, SQLITE_BUSY | SQLITE_LOCKED)
        {
            return true;
        }
    }

    let message = db_err.message();
    message.contains("database is locked") || message.contains("database table is locked")
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 将数据库错误归类：并发冲突 -> TransientConflict，其余原样包装
pub fn classify_db_err(err: DbErr) -> AppError {
    if is_transient_conflict(&err) {
        AppError::TransientConflict
    } else {
        AppError::DatabaseError(err)
    }
}
