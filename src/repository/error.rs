// ==========================================
// 包裹派送管理后台 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: UNIQUE / FOREIGN KEY 失败按消息分类，
//       导入管道据此区分“写库冲突”与其他失败
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("Record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("Database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("Database lock failed: {0}")]
    LockError(String),

    #[error("Database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("Unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    // ===== 业务规则错误 =====
    #[error("{0}")]
    BusinessRuleViolation(String),

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 唯一约束冲突是否落在指定列上（如 "parcels.phone_number"）
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, RepositoryError::UniqueConstraintViolation(msg) if msg.contains(column))
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
