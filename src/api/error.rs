// ==========================================
// 包裹派送管理后台 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/导入错误转换为面向用户的消息
// HTTP 映射: 输入/校验/重复/业务规则 → 400，未找到 → 404，
//           存储/内部错误 → 500（消息不外泄内部细节）
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API层错误类型
///
/// 面向用户的变体直接携带最终消息（`{0}`），HTTP 层原样返回
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 请求错误 =====
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BusinessRuleViolation(String),

    // ===== 导入整批失败 =====
    #[error("{0}")]
    ImportError(String),

    // ===== 服务端错误 =====
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 机器可读错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Duplicate(_) => "DUPLICATE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::ImportError(_) => "IMPORT_FAILED",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::ValidationError(_)
            | ApiError::Duplicate(_)
            | ApiError::BusinessRuleViolation(_)
            | ApiError::ImportError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回给调用方的消息（服务端错误隐藏细节）
    pub fn response_message(&self) -> String {
        match self {
            ApiError::DatabaseError(_) => "Database error during processing".to_string(),
            ApiError::InternalError(_) | ApiError::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, .. } => {
                ApiError::NotFound(format!("{} not found", entity))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Duplicate(msg),
            RepositoryError::ForeignKeyViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            e if e.is_format_error() => ApiError::ImportError(e.to_string()),
            ImportError::InvalidFileName(_) => {
                ApiError::InvalidInput("Invalid file name".to_string())
            }
            ImportError::ExportNotFound(_) => ApiError::NotFound("File not found".to_string()),
            ImportError::StorageError(msg) => ApiError::DatabaseError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "请求处理失败");
        }

        let body = ErrorBody {
            error: self.response_message(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}
