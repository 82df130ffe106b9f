// ==========================================
// 包裹派送管理后台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级错误不走此类型（收集进 ImportReport），
//       这里只描述整批失败与导出失败
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（整批致命）=====
    #[error("Unsupported file format: {0} (only .csv / .xlsx are accepted)")]
    UnsupportedFormat(String),

    #[error("File read failed: {0}")]
    FileReadError(String),

    #[error("Invalid CSV format: {0}")]
    CsvParseError(String),

    #[error("Invalid Excel format: {0}")]
    ExcelParseError(String),

    // ===== 存储错误（整批致命）=====
    #[error("Database error during processing: {0}")]
    StorageError(String),

    // ===== 拒绝文件导出 / 下载 =====
    #[error("Failed to create rejected records file: {0}")]
    ExportError(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("File not found: {0}")]
    ExportNotFound(String),

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<RepositoryError>（仅用于加载已有手机号等整批步骤）
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        ImportError::StorageError(err.to_string())
    }
}

impl ImportError {
    /// 是否为输入格式类错误（调用方可修正文件后重传）
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::CsvParseError(_)
                | ImportError::ExcelParseError(_)
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_becomes_storage_error() {
        let err: ImportError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ImportError::StorageError(_)));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_format_errors_are_flagged() {
        assert!(ImportError::UnsupportedFormat("txt".to_string()).is_format_error());
        assert!(ImportError::CsvParseError("bad quote".to_string()).is_format_error());
        assert!(!ImportError::ExportError("disk full".to_string()).is_format_error());
    }
}
