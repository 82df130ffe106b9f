// ==========================================
// 包裹派送管理后台 - 通用响应体
// ==========================================

use serde::{Deserialize, Serialize};

/// 仅携带提示消息的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 批量操作响应（受影响行数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedResponse {
    pub message: String,
    pub affected: usize,
}
