// ==========================================
// 包裹派送管理后台 - 应用层
// ==========================================
// 职责: 应用状态装配 + axum HTTP 集成
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use crate::config::app_config::get_default_db_path;
pub use http::router;
pub use state::AppState;
