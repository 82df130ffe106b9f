// ==========================================
// 包裹派送管理后台 - 启动配置
// ==========================================
// 职责: 从环境变量读取启动期配置（数据库路径 / 监听地址 / 导出目录）
// 说明: 运行期可调参数见 ConfigManager（config_kv 表）
// ==========================================

use std::path::{Path, PathBuf};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PARCEL_DISPATCH_DB_PATH";
/// 监听地址环境变量
pub const BIND_ENV: &str = "PARCEL_DISPATCH_BIND";
/// 拒绝文件导出目录环境变量
pub const EXPORT_DIR_ENV: &str = "PARCEL_DISPATCH_EXPORT_DIR";

/// 默认监听地址
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

const DB_FILE_NAME: &str = "parcel_dispatch.db";
const EXPORT_DIR_NAME: &str = "uploads";

// ==========================================
// AppConfig - 启动配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// 从环境变量构造（缺省值见各常量）
    pub fn from_env() -> Self {
        let db_path = env_non_empty(DB_PATH_ENV).unwrap_or_else(get_default_db_path);
        let bind_addr =
            env_non_empty(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let export_dir = env_non_empty(EXPORT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_export_dir(&db_path));

        Self {
            db_path,
            bind_addr,
            export_dir,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 获取默认数据库路径
///
/// 优先使用用户数据目录，拿不到时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("parcel-dispatch-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("parcel-dispatch");

        // 确保目录存在
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

/// 默认导出目录：数据库文件同级的 uploads/
pub fn default_export_dir(db_path: &str) -> PathBuf {
    Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.join(EXPORT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(EXPORT_DIR_NAME))
}
