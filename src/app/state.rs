// ==========================================
// 包裹派送管理后台 - 应用状态
// ==========================================
// 职责: 启动时构造一次共享连接，向下传递给各 Repository / API
// 说明: 不存在全局连接；HTTP 层通过 Arc<AppState> 取用
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;

use crate::api::{DashboardApi, DriverApi, ImportApi, ParcelApi, RouteApi};
use crate::config::{AppConfig, ConfigManager};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::{
    CsvRejectedExporter, FieldMapperImpl, ParcelImporterImpl, PhoneDuplicateClassifier,
    UniversalFileParser,
};
use crate::repository::{DriverRepository, ParcelRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 司机管理API
    pub driver_api: Arc<DriverApi>,

    /// 包裹管理API
    pub parcel_api: Arc<ParcelApi>,

    /// 批量导入API
    pub import_api: Arc<ImportApi>,

    /// 司机路线API
    pub route_api: Arc<RouteApi>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 运行期配置
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - config: 启动配置（数据库路径、导出目录）
    ///
    /// # 返回
    /// - Err(String): 数据库打开或建表失败
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        info!(db_path = %config.db_path, "初始化AppState");

        if let Some(parent) = Path::new(&config.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("无法创建数据库目录: {}", e))?;
            }
        }

        let conn = open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;

        Self::from_connection(
            Arc::new(Mutex::new(conn)),
            config.db_path.clone(),
            config.export_dir.clone(),
        )
    }

    /// 基于已初始化的连接构造（测试复用）
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        db_path: String,
        export_dir: PathBuf,
    ) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let parcel_repo = Arc::new(ParcelRepository::from_connection(conn.clone()));
        let driver_repo = Arc::new(DriverRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 导入管道
        // ==========================================
        let exporter = CsvRejectedExporter::new(export_dir);
        let importer = ParcelImporterImpl::new(
            ParcelRepository::from_connection(conn.clone()),
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(PhoneDuplicateClassifier::new()),
            Box::new(exporter.clone()),
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let driver_api = Arc::new(DriverApi::new(driver_repo.clone()));
        let parcel_api = Arc::new(ParcelApi::new(parcel_repo.clone(), driver_repo.clone()));
        let route_api = Arc::new(RouteApi::new(driver_repo.clone(), parcel_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(parcel_repo, driver_repo));
        let import_api = Arc::new(ImportApi::new(
            Arc::new(importer),
            exporter,
            config_manager.clone(),
        ));

        info!("AppState初始化完成");
        Ok(Self {
            db_path,
            driver_api,
            parcel_api,
            import_api,
            route_api,
            dashboard_api,
            config_manager,
        })
    }
}
