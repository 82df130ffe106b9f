// ==========================================
// 包裹派送管理后台 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 包裹批量导入、司机指派与路线分组
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::ParcelStatus;

// 领域实体
pub use domain::{Driver, DriverRoutes, ImportReport, Parcel, RouteGroup};

// 引擎
pub use engine::{CoordinateAssigner, RoutePartitioner};

// API
pub use api::{ApiError, ApiResult, DriverApi, ImportApi, ParcelApi, RouteApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "包裹派送管理后台";
