// ==========================================
// 包裹派送管理后台 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod driver_repo;
pub mod error;
pub mod parcel_import_repo;
pub mod parcel_repo;
mod row_mapping;

// 重导出核心仓储
pub use driver_repo::{DriverConflicts, DriverRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use parcel_import_repo::ParcelImportRepository;
pub use parcel_repo::ParcelRepository;
