// ==========================================
// 包裹派送管理后台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod driver;
pub mod import;
pub mod parcel;
pub mod raw_text;
pub mod route;
pub mod types;

// 重导出核心类型
pub use driver::{Driver, DriverInput, DriverStats, NewDriver, ServiceArea};
pub use import::{
    AcceptedRow, ImportClassification, ImportReport, RawParcelRow, RejectedRow, RejectionKind,
};
pub use parcel::{NewParcel, Parcel, ParcelInput, ParcelListItem, ParcelStats};
pub use route::{DriverRoutes, DriverWorkload, RouteGroup};
pub use types::ParcelStatus;
