// ==========================================
// 包裹派送管理后台 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 HTTP 路由调用
// ==========================================

pub mod dashboard_api;
pub mod driver_api;
pub mod error;
pub mod import_api;
pub mod parcel_api;
pub mod response;
pub mod route_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardStats};
pub use driver_api::{Coordinates, DriverApi, DriverCreatedResponse, DriverUpdatedResponse};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
pub use parcel_api::{AssignRequest, BulkAssignRequest, ParcelApi, ParcelCreatedResponse, StatusRequest};
pub use response::{AffectedResponse, MessageResponse};
pub use route_api::RouteApi;
