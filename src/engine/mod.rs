// ==========================================
// 包裹派送管理后台 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不访问存储，输入输出均为领域对象
// ==========================================

pub mod route_partitioner;
pub mod service_area;

// 重导出核心引擎
pub use route_partitioner::{route_color, RoutePartitioner, ROUTE_PALETTE, ROUTE_SIZE_PATTERN};
pub use service_area::CoordinateAssigner;
