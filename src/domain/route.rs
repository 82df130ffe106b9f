// ==========================================
// 包裹派送管理后台 - 路线领域模型
// ==========================================
// 生命周期: 请求期构造，不落库
// ==========================================

use crate::domain::driver::Driver;
use crate::domain::parcel::Parcel;
use serde::{Deserialize, Serialize};

// ==========================================
// RouteGroup - 路线分组
// ==========================================
// 说明: 按位置切分，不做地理优化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGroup {
    pub route_id: usize,      // 1 起
    pub route_name: String,   // "Route {id}"
    pub route_color: String,  // 调色板颜色
    pub parcels: Vec<Parcel>,
    pub parcel_count: usize,
    pub total_weight: f64,    // 缺失重量按 0 计
}

// ==========================================
// DriverRoutes - 司机路线详情
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRoutes {
    pub driver: Driver,
    pub parcels: Vec<Parcel>,
    pub routes: Vec<RouteGroup>,
    pub total_parcels: usize,
    pub total_routes: usize,
}

// ==========================================
// DriverWorkload - 司机工作量概览
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverWorkload {
    pub driver_id: i64,
    pub driver_name: String,
    pub driver_phone: String,
    pub vehicle_details: String,
    pub driver_latitude: f64,
    pub driver_longitude: f64,
    pub is_active: bool,
    pub total_parcels: i64,
    pub assigned_parcels: i64,
    pub in_transit_parcels: i64,
    pub completed_parcels: i64,
}
