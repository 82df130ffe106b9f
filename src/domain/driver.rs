// ==========================================
// 包裹派送管理后台 - 司机领域模型
// ==========================================
// 对齐: drivers 表
// 约束: 姓名（忽略大小写）/ 手机号 / 车牌 全表唯一
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ServiceArea - 服务区域边界框
// ==========================================
// 司机坐标必须落在该矩形内，否则重新生成
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl ServiceArea {
    /// 金奈市区（避开孟加拉湾海域）
    pub const CHENNAI: ServiceArea = ServiceArea {
        min_lat: 12.82,
        max_lat: 13.25,
        min_lng: 80.10,
        max_lng: 80.22,
    };

    /// 坐标是否在区域内（含边界）
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat.is_finite()
            && lng.is_finite()
            && lat >= self.min_lat
            && lat <= self.max_lat
            && lng >= self.min_lng
            && lng <= self.max_lng
    }
}

// ==========================================
// Driver - 司机（持久化实体）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub full_name: String,
    pub phone_number: String,     // 10 位规范化手机号
    pub vehicle_details: String,  // 规范化车牌（大写、无空白）
    pub is_active: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewDriver - 待写入司机（已校验、已规范化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDriver {
    pub full_name: String,
    pub phone_number: String,
    pub vehicle_details: String,
    pub is_active: bool,
    pub latitude: f64,
    pub longitude: f64,
}

// ==========================================
// DriverInput - API 入参（原始值，未校验）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverInput {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub vehicle_details: Option<String>,
    /// 兼容 true / 1 / "1"
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub is_active: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub longitude: Option<String>,
}

impl DriverInput {
    /// 活跃标记：缺省为 true；仅 true / 1 / "1" 视为活跃
    pub fn active_flag(&self) -> bool {
        match self.is_active.as_deref().map(str::trim) {
            None => true,
            Some(v) => v == "true" || v == "1",
        }
    }
}

// ==========================================
// DriverStats - 仪表盘司机统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverStats {
    pub total_drivers: i64,
    pub active_drivers: i64,
}
