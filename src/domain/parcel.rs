// ==========================================
// 包裹派送管理后台 - 包裹领域模型
// ==========================================
// 对齐: parcels 表
// 用途: 仓储层读写，API 层出入参
// ==========================================

use crate::domain::types::ParcelStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Parcel - 包裹（持久化实体）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: i64,
    pub customer_name: String,
    pub phone_number: String,          // 10 位规范化手机号（全表唯一）
    pub weight: Option<f64>,           // 公斤；导入行可为空
    pub pin_code: Option<String>,      // 6 位邮编
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: ParcelStatus,
    pub assigned_driver_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// ParcelListItem - 包裹列表项（附带司机姓名）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelListItem {
    #[serde(flatten)]
    pub parcel: Parcel,
    pub driver_name: Option<String>,
}

// ==========================================
// NewParcel - 待写入包裹（已校验、已规范化）
// ==========================================
// 来源: 手工创建 / 批量导入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParcel {
    pub customer_name: String,
    pub phone_number: String,
    pub weight: Option<f64>,
    pub pin_code: Option<String>,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: ParcelStatus,
}

// ==========================================
// ParcelInput - API 入参（原始值，未校验）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParcelInput {
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub pin_code: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::raw_text::deserialize_opt")]
    pub longitude: Option<String>,
    pub status: Option<String>,
}

// ==========================================
// 仪表盘统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelStats {
    pub total_parcels: i64,
    pub unassigned: i64,
    pub assigned: i64,
    pub in_transit: i64,
    pub completed: i64,
    pub pending: i64,
}
