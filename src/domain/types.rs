// ==========================================
// 包裹派送管理后台 - 领域类型定义
// ==========================================
// 职责: 包裹状态枚举及其约束
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 包裹状态 (Parcel Status)
// ==========================================
// 约束: Assigned / InTransit / Completed 必须有司机
//       Unassigned 必须没有司机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    Unassigned, // 未分配
    Assigned,   // 已分配
    InTransit,  // 运输中
    Completed,  // 已完成
    Pending,    // 挂起
}

impl ParcelStatus {
    /// 全部合法状态（按数据库字典顺序）
    pub const ALL: [ParcelStatus; 5] = [
        ParcelStatus::Unassigned,
        ParcelStatus::Assigned,
        ParcelStatus::InTransit,
        ParcelStatus::Completed,
        ParcelStatus::Pending,
    ];

    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Unassigned => "unassigned",
            ParcelStatus::Assigned => "assigned",
            ParcelStatus::InTransit => "in_transit",
            ParcelStatus::Completed => "completed",
            ParcelStatus::Pending => "pending",
        }
    }

    /// 严格解析（区分大小写，与数据库字典一致）
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// 宽松解析（忽略大小写与首尾空白），用于导入文件
    pub fn parse_lenient(value: &str) -> Option<Self> {
        Self::parse(&value.trim().to_lowercase())
    }

    /// 该状态是否要求包裹已绑定司机
    pub fn requires_driver(&self) -> bool {
        matches!(
            self,
            ParcelStatus::Assigned | ParcelStatus::InTransit | ParcelStatus::Completed
        )
    }

    /// 面向用户的显示文本（in_transit → "in transit"）
    pub fn display_label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl Default for ParcelStatus {
    fn default() -> Self {
        ParcelStatus::Unassigned
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
