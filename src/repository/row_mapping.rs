// ==========================================
// 包裹派送管理后台 - 行映射辅助函数
// ==========================================
// 职责: TEXT 列 ↔ 领域类型（时间戳 / 状态）
// ==========================================

use crate::domain::types::ParcelStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

/// 当前时间（定宽 RFC3339，TEXT 列按字典序即时间序）
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 解析 RFC3339 时间戳列
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析状态列（未知值按未分配处理）
pub(crate) fn parse_status(raw: &str) -> ParcelStatus {
    ParcelStatus::parse(raw).unwrap_or_default()
}
