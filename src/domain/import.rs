// ==========================================
// 包裹派送管理后台 - 批量导入领域模型
// ==========================================
// 生命周期: 仅在一次导入请求内，不落库
// 流程: 文件解析 → RawParcelRow → 分类 → 接受/拒绝
// ==========================================

use crate::domain::parcel::NewParcel;
use serde::{Deserialize, Serialize};

// ==========================================
// RawParcelRow - 导入中间结构体
// ==========================================
// 用途: 字段映射后的原始值（未清洗），导出拒绝文件时原样回写
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParcelRow {
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub weight: Option<String>,
    pub pin_code: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub status: Option<String>,

    // 元信息
    pub row_number: usize, // 数据行号（1 起，不含表头）
}

// ==========================================
// RejectionKind - 拒绝原因分类
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reasons", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionKind {
    /// 字段校验失败（可能多条原因）
    Invalid(Vec<String>),
    /// 手机号已存在于库中（预检）
    ExistingInStore,
    /// 同批次内重复（非首次出现）
    RepeatedInBatch,
    /// 写库时唯一约束冲突（权威判定）
    ConflictOnWrite,
}

impl RejectionKind {
    pub const EXISTING_IN_STORE_REASON: &'static str = "Phone number already exists in database";
    pub const REPEATED_IN_BATCH_REASON: &'static str = "Duplicate phone number within CSV file";
    pub const CONFLICT_ON_WRITE_REASON: &'static str =
        "A parcel with this phone number already exists";

    /// 面向用户的原因文本
    pub fn reason(&self) -> String {
        match self {
            RejectionKind::Invalid(reasons) => reasons.join(", "),
            RejectionKind::ExistingInStore => Self::EXISTING_IN_STORE_REASON.to_string(),
            RejectionKind::RepeatedInBatch => Self::REPEATED_IN_BATCH_REASON.to_string(),
            RejectionKind::ConflictOnWrite => Self::CONFLICT_ON_WRITE_REASON.to_string(),
        }
    }

    /// 是否属于重复类拒绝
    pub fn is_duplicate(&self) -> bool {
        !matches!(self, RejectionKind::Invalid(_))
    }
}

// ==========================================
// RejectedRow - 被拒绝的行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: RawParcelRow,
    pub kind: RejectionKind,
}

impl RejectedRow {
    pub fn row_number(&self) -> usize {
        self.row.row_number
    }

    pub fn reason(&self) -> String {
        self.kind.reason()
    }

    /// 错误摘要行（"Row 3: ..."）
    pub fn error_line(&self) -> String {
        format!("Row {}: {}", self.row.row_number, self.reason())
    }
}

// ==========================================
// AcceptedRow - 通过校验与去重的行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedRow {
    pub row: RawParcelRow,
    pub parcel: NewParcel,
}

// ==========================================
// ImportClassification - 分类结果
// ==========================================
// 不变式: accepted 与 rejected 互斥，且合并后覆盖全部输入行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportClassification {
    pub accepted: Vec<AcceptedRow>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportClassification {
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.rejected.iter().filter(|r| !r.kind.is_duplicate()).count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.rejected.iter().filter(|r| r.kind.is_duplicate()).count()
    }
}

// ==========================================
// ImportReport - 导入管道输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub total_rows: usize,
    pub success_count: usize,   // 实际写库成功行数（逐行统计）
    pub error_count: usize,     // 校验失败 + 非约束类写库失败
    pub duplicate_count: usize, // 预检重复 + 写库约束冲突
    pub rejected_file: Option<String>,
    pub errors: Vec<String>,    // 错误/警告（按配置条数截断）
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason_text() {
        let invalid = RejectionKind::Invalid(vec![
            "Full name is required".to_string(),
            "Address is required".to_string(),
        ]);
        assert_eq!(invalid.reason(), "Full name is required, Address is required");
        assert!(!invalid.is_duplicate());

        assert!(RejectionKind::ExistingInStore.reason().contains("already exists in database"));
        assert!(RejectionKind::RepeatedInBatch.is_duplicate());
        assert!(RejectionKind::ConflictOnWrite.is_duplicate());
    }

    #[test]
    fn test_error_line_carries_row_number() {
        let rejected = RejectedRow {
            row: RawParcelRow {
                row_number: 7,
                ..Default::default()
            },
            kind: RejectionKind::RepeatedInBatch,
        };
        assert_eq!(
            rejected.error_line(),
            "Row 7: Duplicate phone number within CSV file"
        );
    }
}
