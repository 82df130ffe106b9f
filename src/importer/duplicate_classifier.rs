// ==========================================
// 包裹派送管理后台 - 重复检测（两阶段分类）
// ==========================================
// 第一遍: 逐行校验，统计合法行中的手机号出现次数
// 第二遍: 按行号顺序判定（校验失败 → 库中已存在 → 批内非首次 → 接受）
// 红线: 纯函数，不访问存储；同一输入两次分类结果完全相同
// 说明: 本分类仅为预检，写库时的唯一约束才是最终裁判
// ==========================================

use crate::domain::import::{
    AcceptedRow, ImportClassification, RawParcelRow, RejectedRow, RejectionKind,
};
use crate::domain::parcel::NewParcel;
use crate::domain::types::ParcelStatus;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::parcel_importer_trait::DuplicateClassifier;
use crate::importer::record_validator::RecordValidator;
use std::collections::{HashMap, HashSet};

/// 第一遍的单行结果
struct CheckedRow<'a> {
    row: &'a RawParcelRow,
    phone_key: String,
    errors: Vec<String>,
}

pub struct PhoneDuplicateClassifier {
    validator: RecordValidator,
    cleaner: DataCleaner,
}

impl Default for PhoneDuplicateClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneDuplicateClassifier {
    pub fn new() -> Self {
        Self {
            validator: RecordValidator::new(),
            cleaner: DataCleaner,
        }
    }

    /// 合法行 → 待写入包裹（规范化）
    fn normalize(&self, row: &RawParcelRow, phone_key: &str) -> NewParcel {
        NewParcel {
            customer_name: self
                .cleaner
                .clean_text(row.customer_name.as_deref().unwrap_or_default()),
            phone_number: phone_key.to_string(),
            weight: self.cleaner.parse_optional_number(row.weight.as_deref()),
            pin_code: self
                .cleaner
                .normalize_null(row.pin_code.as_deref())
                .map(|p| self.cleaner.digits_only(&p)),
            address: self
                .cleaner
                .clean_text(row.address.as_deref().unwrap_or_default()),
            latitude: self.cleaner.parse_optional_number(row.latitude.as_deref()),
            longitude: self.cleaner.parse_optional_number(row.longitude.as_deref()),
            status: import_status(row.status.as_deref()),
        }
    }
}

/// 导入状态：仅保留 unassigned / pending，其余（含需要司机的状态）一律 unassigned
pub fn import_status(raw: Option<&str>) -> ParcelStatus {
    match raw.and_then(ParcelStatus::parse_lenient) {
        Some(ParcelStatus::Pending) => ParcelStatus::Pending,
        _ => ParcelStatus::Unassigned,
    }
}

impl DuplicateClassifier for PhoneDuplicateClassifier {
    fn classify(
        &self,
        existing_phones: &HashSet<String>,
        rows: &[RawParcelRow],
    ) -> ImportClassification {
        // ===== 第一遍：校验 + 统计 =====
        let checked: Vec<CheckedRow<'_>> = rows
            .iter()
            .map(|row| CheckedRow {
                row,
                phone_key: self
                    .cleaner
                    .canonical_phone(row.phone_number.as_deref().unwrap_or_default()),
                errors: self.validator.validate_parcel_row(row),
            })
            .collect();

        let mut phone_counts: HashMap<&str, usize> = HashMap::new();
        for c in checked.iter().filter(|c| c.errors.is_empty()) {
            *phone_counts.entry(c.phone_key.as_str()).or_insert(0) += 1;
        }

        // ===== 第二遍：按行号顺序判定 =====
        let mut seen: HashSet<&str> = HashSet::new();
        let mut result = ImportClassification::default();

        for c in &checked {
            if !c.errors.is_empty() {
                result.rejected.push(RejectedRow {
                    row: c.row.clone(),
                    kind: RejectionKind::Invalid(c.errors.clone()),
                });
                continue;
            }

            if existing_phones.contains(&c.phone_key) {
                result.rejected.push(RejectedRow {
                    row: c.row.clone(),
                    kind: RejectionKind::ExistingInStore,
                });
                continue;
            }

            let repeated = phone_counts.get(c.phone_key.as_str()).copied().unwrap_or(0) > 1;
            let first_occurrence = seen.insert(c.phone_key.as_str());
            if repeated && !first_occurrence {
                result.rejected.push(RejectedRow {
                    row: c.row.clone(),
                    kind: RejectionKind::RepeatedInBatch,
                });
                continue;
            }

            result.accepted.push(AcceptedRow {
                row: c.row.clone(),
                parcel: self.normalize(c.row, &c.phone_key),
            });
        }

        result
    }
}
