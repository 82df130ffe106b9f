// ==========================================
// 包裹派送管理后台 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段（支持别名），不做类型转换
// 说明: 原值保留，拒绝文件回写时与上传内容一致
// ==========================================

use crate::domain::import::RawParcelRow;
use crate::importer::parcel_importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashMap;

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_raw_parcel(&self, row: &HashMap<String, String>, row_number: usize) -> RawParcelRow {
        RawParcelRow {
            customer_name: self.get_string(row, "customer_name"),
            phone_number: self.get_string(row, "phone_number"),
            weight: self.get_string(row, "weight"),
            pin_code: self.get_string(row, "pin_code"),
            address: self.get_string(row, "address"),
            latitude: self.get_string(row, "latitude"),
            longitude: self.get_string(row, "longitude"),
            status: self.get_string(row, "status"),

            // 元信息
            row_number,
        }
    }
}

impl FieldMapper {
    /// 提取字符串字段，支持多个可能的列名（别名）
    ///
    /// 空白单元格视为缺失；非空单元格原样返回
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        // 定义列名别名映射（表头已转小写）
        let aliases: &[&str] = match key {
            "customer_name" => &["customer_name", "name"],
            "phone_number" => &["phone_number", "phone"],
            "pin_code" => &["pin_code", "pincode", "pin"],
            "latitude" => &["latitude", "lat"],
            "longitude" => &["longitude", "lng", "lon"],
            _ => &[],
        };

        std::iter::once(key)
            .chain(aliases.iter().copied())
            .filter_map(|alias| row.get(alias))
            .find(|v| !v.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_standard_columns() {
        let raw = row(&[
            ("customer_name", "Asha Raman"),
            ("phone_number", "9876543210"),
            ("weight", "2.5"),
            ("address", "12 Anna Salai, Chennai"),
        ]);

        let mapped = FieldMapper.map_to_raw_parcel(&raw, 4);
        assert_eq!(mapped.customer_name.as_deref(), Some("Asha Raman"));
        assert_eq!(mapped.weight.as_deref(), Some("2.5"));
        assert_eq!(mapped.pin_code, None);
        assert_eq!(mapped.row_number, 4);
    }

    #[test]
    fn test_map_aliases() {
        let raw = row(&[
            ("name", "Ravi"),
            ("phone", "9123456780"),
            ("pincode", "600001"),
            ("lat", "13.05"),
            ("lon", "80.2"),
        ]);

        let mapped = FieldMapper.map_to_raw_parcel(&raw, 1);
        assert_eq!(mapped.customer_name.as_deref(), Some("Ravi"));
        assert_eq!(mapped.phone_number.as_deref(), Some("9123456780"));
        assert_eq!(mapped.pin_code.as_deref(), Some("600001"));
        assert_eq!(mapped.latitude.as_deref(), Some("13.05"));
        assert_eq!(mapped.longitude.as_deref(), Some("80.2"));
    }

    #[test]
    fn test_empty_canonical_column_falls_back_to_alias() {
        let raw = row(&[("phone_number", ""), ("phone", "9123456780")]);
        let mapped = FieldMapper.map_to_raw_parcel(&raw, 1);
        assert_eq!(mapped.phone_number.as_deref(), Some("9123456780"));
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let raw = row(&[("phone_number", " +91 98765-43210 "), ("weight", "   ")]);
        let mapped = FieldMapper.map_to_raw_parcel(&raw, 1);
        assert_eq!(mapped.phone_number.as_deref(), Some(" +91 98765-43210 "));
        assert_eq!(mapped.weight, None);
    }
}
