// ==========================================
// 包裹派送管理后台 - 记录校验器
// ==========================================
// 职责: 单字段校验（纯函数）+ 按场景组合（导入行 / 包裹入参 / 司机入参）
// 返回: None = 通过；Some(原因) = 失败（面向用户的英文提示）
// 顺序: 姓名 → 手机 → 重量 → 邮编 → 地址 → 纬度 → 经度
// ==========================================

use crate::domain::driver::DriverInput;
use crate::domain::import::RawParcelRow;
use crate::domain::parcel::ParcelInput;
use crate::importer::data_cleaner::{DataCleaner, PHONE_DIGITS};
use regex::Regex;
use std::sync::OnceLock;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;
const ADDRESS_MIN_CHARS: usize = 10;
const ADDRESS_MAX_CHARS: usize = 200;
const PIN_DIGITS: usize = 6;
const PLATE_CHARS: usize = 10;
const MAX_WEIGHT_KG: f64 = 1000.0;

fn plate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z]{1,2}[0-9]{4}$").expect("valid plate regex")
    })
}

/// 可选字段：有值才参与校验
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// 缺失判定：None 或空串（仅空白不算缺失，由后续规则给出更具体的原因）
fn is_missing(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

// ==========================================
// 单字段校验
// ==========================================

pub fn validate_full_name(value: Option<&str>) -> Option<String> {
    if is_missing(value) {
        return Some("Full name is required".to_string());
    }
    let trimmed = value.unwrap_or_default().trim();
    let len = trimmed.chars().count();
    if len < NAME_MIN_CHARS {
        return Some("Full name must be at least 2 characters long".to_string());
    }
    if len > NAME_MAX_CHARS {
        return Some("Full name must be less than 50 characters".to_string());
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return Some("Full name can only contain letters and spaces".to_string());
    }
    None
}

pub fn validate_phone_number(value: Option<&str>) -> Option<String> {
    if is_missing(value) {
        return Some("Phone number is required".to_string());
    }
    let digits = DataCleaner.digits_only(value.unwrap_or_default());
    if digits.len() != PHONE_DIGITS {
        return Some("Phone number must be exactly 10 digits".to_string());
    }
    None
}

pub fn validate_vehicle_number(value: Option<&str>) -> Option<String> {
    if is_missing(value) {
        return Some("Vehicle number is required".to_string());
    }
    let plate = DataCleaner.normalize_plate(value.unwrap_or_default());
    if !plate_regex().is_match(&plate) {
        return Some(
            "Vehicle number must be in Indian format (e.g., TN48BS1234 or BH01AA1234)".to_string(),
        );
    }
    if plate.chars().count() != PLATE_CHARS {
        return Some("Vehicle number must be exactly 10 characters long".to_string());
    }
    None
}

pub fn validate_weight(value: Option<&str>) -> Option<String> {
    if is_missing(value) {
        return Some("Weight is required".to_string());
    }
    match DataCleaner.parse_leading_number(value.unwrap_or_default()) {
        None => Some("Weight must be a valid number".to_string()),
        Some(w) if w <= 0.0 => Some("Weight must be greater than 0".to_string()),
        Some(w) if w > MAX_WEIGHT_KG => Some("Weight must be less than 1000 kg".to_string()),
        Some(_) => None,
    }
}

pub fn validate_pin_code(value: Option<&str>) -> Option<String> {
    if is_missing(value) {
        return Some("PIN code is required".to_string());
    }
    let digits = DataCleaner.digits_only(value.unwrap_or_default());
    if digits.len() != PIN_DIGITS {
        return Some("PIN code must be exactly 6 digits".to_string());
    }
    None
}

pub fn validate_address(value: Option<&str>) -> Option<String> {
    if is_missing(value) {
        return Some("Address is required".to_string());
    }
    let len = value.unwrap_or_default().trim().chars().count();
    if len < ADDRESS_MIN_CHARS {
        return Some("Address must be at least 10 characters long".to_string());
    }
    if len > ADDRESS_MAX_CHARS {
        return Some("Address must be less than 200 characters".to_string());
    }
    None
}

/// 坐标校验（纬度/经度共用）
fn validate_coordinate(value: Option<&str>, label: &str, bound: f64) -> Option<String> {
    if is_missing(value) {
        return Some(format!("{} is required", label));
    }
    match DataCleaner.parse_leading_number(value.unwrap_or_default()) {
        None => Some(format!("{} must be a valid number", label)),
        Some(v) if v < -bound || v > bound => {
            Some(format!("{} must be between -{} and {}", label, bound, bound))
        }
        Some(_) => None,
    }
}

pub fn validate_latitude(value: Option<&str>) -> Option<String> {
    validate_coordinate(value, "Latitude", 90.0)
}

pub fn validate_longitude(value: Option<&str>) -> Option<String> {
    validate_coordinate(value, "Longitude", 180.0)
}

// ==========================================
// RecordValidator - 场景组合
// ==========================================
pub struct RecordValidator {
    cleaner: DataCleaner,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordValidator {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 导入行校验
    ///
    /// # 规则
    /// - 姓名 / 手机 / 地址 必填
    /// - 重量 / 邮编 / 经纬度 仅在有值时校验
    /// - 手机号在去除 + / - / 空白与国家码之后校验
    pub fn validate_parcel_row(&self, row: &RawParcelRow) -> Vec<String> {
        let cleaned_phone = row
            .phone_number
            .as_deref()
            .map(|p| self.cleaner.strip_phone_noise(p));

        [
            validate_full_name(row.customer_name.as_deref()),
            validate_phone_number(cleaned_phone.as_deref()),
            present(&row.weight).and_then(|v| validate_weight(Some(v))),
            present(&row.pin_code).and_then(|v| validate_pin_code(Some(v))),
            validate_address(row.address.as_deref()),
            present(&row.latitude).and_then(|v| validate_latitude(Some(v))),
            present(&row.longitude).and_then(|v| validate_longitude(Some(v))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// 手工创建/更新包裹：七个字段全部必填
    pub fn validate_parcel_input(&self, input: &ParcelInput) -> Vec<String> {
        [
            validate_full_name(input.customer_name.as_deref()),
            validate_phone_number(input.phone_number.as_deref()),
            validate_weight(input.weight.as_deref()),
            validate_pin_code(input.pin_code.as_deref()),
            validate_address(input.address.as_deref()),
            validate_latitude(input.latitude.as_deref()),
            validate_longitude(input.longitude.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// 司机创建/更新：姓名 / 手机 / 车牌
    pub fn validate_driver_input(&self, input: &DriverInput) -> Vec<String> {
        [
            validate_full_name(input.full_name.as_deref()),
            validate_phone_number(input.phone_number.as_deref()),
            validate_vehicle_number(input.vehicle_details.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
