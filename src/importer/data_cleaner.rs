// ==========================================
// 包裹派送管理后台 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 手机号与车牌规范化 / 数值前缀解析
// 红线: 纯函数，不访问存储
// ==========================================

use std::sync::OnceLock;

use regex::Regex;

/// 印度手机号国家码
const COUNTRY_CODE: &str = "91";

/// 规范化后的手机号位数
pub const PHONE_DIGITS: usize = 10;

fn leading_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
    })
}

pub struct DataCleaner;

impl DataCleaner {
    /// 去除首尾空白
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 标准化 NULL 值（空字符串/空白 → None）
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 仅保留数字字符
    pub fn digits_only(&self, value: &str) -> String {
        value.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// 导入用手机号预清洗：去掉 + / - / 空白，超过 10 位且以 91 开头时去掉国家码
    ///
    /// 返回值仍可能含非数字字符（用于校验），规范键见 `canonical_phone`
    pub fn strip_phone_noise(&self, value: &str) -> String {
        let stripped: String = value
            .chars()
            .filter(|c| *c != '+' && *c != '-' && !c.is_whitespace())
            .collect();

        if stripped.chars().count() > PHONE_DIGITS && stripped.starts_with(COUNTRY_CODE) {
            stripped[COUNTRY_CODE.len()..].to_string()
        } else {
            stripped
        }
    }

    /// 规范手机号键（用于唯一性比较）
    pub fn canonical_phone(&self, value: &str) -> String {
        self.digits_only(&self.strip_phone_noise(value))
    }

    /// 车牌规范化：去空白 + 大写
    pub fn normalize_plate(&self, value: &str) -> String {
        value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }

    /// 解析数值前缀（"12kg" → 12，"abc" → None）
    ///
    /// 溢出的指数（"1e400"）得到无穷大，交由范围校验拒绝
    pub fn parse_leading_number(&self, value: &str) -> Option<f64> {
        let trimmed = value.trim_start();
        leading_number_regex()
            .find(trimmed)
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    /// 可选数值字段：空值 → None，其余按前缀解析
    pub fn parse_optional_number(&self, value: Option<&str>) -> Option<f64> {
        self.normalize_null(value)
            .and_then(|v| self.parse_leading_number(&v))
    }
}
