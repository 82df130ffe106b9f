// ==========================================
// 包裹派送管理后台 - 原始文本字段反序列化
// ==========================================
// 前端表单可能以数字或字符串提交同一字段（"12.5" / 12.5），
// 校验器统一按文本处理，这里把两种形态都收敛为 Option<String>。
// ==========================================

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

/// 反序列化为可选文本（null / 缺失 → None）
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
        TextOrNumber::Bool(b) => b.to_string(),
    }))
}
