// ==========================================
// 包裹派送管理后台 - 配置管理器
// ==========================================
// 职责: 运行期配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigError, ImportConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 默认：导入响应最多返回的错误条数
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 10;

/// 默认：拒绝文件下载后的删除延迟（秒）
pub const DEFAULT_EXPORT_CLEANUP_DELAY_SECS: u64 = 5;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置，格式错误时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr + ToString + Copy,
    {
        let raw = self.get_config_or_default(key, &default.to_string())?;
        Ok(raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
            default
        }))
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> Result<HashMap<String, String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_reported_errors(&self) -> Result<usize, ConfigError> {
        self.get_parsed_or_default(config_keys::MAX_REPORTED_ERRORS, DEFAULT_MAX_REPORTED_ERRORS)
    }

    async fn get_export_cleanup_delay_secs(&self) -> Result<u64, ConfigError> {
        self.get_parsed_or_default(
            config_keys::EXPORT_CLEANUP_DELAY_SECS,
            DEFAULT_EXPORT_CLEANUP_DELAY_SECS,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const MAX_REPORTED_ERRORS: &str = "import.max_reported_errors";

    // 拒绝文件导出
    pub const EXPORT_CLEANUP_DELAY_SECS: &str = "export.cleanup_delay_secs";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = setup();
        assert_eq!(config.get_max_reported_errors().await.unwrap(), 10);
        assert_eq!(config.get_export_cleanup_delay_secs().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_override_and_bad_value() {
        let config = setup();
        config
            .set_global_config_value(config_keys::MAX_REPORTED_ERRORS, "3")
            .unwrap();
        config
            .set_global_config_value(config_keys::EXPORT_CLEANUP_DELAY_SECS, "soon")
            .unwrap();

        assert_eq!(config.get_max_reported_errors().await.unwrap(), 3);
        assert_eq!(config.get_export_cleanup_delay_secs().await.unwrap(), 5);

        let snapshot = config.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get(config_keys::MAX_REPORTED_ERRORS).map(String::as_str),
            Some("3")
        );
    }
}
