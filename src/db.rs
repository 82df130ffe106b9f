// ==========================================
// 包裹派送管理后台 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 启动时建表（幂等），唯一约束由存储层强制
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建表语句（幂等）
///
/// 说明：
/// - drivers 姓名唯一性大小写不敏感
/// - parcels.phone_number 存规范化 10 位数字，唯一约束是并发导入的最终裁判
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key),
    FOREIGN KEY (scope_id) REFERENCES config_scope(scope_id)
);

CREATE TABLE IF NOT EXISTS drivers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    vehicle_details TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_drivers_full_name ON drivers(full_name COLLATE NOCASE);
CREATE UNIQUE INDEX IF NOT EXISTS ux_drivers_phone_number ON drivers(phone_number);
CREATE UNIQUE INDEX IF NOT EXISTS ux_drivers_vehicle_details ON drivers(vehicle_details);

CREATE TABLE IF NOT EXISTS parcels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_name TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    weight REAL,
    pin_code TEXT,
    address TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    status TEXT NOT NULL DEFAULT 'unassigned',
    assigned_driver_id INTEGER,
    created_at TEXT NOT NULL,
    FOREIGN KEY (assigned_driver_id) REFERENCES drivers(id)
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_parcels_phone_number ON parcels(phone_number);
CREATE INDEX IF NOT EXISTS ix_parcels_driver ON parcels(assigned_driver_id);

CREATE TABLE IF NOT EXISTS parcel_assignments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parcel_id INTEGER NOT NULL,
    driver_id INTEGER NOT NULL,
    assigned_by INTEGER NOT NULL,
    assigned_at TEXT NOT NULL,
    FOREIGN KEY (parcel_id) REFERENCES parcels(id) ON DELETE CASCADE,
    FOREIGN KEY (driver_id) REFERENCES drivers(id) ON DELETE CASCADE
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表并写入 schema_version 与全局配置作用域（可重复执行）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [CURRENT_SCHEMA_VERSION],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key) VALUES ('global', 'GLOBAL', 'global')",
        [],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }

    #[test]
    fn test_parcel_phone_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let insert = "INSERT INTO parcels (customer_name, phone_number, address, created_at) \
                      VALUES ('Asha', '9876543210', '12 Anna Salai, Chennai', '2026-01-01T00:00:00Z')";
        conn.execute(insert, []).unwrap();
        let err = conn.execute(insert, []).unwrap_err();
        assert!(err.to_string().contains("UNIQUE"));
    }
}
