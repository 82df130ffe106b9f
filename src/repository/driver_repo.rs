// ==========================================
// 包裹派送管理后台 - 司机数据仓储
// ==========================================
// 职责: 管理 drivers 表的 CRUD + 工作量聚合查询
// 红线: Repository 不含业务规则
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::driver::{Driver, DriverStats, NewDriver};
use crate::domain::route::DriverWorkload;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{now_timestamp, parse_timestamp};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DRIVER_COLUMNS: &str =
    "id, full_name, phone_number, vehicle_details, is_active, latitude, longitude, created_at";

fn map_driver(row: &Row<'_>) -> rusqlite::Result<Driver> {
    let created_at: String = row.get(7)?;
    Ok(Driver {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone_number: row.get(2)?,
        vehicle_details: row.get(3)?,
        is_active: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}

// ==========================================
// DriverConflicts - 唯一字段占用情况
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverConflicts {
    pub name: bool,
    pub phone: bool,
    pub vehicle: bool,
}

impl DriverConflicts {
    pub fn any(&self) -> bool {
        self.name || self.phone || self.vehicle
    }
}

// ==========================================
// DriverRepository - 司机仓储
// ==========================================
pub struct DriverRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DriverRepository {
    /// 创建新的 DriverRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入司机
    ///
    /// # 返回
    /// - Ok(i64): 新司机 ID
    /// - Err(UniqueConstraintViolation): 姓名/手机号/车牌冲突
    pub fn insert(&self, driver: &NewDriver) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO drivers (
                full_name, phone_number, vehicle_details, is_active,
                latitude, longitude, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                driver.full_name,
                driver.phone_number,
                driver.vehicle_details,
                driver.is_active,
                driver.latitude,
                driver.longitude,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新司机
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示不存在）
    pub fn update(&self, id: i64, driver: &NewDriver) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE drivers SET
                full_name = ?1, phone_number = ?2, vehicle_details = ?3,
                is_active = ?4, latitude = ?5, longitude = ?6
            WHERE id = ?7
            "#,
            params![
                driver.full_name,
                driver.phone_number,
                driver.vehicle_details,
                driver.is_active,
                driver.latitude,
                driver.longitude,
                id,
            ],
        )?;
        Ok(affected)
    }

    /// 删除司机（调用方需先确认无包裹引用）
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM drivers WHERE id = ?1", params![id])?)
    }

    /// 按 ID 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Driver>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM drivers WHERE id = ?1", DRIVER_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_driver).optional()?)
    }

    /// 按 ID 查询活跃司机
    pub fn find_active(&self, id: i64) -> RepositoryResult<Option<Driver>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM drivers WHERE id = ?1 AND is_active = 1",
            DRIVER_COLUMNS
        );
        Ok(conn.query_row(&sql, params![id], map_driver).optional()?)
    }

    /// 司机列表（最新在前）
    pub fn list(&self) -> RepositoryResult<Vec<Driver>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM drivers ORDER BY created_at DESC, id DESC",
            DRIVER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let drivers = stmt
            .query_map([], map_driver)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(drivers)
    }

    /// 检查姓名（忽略大小写）/ 手机号 / 车牌是否已被其他司机占用
    ///
    /// # 参数
    /// - exclude_id: 更新场景下排除自身
    pub fn find_conflicts(
        &self,
        full_name: &str,
        phone_number: &str,
        vehicle_details: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<DriverConflicts> {
        let conn = self.get_conn()?;
        let conflicts = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN full_name = ?1 COLLATE NOCASE THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN phone_number = ?2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN vehicle_details = ?3 THEN 1 ELSE 0 END), 0)
            FROM drivers
            WHERE ?4 IS NULL OR id != ?4
            "#,
            params![full_name, phone_number, vehicle_details, exclude_id],
            |row| {
                Ok(DriverConflicts {
                    name: row.get::<_, i64>(0)? > 0,
                    phone: row.get::<_, i64>(1)? > 0,
                    vehicle: row.get::<_, i64>(2)? > 0,
                })
            },
        )?;
        Ok(conflicts)
    }

    /// 名下包裹数
    pub fn count_assigned_parcels(&self, driver_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM parcels WHERE assigned_driver_id = ?1",
            params![driver_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 活跃司机工作量（总数降序，姓名升序）
    pub fn list_workloads(&self) -> RepositoryResult<Vec<DriverWorkload>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                d.id, d.full_name, d.phone_number, d.vehicle_details,
                d.latitude, d.longitude, d.is_active,
                COUNT(p.id) AS total_parcels,
                COALESCE(SUM(CASE WHEN p.status = 'assigned' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN p.status = 'in_transit' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN p.status = 'completed' THEN 1 ELSE 0 END), 0)
            FROM drivers d
            LEFT JOIN parcels p ON d.id = p.assigned_driver_id
            WHERE d.is_active = 1
            GROUP BY d.id
            ORDER BY total_parcels DESC, d.full_name ASC
            "#,
        )?;
        let workloads = stmt
            .query_map([], |row| {
                Ok(DriverWorkload {
                    driver_id: row.get(0)?,
                    driver_name: row.get(1)?,
                    driver_phone: row.get(2)?,
                    vehicle_details: row.get(3)?,
                    driver_latitude: row.get(4)?,
                    driver_longitude: row.get(5)?,
                    is_active: row.get(6)?,
                    total_parcels: row.get(7)?,
                    assigned_parcels: row.get(8)?,
                    in_transit_parcels: row.get(9)?,
                    completed_parcels: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workloads)
    }

    /// 司机统计（总数 / 活跃数）
    pub fn stats(&self) -> RepositoryResult<DriverStats> {
        let conn = self.get_conn()?;
        let stats = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) FROM drivers",
            [],
            |row| {
                Ok(DriverStats {
                    total_drivers: row.get(0)?,
                    active_drivers: row.get(1)?,
                })
            },
        )?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};

    fn setup() -> DriverRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        DriverRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn new_driver(name: &str, phone: &str, plate: &str) -> NewDriver {
        NewDriver {
            full_name: name.to_string(),
            phone_number: phone.to_string(),
            vehicle_details: plate.to_string(),
            is_active: true,
            latitude: 13.0,
            longitude: 80.15,
        }
    }

    #[test]
    fn test_name_unique_ignores_case() {
        let repo = setup();
        repo.insert(&new_driver("Ravi Kumar", "9000000001", "TN48BS1234"))
            .unwrap();
        let err = repo
            .insert(&new_driver("RAVI KUMAR", "9000000002", "TN48BS1235"))
            .unwrap_err();
        assert!(err.is_unique_violation_on("drivers.full_name"));
    }

    #[test]
    fn test_find_conflicts_excludes_self() {
        let repo = setup();
        let id = repo
            .insert(&new_driver("Ravi Kumar", "9000000001", "TN48BS1234"))
            .unwrap();

        let conflicts = repo
            .find_conflicts("ravi kumar", "9000000001", "KA01AB1234", None)
            .unwrap();
        assert!(conflicts.name && conflicts.phone && !conflicts.vehicle);

        let own = repo
            .find_conflicts("Ravi Kumar", "9000000001", "TN48BS1234", Some(id))
            .unwrap();
        assert!(!own.any());
    }

    #[test]
    fn test_find_active_skips_inactive() {
        let repo = setup();
        let mut inactive = new_driver("Meena S", "9000000003", "TN01AB1234");
        inactive.is_active = false;
        let id = repo.insert(&inactive).unwrap();

        assert!(repo.find_by_id(id).unwrap().is_some());
        assert!(repo.find_active(id).unwrap().is_none());

        let stats = repo.stats().unwrap();
        assert_eq!(stats.total_drivers, 1);
        assert_eq!(stats.active_drivers, 0);
    }
}
