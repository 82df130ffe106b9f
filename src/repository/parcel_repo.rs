// ==========================================
// 包裹派送管理后台 - 包裹数据仓储
// ==========================================
// 职责: 管理 parcels / parcel_assignments 表的 CRUD
// 红线: Repository 不含业务规则（状态约束由 API 层判定）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::parcel::{NewParcel, Parcel, ParcelListItem, ParcelStats};
use crate::domain::types::ParcelStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{now_timestamp, parse_status, parse_timestamp};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const PARCEL_COLUMNS: &str = "p.id, p.customer_name, p.phone_number, p.weight, p.pin_code, \
     p.address, p.latitude, p.longitude, p.status, p.assigned_driver_id, p.created_at";

fn map_parcel(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    let status: String = row.get(8)?;
    let created_at: String = row.get(10)?;
    Ok(Parcel {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        phone_number: row.get(2)?,
        weight: row.get(3)?,
        pin_code: row.get(4)?,
        address: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        status: parse_status(&status),
        assigned_driver_id: row.get(9)?,
        created_at: parse_timestamp(10, &created_at)?,
    })
}

// ==========================================
// ParcelRepository - 包裹仓储
// ==========================================
#[derive(Clone)]
pub struct ParcelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ParcelRepository {
    /// 创建新的 ParcelRepository 实例
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

    // ===== 写入 =====

    /// 插入包裹
    ///
    /// # 返回
    /// - Ok(i64): 新包裹 ID
    /// - Err(UniqueConstraintViolation): 手机号已存在（存储层权威判定）
    pub fn insert(&self, parcel: &NewParcel) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO parcels (
                customer_name, phone_number, weight, pin_code, address,
                latitude, longitude, status, assigned_driver_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9)
            "#,
            params![
                parcel.customer_name,
                parcel.phone_number,
                parcel.weight,
                parcel.pin_code,
                parcel.address,
                parcel.latitude,
                parcel.longitude,
                parcel.status.as_str(),
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新包裹字段（状态为 unassigned 时同时解绑司机）
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示不存在）
    pub fn update(&self, id: i64, parcel: &NewParcel) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE parcels SET
                customer_name = ?1, phone_number = ?2, weight = ?3, pin_code = ?4,
                address = ?5, latitude = ?6, longitude = ?7, status = ?8,
                assigned_driver_id = CASE WHEN ?8 = 'unassigned' THEN NULL ELSE assigned_driver_id END
            WHERE id = ?9
            "#,
            params![
                parcel.customer_name,
                parcel.phone_number,
                parcel.weight,
                parcel.pin_code,
                parcel.address,
                parcel.latitude,
                parcel.longitude,
                parcel.status.as_str(),
                id,
            ],
        )?;
        Ok(affected)
    }

    /// 删除包裹（分配日志随外键级联删除）
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM parcels WHERE id = ?1", params![id])?)
    }

    /// 绑定司机并置为 assigned
    pub fn assign_driver(&self, parcel_id: i64, driver_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute(
            "UPDATE parcels SET assigned_driver_id = ?1, status = 'assigned' WHERE id = ?2",
            params![driver_id, parcel_id],
        )?)
    }

    /// 解绑司机并置为 unassigned
    pub fn unassign(&self, parcel_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute(
            "UPDATE parcels SET assigned_driver_id = NULL, status = 'unassigned' WHERE id = ?1",
            params![parcel_id],
        )?)
    }

    /// 更新状态（unassigned 时同时解绑司机）
    pub fn update_status(&self, parcel_id: i64, status: ParcelStatus) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let sql = if status == ParcelStatus::Unassigned {
            "UPDATE parcels SET status = ?1, assigned_driver_id = NULL WHERE id = ?2"
        } else {
            "UPDATE parcels SET status = ?1 WHERE id = ?2"
        };
        Ok(conn.execute(sql, params![status.as_str(), parcel_id])?)
    }

    /// 批量分配（单事务）
    ///
    /// # 返回
    /// - Ok(usize): 实际更新的包裹数（不存在的 ID 不计）
    pub fn bulk_assign(&self, parcel_ids: &[i64], driver_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut affected = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE parcels SET assigned_driver_id = ?1, status = 'assigned' WHERE id = ?2",
            )?;
            for parcel_id in parcel_ids {
                affected += stmt.execute(params![driver_id, parcel_id])?;
            }
        }

        tx.commit()?;
        Ok(affected)
    }

    /// 写入分配日志
    pub fn log_assignment(
        &self,
        parcel_id: i64,
        driver_id: i64,
        assigned_by: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO parcel_assignments (parcel_id, driver_id, assigned_by, assigned_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![parcel_id, driver_id, assigned_by, now_timestamp()],
        )?;
        Ok(())
    }

    // ===== 查询 =====

    /// 按 ID 查询包裹
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Parcel>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM parcels p WHERE p.id = ?1", PARCEL_COLUMNS);
        let parcel = conn.query_row(&sql, params![id], map_parcel).optional()?;
        Ok(parcel)
    }

    /// 包裹列表（最新在前，附带司机姓名）
    pub fn list_with_driver(&self) -> RepositoryResult<Vec<ParcelListItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}, d.full_name
            FROM parcels p
            LEFT JOIN drivers d ON p.assigned_driver_id = d.id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
            PARCEL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], |row| {
                Ok(ParcelListItem {
                    parcel: map_parcel(row)?,
                    driver_name: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// 司机名下包裹（按创建时间升序，ID 兜底）
    pub fn find_by_driver(&self, driver_id: i64) -> RepositoryResult<Vec<Parcel>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM parcels p WHERE p.assigned_driver_id = ?1 ORDER BY p.created_at ASC, p.id ASC",
            PARCEL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let parcels = stmt
            .query_map(params![driver_id], map_parcel)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parcels)
    }

    /// 手机号是否已被其他包裹占用
    ///
    /// # 参数
    /// - phone_number: 规范化后的 10 位手机号
    /// - exclude_id: 更新场景下排除自身
    pub fn phone_exists(&self, phone_number: &str, exclude_id: Option<i64>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM parcels WHERE phone_number = ?1 AND (?2 IS NULL OR id != ?2)",
            params![phone_number, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 全部已存手机号（导入预检用）
    pub fn list_phone_numbers(&self) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT phone_number FROM parcels")?;
        let phones = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(phones)
    }

    /// 包裹统计（总数 + 各状态）
    pub fn stats(&self) -> RepositoryResult<ParcelStats> {
        let conn = self.get_conn()?;
        let stats = conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'unassigned' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'assigned' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'in_transit' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0)
            FROM parcels
            "#,
            [],
            |row| {
                Ok(ParcelStats {
                    total_parcels: row.get(0)?,
                    unassigned: row.get(1)?,
                    assigned: row.get(2)?,
                    in_transit: row.get(3)?,
                    completed: row.get(4)?,
                    pending: row.get(5)?,
                })
            },
        )?;
        Ok(stats)
    }
}
