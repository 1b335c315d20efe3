// ==========================================
// 铁路车皮编组优化系统 - 车皮仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 并发控制: claim_available 以 status 列做条件更新（CAS），
//           保证同一车皮同一时刻最多被一个活跃编组占用
// ==========================================

use crate::domain::types::WagonStatus;
use crate::domain::wagon::Wagon;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// WagonRepository - 车皮仓储
// ==========================================

/// 车皮仓储
/// 职责: 管理 wagons 表的CRUD与状态认领
pub struct WagonRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WagonRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射
    fn map_row(row: &Row) -> rusqlite::Result<Wagon> {
        Ok(Wagon {
            id: row.get(0)?,
            wagon_number: row.get(1)?,
            wagon_type: row.get(2)?,
            capacity_mt: row.get(3)?,
            status: WagonStatus::from_str(&row.get::<_, String>(4)?),
            current_location: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "id, wagon_number, wagon_type, capacity_mt, status, current_location, created_at";

    /// 插入车皮
    pub fn insert(&self, wagon: &Wagon) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO wagons (
                id, wagon_number, wagon_type, capacity_mt, status, current_location, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                wagon.id,
                wagon.wagon_number,
                wagon.wagon_type,
                wagon.capacity_mt,
                wagon.status.to_db_str(),
                wagon.current_location,
                wagon.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询车皮
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Wagon>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM wagons WHERE id = ?1", Self::SELECT_COLUMNS);
        let wagon = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(wagon)
    }

    /// 查询全部车皮
    pub fn list(&self) -> RepositoryResult<Vec<Wagon>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM wagons ORDER BY wagon_number",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let wagons = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Wagon>>>()?;
        Ok(wagons)
    }

    /// 查询可用车皮（按额定载重降序，供装箱启发式使用）
    pub fn list_available(&self) -> RepositoryResult<Vec<Wagon>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM wagons WHERE status = 'AVAILABLE' ORDER BY capacity_mt DESC, wagon_number",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let wagons = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Wagon>>>()?;
        Ok(wagons)
    }

    /// 认领可用车皮（CAS: AVAILABLE → LOADED）
    ///
    /// # 返回
    /// - Ok(true): 认领成功
    /// - Ok(false): 认领失败（已被其他编组认领或状态已变更）
    pub fn claim_available(&self, id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE wagons SET status = 'LOADED' WHERE id = ?1 AND status = 'AVAILABLE'",
            params![id],
        )?;
        Ok(affected == 1)
    }

    /// 释放已认领车皮（LOADED → AVAILABLE，用于认领冲突后的回滚）
    pub fn release(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE wagons SET status = 'AVAILABLE' WHERE id = ?1 AND status = 'LOADED'",
            params![id],
        )?;
        Ok(())
    }

    /// 统计可用车皮数
    pub fn count_available(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM wagons WHERE status = 'AVAILABLE'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
