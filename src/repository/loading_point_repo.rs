// ==========================================
// 铁路车皮编组优化系统 - 装车点仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::loading_point::LoadingPoint;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 装车点仓储
pub struct LoadingPointRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LoadingPointRepository {
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
    fn map_row(row: &Row) -> rusqlite::Result<LoadingPoint> {
        Ok(LoadingPoint {
            id: row.get(0)?,
            name: row.get(1)?,
            stockyard_id: row.get(2)?,
            capacity_rakes_per_day: row.get(3)?,
            current_utilization: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "id, name, stockyard_id, capacity_rakes_per_day, current_utilization, created_at";

    /// 插入装车点
    pub fn insert(&self, lp: &LoadingPoint) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO loading_points (
                id, name, stockyard_id, capacity_rakes_per_day, current_utilization, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                lp.id,
                lp.name,
                lp.stockyard_id,
                lp.capacity_rakes_per_day,
                lp.current_utilization,
                lp.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询装车点
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<LoadingPoint>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM loading_points WHERE id = ?1",
            Self::SELECT_COLUMNS
        );
        let lp = conn.query_row(&sql, params![id], Self::map_row).optional()?;
        Ok(lp)
    }

    /// 查询全部装车点
    pub fn list(&self) -> RepositoryResult<Vec<LoadingPoint>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM loading_points ORDER BY name",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let lps = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<LoadingPoint>>>()?;
        Ok(lps)
    }

    /// 更新利用率（截断到 [0,1]）
    pub fn set_utilization(&self, id: &str, utilization: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE loading_points SET current_utilization = ?2 WHERE id = ?1",
            params![id, utilization.clamp(0.0, 1.0)],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "LoadingPoint".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 平均利用率（驾驶舱统计用）
    pub fn average_utilization(&self) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let avg: f64 = conn.query_row(
            "SELECT COALESCE(AVG(current_utilization), 0) FROM loading_points",
            [],
            |row| row.get(0),
        )?;
        Ok(avg)
    }
}
