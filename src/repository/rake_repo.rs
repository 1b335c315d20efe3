// ==========================================
// 铁路车皮编组优化系统 - 编组仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 编组主行 + 车皮/订单关联行在同一事务内写入，
//       保证"编组创建 + 订单置为已编组"对外原子可见
// ==========================================

use crate::domain::rake::{CostBreakdown, RakePlan};
use crate::domain::types::RakeStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 编组仓储
pub struct RakeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RakeRepository {
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

    /// 编组主行映射（关联ID列表另查）
    fn map_row(row: &Row) -> rusqlite::Result<RakePlan> {
        Ok(RakePlan {
            id: row.get(0)?,
            rake_number: row.get(1)?,
            loading_point_id: row.get(2)?,
            route: row.get(3)?,
            cost: CostBreakdown {
                loading: row.get(4)?,
                transport: row.get(5)?,
                demurrage: row.get(6)?,
                penalty: row.get(7)?,
                total: row.get(8)?,
            },
            status: RakeStatus::from_str(&row.get::<_, String>(9)?),
            reasoning: row.get(10)?,
            formation_date: row.get(11)?,
            wagon_ids: Vec::new(),
            order_ids: Vec::new(),
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        id, rake_number, loading_point_id, route,
        loading_cost, transport_cost, demurrage_cost, penalty_cost, total_cost,
        status, reasoning, formation_date
    "#;

    /// 插入编组（主行 + 关联行，单事务）
    ///
    /// 前置条件: 调用方已通过 CAS 认领全部订单与车皮；
    /// 此处写入失败时由调用方释放认领。
    pub fn insert(&self, rake: &RakePlan) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute("BEGIN TRANSACTION", [])?;

        let result = (|| -> RepositoryResult<()> {
            conn.execute(
                r#"
                INSERT INTO rakes (
                    id, rake_number, loading_point_id, route,
                    loading_cost, transport_cost, demurrage_cost, penalty_cost, total_cost,
                    status, reasoning, formation_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    rake.id,
                    rake.rake_number,
                    rake.loading_point_id,
                    rake.route,
                    rake.cost.loading,
                    rake.cost.transport,
                    rake.cost.demurrage,
                    rake.cost.penalty,
                    rake.cost.total,
                    rake.status.to_db_str(),
                    rake.reasoning,
                    rake.formation_date,
                ],
            )?;

            for (seq_no, wagon_id) in rake.wagon_ids.iter().enumerate() {
                conn.execute(
                    "INSERT INTO rake_wagons (rake_id, wagon_id, seq_no) VALUES (?1, ?2, ?3)",
                    params![rake.id, wagon_id, seq_no as i64],
                )?;
            }

            for order_id in &rake.order_ids {
                conn.execute(
                    "INSERT INTO rake_orders (rake_id, order_id) VALUES (?1, ?2)",
                    params![rake.id, order_id],
                )?;
            }

            Ok(())
        })();

        match result {
            Ok(()) => {
                conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// 装载关联的车皮/订单ID列表
    fn load_links(&self, conn: &Connection, rake: &mut RakePlan) -> RepositoryResult<()> {
        let mut stmt =
            conn.prepare("SELECT wagon_id FROM rake_wagons WHERE rake_id = ?1 ORDER BY seq_no")?;
        rake.wagon_ids = stmt
            .query_map(params![rake.id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        let mut stmt =
            conn.prepare("SELECT order_id FROM rake_orders WHERE rake_id = ?1 ORDER BY order_id")?;
        rake.order_ids = stmt
            .query_map(params![rake.id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        Ok(())
    }

    /// 按ID查询编组
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<RakePlan>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM rakes WHERE id = ?1", Self::SELECT_COLUMNS);
        let rake = conn.query_row(&sql, params![id], Self::map_row).optional()?;

        match rake {
            Some(mut rake) => {
                self.load_links(&conn, &mut rake)?;
                Ok(Some(rake))
            }
            None => Ok(None),
        }
    }

    /// 查询全部编组
    pub fn list(&self) -> RepositoryResult<Vec<RakePlan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM rakes ORDER BY formation_date, rake_number",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rakes = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<RakePlan>>>()?;

        for rake in &mut rakes {
            self.load_links(&conn, rake)?;
        }
        Ok(rakes)
    }

    /// 查询活跃编组（PLANNED/LOADING/IN_TRANSIT/UNLOADING）
    pub fn list_active(&self) -> RepositoryResult<Vec<RakePlan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM rakes WHERE status != 'DELIVERED' ORDER BY formation_date, rake_number",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rakes = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<RakePlan>>>()?;

        for rake in &mut rakes {
            self.load_links(&conn, rake)?;
        }
        Ok(rakes)
    }

    /// 更新编组状态
    pub fn update_status(&self, id: &str, status: RakeStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE rakes SET status = ?2 WHERE id = ?1",
            params![id, status.to_db_str()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Rake".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 统计某车皮出现在多少个活跃编组中（不变式: 恒 <= 1）
    pub fn count_active_by_wagon(&self, wagon_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM rake_wagons rw
            JOIN rakes r ON r.id = rw.rake_id
            WHERE rw.wagon_id = ?1 AND r.status != 'DELIVERED'
            "#,
            params![wagon_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 统计活跃编组数
    pub fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM rakes WHERE status != 'DELIVERED'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 下一个编组编号序号（现有编组总数 + 1）
    pub fn next_rake_seq(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM rakes", [], |row| row.get(0))?;
        Ok(count as usize + 1)
    }
}
