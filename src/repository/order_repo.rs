// ==========================================
// 铁路车皮编组优化系统 - 订单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 并发控制: claim_pending 以 status 列做条件更新（CAS），
//           两个并发优化请求绝不会同时认领同一订单
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::{OrderPriority, OrderStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// OrderRepository - 订单仓储
// ==========================================

/// 订单仓储
/// 职责: 管理 orders 表的CRUD与状态认领
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
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
    fn map_row(row: &Row) -> rusqlite::Result<Order> {
        Ok(Order {
            id: row.get(0)?,
            customer_name: row.get(1)?,
            material_id: row.get(2)?,
            quantity_mt: row.get(3)?,
            destination: row.get(4)?,
            priority: OrderPriority::from_str(&row.get::<_, String>(5)?),
            deadline: row.get(6)?,
            status: OrderStatus::from_str(&row.get::<_, String>(7)?),
            penalty_per_day: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        id, customer_name, material_id, quantity_mt, destination,
        priority, deadline, status, penalty_per_day, created_at
    "#;

    /// 插入订单（领域不变式已在 Order::new 校验，此处再做防御性校验）
    pub fn insert(&self, order: &Order) -> RepositoryResult<()> {
        if order.quantity_mt <= 0.0 {
            return Err(RepositoryError::ValidationError(format!(
                "发运量必须大于0（order_id={}）",
                order.id
            )));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO orders (
                id, customer_name, material_id, quantity_mt, destination,
                priority, deadline, status, penalty_per_day, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                order.id,
                order.customer_name,
                order.material_id,
                order.quantity_mt,
                order.destination,
                order.priority.to_db_str(),
                order.deadline,
                order.status.to_db_str(),
                order.penalty_per_day,
                order.created_at,
            ],
        )?;

        Ok(())
    }

    /// 按ID查询订单
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", Self::SELECT_COLUMNS);
        let order = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(order)
    }

    /// 按ID批量查询订单（未知ID返回 NotFound）
    pub fn find_by_ids(&self, ids: &[String]) -> RepositoryResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            match self.find_by_id(id)? {
                Some(order) => orders.push(order),
                None => {
                    return Err(RepositoryError::NotFound {
                        entity: "Order".to_string(),
                        id: id.clone(),
                    })
                }
            }
        }
        Ok(orders)
    }

    /// 查询全部订单
    pub fn list(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM orders ORDER BY created_at, id",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Order>>>()?;
        Ok(orders)
    }

    /// 查询待编组订单
    pub fn list_pending(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM orders WHERE status = 'PENDING' ORDER BY deadline, id",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Order>>>()?;
        Ok(orders)
    }

    /// 更新订单状态（只允许单向推进）
    pub fn update_status(&self, id: &str, target: OrderStatus) -> RepositoryResult<()> {
        let current = self
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: id.to_string(),
            })?
            .status;

        if !current.can_transition_to(target) {
            return Err(RepositoryError::InvalidStateTransition {
                from: current.to_string(),
                to: target.to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE orders SET status = ?2 WHERE id = ?1",
            params![id, target.to_db_str()],
        )?;
        Ok(())
    }

    /// 认领待编组订单（CAS: PENDING → ASSIGNED）
    ///
    /// # 返回
    /// - Ok(true): 认领成功
    /// - Ok(false): 认领失败（已被其他请求认领或状态已变更）
    pub fn claim_pending(&self, id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE orders SET status = 'ASSIGNED' WHERE id = ?1 AND status = 'PENDING'",
            params![id],
        )?;
        Ok(affected == 1)
    }

    /// 释放已认领订单（ASSIGNED → PENDING，用于认领冲突后的回滚）
    pub fn release(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE orders SET status = 'PENDING' WHERE id = ?1 AND status = 'ASSIGNED'",
            params![id],
        )?;
        Ok(())
    }

    /// 统计指定状态的订单数
    pub fn count_by_status(&self, status: OrderStatus) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE status = ?1",
            params![status.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 统计交付期限临近的待编组订单数（urgent_window 内）
    pub fn count_urgent_pending(&self, before: DateTime<Utc>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE status = 'PENDING' AND deadline <= ?1",
            params![before],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
