// ==========================================
// 铁路车皮编组优化系统 - 料场与库存仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 不变式: allocate_inventory 以 quantity_mt >= ? 做条件更新，
//         库存量在任何分配之后不得为负
// ==========================================

use crate::domain::stockyard::{Inventory, Stockyard};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StockyardRepository - 料场仓储
// ==========================================

/// 料场与库存仓储
pub struct StockyardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockyardRepository {
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

    /// 料场行映射
    fn map_stockyard(row: &Row) -> rusqlite::Result<Stockyard> {
        Ok(Stockyard {
            id: row.get(0)?,
            name: row.get(1)?,
            location: row.get(2)?,
            capacity_mt: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// 库存行映射
    fn map_inventory(row: &Row) -> rusqlite::Result<Inventory> {
        Ok(Inventory {
            id: row.get(0)?,
            stockyard_id: row.get(1)?,
            material_id: row.get(2)?,
            quantity_mt: row.get(3)?,
            cost_per_unit: row.get(4)?,
            last_updated: row.get(5)?,
        })
    }

    // ==========================================
    // 料场操作
    // ==========================================

    /// 插入料场
    pub fn insert(&self, stockyard: &Stockyard) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stockyards (id, name, location, capacity_mt, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stockyard.id,
                stockyard.name,
                stockyard.location,
                stockyard.capacity_mt,
                stockyard.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询料场
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Stockyard>> {
        let conn = self.get_conn()?;
        let stockyard = conn
            .query_row(
                "SELECT id, name, location, capacity_mt, created_at FROM stockyards WHERE id = ?1",
                params![id],
                Self::map_stockyard,
            )
            .optional()?;
        Ok(stockyard)
    }

    /// 查询全部料场
    pub fn list(&self) -> RepositoryResult<Vec<Stockyard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, location, capacity_mt, created_at FROM stockyards ORDER BY name",
        )?;
        let stockyards = stmt
            .query_map([], Self::map_stockyard)?
            .collect::<SqliteResult<Vec<Stockyard>>>()?;
        Ok(stockyards)
    }

    // ==========================================
    // 库存操作
    // ==========================================

    /// 插入或更新库存（以 (stockyard_id, material_id) 为唯一键）
    pub fn upsert_inventory(&self, inventory: &Inventory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO inventory (id, stockyard_id, material_id, quantity_mt, cost_per_unit, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (stockyard_id, material_id) DO UPDATE SET
                quantity_mt = excluded.quantity_mt,
                cost_per_unit = excluded.cost_per_unit,
                last_updated = excluded.last_updated
            "#,
            params![
                inventory.id,
                inventory.stockyard_id,
                inventory.material_id,
                inventory.quantity_mt,
                inventory.cost_per_unit,
                inventory.last_updated,
            ],
        )?;
        Ok(())
    }

    /// 查询全部库存
    pub fn list_inventory(&self) -> RepositoryResult<Vec<Inventory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, stockyard_id, material_id, quantity_mt, cost_per_unit, last_updated
            FROM inventory ORDER BY stockyard_id, material_id
            "#,
        )?;
        let inventory = stmt
            .query_map([], Self::map_inventory)?
            .collect::<SqliteResult<Vec<Inventory>>>()?;
        Ok(inventory)
    }

    /// 扣减库存（条件更新，绝不让库存为负）
    ///
    /// # 返回
    /// - Ok(()): 扣减成功
    /// - Err(BusinessRuleViolation): 库存不足
    pub fn allocate_inventory(
        &self,
        stockyard_id: &str,
        material_id: &str,
        quantity_mt: f64,
    ) -> RepositoryResult<()> {
        if quantity_mt <= 0.0 {
            return Err(RepositoryError::ValidationError(format!(
                "扣减量必须大于0（quantity_mt={}）",
                quantity_mt
            )));
        }

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE inventory
            SET quantity_mt = quantity_mt - ?3, last_updated = ?4
            WHERE stockyard_id = ?1 AND material_id = ?2 AND quantity_mt >= ?3
            "#,
            params![stockyard_id, material_id, quantity_mt, Utc::now()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "库存不足: stockyard={} material={} 需要{}吨",
                stockyard_id, material_id, quantity_mt
            )));
        }
        Ok(())
    }

    /// 回补库存（整列回滚时对 allocate_inventory 的补偿操作）
    pub fn release_inventory(
        &self,
        stockyard_id: &str,
        material_id: &str,
        quantity_mt: f64,
    ) -> RepositoryResult<()> {
        if quantity_mt <= 0.0 {
            return Err(RepositoryError::ValidationError(format!(
                "回补量必须大于0（quantity_mt={}）",
                quantity_mt
            )));
        }

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE inventory
            SET quantity_mt = quantity_mt + ?3, last_updated = ?4
            WHERE stockyard_id = ?1 AND material_id = ?2
            "#,
            params![stockyard_id, material_id, quantity_mt, Utc::now()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Inventory".to_string(),
                id: format!("{}:{}", stockyard_id, material_id),
            });
        }
        Ok(())
    }

    /// 库存总价值（数量 × 单位成本求和）
    pub fn total_inventory_value(&self) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let value: f64 = conn.query_row(
            "SELECT COALESCE(SUM(quantity_mt * cost_per_unit), 0) FROM inventory",
            [],
            |row| row.get(0),
        )?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema::init_schema;

    fn repo() -> StockyardRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        StockyardRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn seeded(repo: &StockyardRepository) -> (String, String) {
        let yard = Stockyard::new("North Yard".to_string(), "Plant North".to_string(), 50_000.0);
        repo.insert(&yard).unwrap();
        repo.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO materials (id, name, material_type, unit, created_at) VALUES ('MAT-COAL', 'Coal', 'Bulk', 'MT', ?1)",
                params![Utc::now()],
            )
            .unwrap();
        let inventory = Inventory::new(yard.id.clone(), "MAT-COAL".to_string(), 1_000.0, 3_200.0);
        repo.upsert_inventory(&inventory).unwrap();
        (yard.id, "MAT-COAL".to_string())
    }

    fn quantity_of(repo: &StockyardRepository, material_id: &str) -> f64 {
        repo.list_inventory()
            .unwrap()
            .into_iter()
            .find(|i| i.material_id == material_id)
            .unwrap()
            .quantity_mt
    }

    // 测试1: 扣减后回补, 库存量回到原值
    #[test]
    fn test_release_restores_allocated_quantity() {
        let repo = repo();
        let (yard_id, material_id) = seeded(&repo);

        repo.allocate_inventory(&yard_id, &material_id, 600.0).unwrap();
        assert!((quantity_of(&repo, &material_id) - 400.0).abs() < 1e-9);

        repo.release_inventory(&yard_id, &material_id, 600.0).unwrap();
        assert!((quantity_of(&repo, &material_id) - 1_000.0).abs() < 1e-9);
    }

    // 测试2: 回补不存在的库存行与非正回补量均报错
    #[test]
    fn test_release_validates_row_and_quantity() {
        let repo = repo();
        let (yard_id, material_id) = seeded(&repo);

        let err = repo
            .release_inventory(&yard_id, "no-such-material", 100.0)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));

        let err = repo
            .release_inventory(&yard_id, &material_id, 0.0)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}
