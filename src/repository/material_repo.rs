// ==========================================
// 铁路车皮编组优化系统 - 物料仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::material::Material;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 物料仓储
pub struct MaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialRepository {
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
    fn map_row(row: &Row) -> rusqlite::Result<Material> {
        Ok(Material {
            id: row.get(0)?,
            name: row.get(1)?,
            material_type: row.get(2)?,
            unit: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// 插入物料
    pub fn insert(&self, material: &Material) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO materials (id, name, material_type, unit, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                material.id,
                material.name,
                material.material_type,
                material.unit,
                material.created_at,
            ],
        )?;
        Ok(())
    }

    /// 查询全部物料
    pub fn list(&self) -> RepositoryResult<Vec<Material>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, material_type, unit, created_at FROM materials ORDER BY name",
        )?;
        let materials = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Material>>>()?;
        Ok(materials)
    }

    /// 统计物料数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM materials", [], |row| row.get(0))?;
        Ok(count)
    }
}
