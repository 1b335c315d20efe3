// ==========================================
// 铁路车皮编组优化系统 - 数据库 Schema
// ==========================================
// 职责: 建表（幂等），与 db::CURRENT_SCHEMA_VERSION 对齐
// 说明: 订单/车皮的 status 列是乐观并发控制的 CAS 字段
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::Connection;

/// 初始化数据库 schema（幂等，可重复调用）
pub fn init_schema(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS materials (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            material_type TEXT NOT NULL,
            unit TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS stockyards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            capacity_mt REAL NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS inventory (
            id TEXT PRIMARY KEY,
            stockyard_id TEXT NOT NULL REFERENCES stockyards(id),
            material_id TEXT NOT NULL REFERENCES materials(id),
            quantity_mt REAL NOT NULL CHECK (quantity_mt >= 0),
            cost_per_unit REAL NOT NULL,
            last_updated TEXT NOT NULL,
            UNIQUE (stockyard_id, material_id)
        );

        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            customer_name TEXT NOT NULL,
            material_id TEXT NOT NULL REFERENCES materials(id),
            quantity_mt REAL NOT NULL CHECK (quantity_mt > 0),
            destination TEXT NOT NULL,
            priority TEXT NOT NULL,
            deadline TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            penalty_per_day REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);

        CREATE TABLE IF NOT EXISTS wagons (
            id TEXT PRIMARY KEY,
            wagon_number TEXT NOT NULL UNIQUE,
            wagon_type TEXT NOT NULL,
            capacity_mt REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'AVAILABLE',
            current_location TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_wagons_status ON wagons(status);

        CREATE TABLE IF NOT EXISTS loading_points (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            stockyard_id TEXT NOT NULL REFERENCES stockyards(id),
            capacity_rakes_per_day REAL NOT NULL,
            current_utilization REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS compatibility_rules (
            material_type TEXT NOT NULL,
            wagon_type TEXT NOT NULL,
            compatibility_score REAL NOT NULL CHECK (compatibility_score BETWEEN 0 AND 1),
            loading_efficiency REAL NOT NULL CHECK (loading_efficiency BETWEEN 0 AND 1),
            restricted_routes TEXT NOT NULL DEFAULT '[]',
            PRIMARY KEY (material_type, wagon_type)
        );

        CREATE TABLE IF NOT EXISTS rakes (
            id TEXT PRIMARY KEY,
            rake_number TEXT NOT NULL UNIQUE,
            loading_point_id TEXT NOT NULL REFERENCES loading_points(id),
            route TEXT NOT NULL,
            loading_cost REAL NOT NULL,
            transport_cost REAL NOT NULL,
            demurrage_cost REAL NOT NULL,
            penalty_cost REAL NOT NULL,
            total_cost REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'PLANNED',
            reasoning TEXT NOT NULL DEFAULT '',
            formation_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_rakes_status ON rakes(status);

        CREATE TABLE IF NOT EXISTS rake_wagons (
            rake_id TEXT NOT NULL REFERENCES rakes(id),
            wagon_id TEXT NOT NULL REFERENCES wagons(id),
            seq_no INTEGER NOT NULL,
            PRIMARY KEY (rake_id, wagon_id)
        );
        CREATE INDEX IF NOT EXISTS idx_rake_wagons_wagon ON rake_wagons(wagon_id);

        CREATE TABLE IF NOT EXISTS rake_orders (
            rake_id TEXT NOT NULL REFERENCES rakes(id),
            order_id TEXT NOT NULL REFERENCES orders(id),
            PRIMARY KEY (rake_id, order_id)
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{read_schema_version, CURRENT_SCHEMA_VERSION};

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let version = read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(CURRENT_SCHEMA_VERSION));
    }
}
