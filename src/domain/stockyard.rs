// ==========================================
// 铁路车皮编组优化系统 - 料场与库存实体
// ==========================================
// 职责: 料场主数据 + 分物料库存
// 不变式: 任何分配后 Inventory.quantity >= 0
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 料场
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stockyard {
    /// 料场ID
    pub id: String,

    /// 料场名称
    pub name: String,

    /// 所在位置（用于路线/距离计算的起点）
    pub location: String,

    /// 总容量（吨）
    pub capacity_mt: f64,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Stockyard {
    /// 创建新料场
    pub fn new(name: String, location: String, capacity_mt: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            location,
            capacity_mt,
            created_at: Utc::now(),
        }
    }
}

/// 料场分物料库存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// 库存ID
    pub id: String,

    /// 料场ID
    pub stockyard_id: String,

    /// 物料ID
    pub material_id: String,

    /// 库存量（吨），分配后不得为负
    pub quantity_mt: f64,

    /// 单位成本（元/吨）
    pub cost_per_unit: f64,

    /// 最后更新时间
    pub last_updated: DateTime<Utc>,
}

impl Inventory {
    /// 创建新库存记录
    pub fn new(stockyard_id: String, material_id: String, quantity_mt: f64, cost_per_unit: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            stockyard_id,
            material_id,
            quantity_mt,
            cost_per_unit,
            last_updated: Utc::now(),
        }
    }
}
