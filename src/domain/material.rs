// ==========================================
// 铁路车皮编组优化系统 - 物料实体
// ==========================================
// 职责: 物料主数据（基础参考数据，极少变更）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 物料主数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID
    pub id: String,

    /// 物料名称（如 Coal / Iron Ore / Steel Coils）
    pub name: String,

    /// 物料类型（如 Bulk / Finished，用于兼容性规则匹配）
    pub material_type: String,

    /// 计量单位（MT）
    pub unit: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Material {
    /// 创建新物料
    pub fn new(name: String, material_type: String, unit: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            material_type,
            unit,
            created_at: Utc::now(),
        }
    }
}
