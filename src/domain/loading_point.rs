// ==========================================
// 铁路车皮编组优化系统 - 装车点实体
// ==========================================
// 职责: 装车点主数据（吞吐能力/当前利用率）
// 用于等待时间与装车成本计算
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 装车点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadingPoint {
    /// 装车点ID
    pub id: String,

    /// 装车点名称（如 LP-North-1）
    pub name: String,

    /// 所属料场ID
    pub stockyard_id: String,

    /// 吞吐能力（编组/天）
    pub capacity_rakes_per_day: f64,

    /// 当前利用率 [0,1]，越高排队越长、边际装车成本越高
    pub current_utilization: f64,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl LoadingPoint {
    /// 创建新装车点（利用率截断到 [0,1]）
    pub fn new(
        name: String,
        stockyard_id: String,
        capacity_rakes_per_day: f64,
        current_utilization: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            stockyard_id,
            capacity_rakes_per_day,
            current_utilization: current_utilization.clamp(0.0, 1.0),
            created_at: Utc::now(),
        }
    }
}
