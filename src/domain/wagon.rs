// ==========================================
// 铁路车皮编组优化系统 - 车皮实体
// ==========================================
// 职责: 车皮主数据
// 不变式: 同一车皮同一时刻最多出现在一个活跃编组中
// ==========================================

use crate::domain::types::WagonStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 车皮
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wagon {
    /// 车皮ID
    pub id: String,

    /// 车皮编号（如 W001）
    pub wagon_number: String,

    /// 车皮类型（如 BOXN / BRN / BCN，用于兼容性规则匹配）
    pub wagon_type: String,

    /// 额定载重（吨）
    pub capacity_mt: f64,

    /// 状态
    pub status: WagonStatus,

    /// 当前所在位置（与料场 location 对齐时视为就位）
    pub current_location: Option<String>,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Wagon {
    /// 创建新车皮
    pub fn new(
        wagon_number: String,
        wagon_type: String,
        capacity_mt: f64,
        current_location: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            wagon_number,
            wagon_type,
            capacity_mt,
            status: WagonStatus::Available,
            current_location,
            created_at: Utc::now(),
        }
    }
}
