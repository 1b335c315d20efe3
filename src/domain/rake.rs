// ==========================================
// 铁路车皮编组优化系统 - 编组实体与成本分解
// ==========================================
// 职责: 编组（RakePlan）持久化实体
// 不变式: sum(订单发运量) <= sum(车皮额定载重)
// 说明: 编组弱引用订单/车皮（按ID查询），不拥有其生命周期
// ==========================================

use crate::domain::types::RakeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 成本分解 (Cost Breakdown)
// ==========================================

/// 四项成本分解
///
/// total 恒等于四项之和；相同输入必须产生相同分解（确定性）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CostBreakdown {
    /// 装车成本
    pub loading: f64,

    /// 运输成本
    pub transport: f64,

    /// 滞期费
    pub demurrage: f64,

    /// 违约金风险（期望值）
    pub penalty: f64,

    /// 合计
    pub total: f64,
}

impl CostBreakdown {
    /// 由四项构造并求和
    pub fn new(loading: f64, transport: f64, demurrage: f64, penalty: f64) -> Self {
        Self {
            loading,
            transport,
            demurrage,
            penalty,
            total: loading + transport + demurrage + penalty,
        }
    }

    /// 主导成本项名称（用于可解释性输出）
    pub fn dominant_component(&self) -> &'static str {
        let items = [
            ("装车成本", self.loading),
            ("运输成本", self.transport),
            ("滞期费", self.demurrage),
            ("违约金风险", self.penalty),
        ];
        items
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| *name)
            .unwrap_or("装车成本")
    }
}

// ==========================================
// 编组 (Rake Plan)
// ==========================================

/// 编组方案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RakePlan {
    /// 编组ID
    pub id: String,

    /// 编组编号（如 RAKE-001）
    pub rake_number: String,

    /// 车皮ID列表（有序）
    pub wagon_ids: Vec<String>,

    /// 覆盖的订单ID列表
    pub order_ids: Vec<String>,

    /// 装车点ID
    pub loading_point_id: String,

    /// 路线（"起点 -> 目的地"）
    pub route: String,

    /// 成本分解
    pub cost: CostBreakdown,

    /// 状态
    pub status: RakeStatus,

    /// 优化器给出的编组理由（可解释性输出）
    pub reasoning: String,

    /// 编组日期
    pub formation_date: DateTime<Utc>,
}

impl RakePlan {
    /// 校验容量不变式: 订单总量不得超过车皮总载重
    ///
    /// # 参数
    /// - total_order_mt: 编组内订单发运量合计
    /// - total_wagon_capacity_mt: 编组内车皮额定载重合计
    pub fn validate_capacity(
        total_order_mt: f64,
        total_wagon_capacity_mt: f64,
    ) -> Result<(), String> {
        if total_order_mt > total_wagon_capacity_mt {
            return Err(format!(
                "编组容量不足: 订单总量{}吨 > 车皮总载重{}吨",
                total_order_mt, total_wagon_capacity_mt
            ));
        }
        Ok(())
    }
}
