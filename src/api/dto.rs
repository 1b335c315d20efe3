// ==========================================
// 铁路车皮编组优化系统 - API 数据传输对象
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RakePlan, RouteCriterion};
use crate::engine::{
    Co2Analysis, CostOptimizationResult, DemurrageAlert, FormationResult, LoadingPointOptimization,
    ModeComparison, ModeOption, PenaltyAlert, TopUpSuggestion, UnfulfilledOrder,
    UtilizationReport,
};

// ==========================================
// 编组优化
// ==========================================

/// 编组优化请求
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRakeRequest {
    /// 参与规划的订单 ID; 为空时取全部待处理订单
    #[serde(default)]
    pub order_ids: Vec<String>,
    /// 优先级权重 w, 截断到 [0,1]
    #[serde(default)]
    pub priority_weight: f64,
    /// 预算上限 (可选)
    #[serde(default)]
    pub max_budget: Option<f64>,
}

/// 编组优化响应 (只读规划, 不落库)
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeRakeResponse {
    pub result: FormationResult,
    pub generated_at: DateTime<Utc>,
}

/// 编组方案落库响应
#[derive(Debug, Clone, Serialize)]
pub struct ApplyFormationResponse {
    /// 已落库的编组
    pub created_rakes: Vec<RakePlan>,
    /// 未满足订单 (含重算后仍认领失败的)
    pub unfulfilled: Vec<UnfulfilledOrder>,
    /// 是否发生过并发冲突并触发重算
    pub recomputed: bool,
    pub total_cost: f64,
    /// 以最终落库总成本对照预算上限 (未设预算时为 true)
    pub budget_met: bool,
    pub explanation: String,
}

// ==========================================
// 成本优化
// ==========================================

/// 成本优化请求
#[derive(Debug, Clone, Deserialize)]
pub struct CostOptimizationRequest {
    #[serde(default)]
    pub order_ids: Vec<String>,
    #[serde(default)]
    pub max_budget: Option<f64>,
}

/// 成本优化方案实施响应
#[derive(Debug, Clone, Serialize)]
pub struct ImplementCostOptimizationResponse {
    /// 已实施 (订单转已分配并扣减库存) 的订单 ID
    pub implemented: Vec<String>,
    /// 实施失败的订单及原因
    pub conflicts: Vec<(String, String)>,
    pub result: CostOptimizationResult,
}

// ==========================================
// 分析类
// ==========================================

/// 线路比选请求
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
    pub quantity_mt: f64,
}

/// 按准则选路请求
#[derive(Debug, Clone, Deserialize)]
pub struct RouteOptimizeRequest {
    pub origin: String,
    pub destination: String,
    pub quantity_mt: f64,
    pub criterion: RouteCriterion,
}

/// 单列编组利用率视图
#[derive(Debug, Clone, Serialize)]
pub struct RakeUtilizationView {
    pub rake_id: String,
    pub rake_number: String,
    pub status: String,
    pub report: UtilizationReport,
}

/// 车皮利用率总览
#[derive(Debug, Clone, Serialize)]
pub struct WagonUtilizationResponse {
    pub rakes: Vec<RakeUtilizationView>,
    pub fleet_available: i64,
    /// 在役编组平均利用率 (%)
    pub fleet_average_utilization_pct: f64,
    pub inefficient_rakes: usize,
}

/// 滞期费预警响应
#[derive(Debug, Clone, Serialize)]
pub struct DemurrageResponse {
    pub alerts: Vec<DemurrageAlert>,
    pub total_accrued_cost: f64,
    pub generated_at: DateTime<Utc>,
}

/// 违约金风险响应
#[derive(Debug, Clone, Serialize)]
pub struct PenaltyResponse {
    pub alerts: Vec<PenaltyAlert>,
    /// 已逾期订单的累计风险敞口合计
    pub total_accrued_exposure: f64,
    pub generated_at: DateTime<Utc>,
}

/// 运价比选响应
#[derive(Debug, Clone, Serialize)]
pub struct FreightCompareResponse {
    pub comparison: ModeComparison,
}

/// 选路响应
#[derive(Debug, Clone, Serialize)]
pub struct RouteOptimizeResponse {
    pub criterion: RouteCriterion,
    pub best: ModeOption,
    pub alternatives: Vec<ModeOption>,
}

/// 碳排放分析响应
#[derive(Debug, Clone, Serialize)]
pub struct Co2Response {
    pub analysis: Co2Analysis,
}

/// 装车调度建议响应
#[derive(Debug, Clone, Serialize)]
pub struct LoadingOptimizationResponse {
    pub loading_points: Vec<LoadingPointOptimization>,
    /// 计划中编组的补载建议 (rake_number -> 建议)
    pub top_up_suggestions: Vec<(String, Vec<TopUpSuggestion>)>,
}

// ==========================================
// 看板
// ==========================================

/// 看板统计
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub pending_orders: i64,
    /// 紧急窗口内到期的待处理订单
    pub urgent_orders: i64,
    pub available_wagons: i64,
    pub active_rakes: i64,
    pub total_inventory_value: f64,
    /// 装车点平均占用率 [0,1]
    pub average_loading_point_utilization: f64,
    /// 在场编组滞期费总额
    pub total_demurrage_cost: f64,
    pub generated_at: DateTime<Utc>,
}
