// ==========================================
// 铁路车皮编组优化系统 - 引擎层
// ==========================================
// 职责: 实现编组优化与成本核算规则，不拼 SQL
// 红线: Engine 不拼 SQL, 所有编组建议必须输出 reasoning
// ==========================================

pub mod alerts;
pub mod compatibility;
pub mod cost;
pub mod cost_optimizer;
pub mod formation;
pub mod multimodal;
pub mod reasoning;
pub mod snapshot;
pub mod utilization;

// 重导出核心引擎
pub use alerts::{AlertEngine, DemurrageAlert, LoadingPointOptimization, PenaltyAlert};
pub use compatibility::{ConstraintResolver, Resolution};
pub use cost::{CostContext, CostModel};
pub use cost_optimizer::{CostAnalysis, CostOptimizationResult, CostOptimizer};
pub use formation::{
    FormationRequest, FormationResult, RakeFormationOptimizer, RecommendedRake, UnfulfilledOrder,
    UnfulfilledReason,
};
pub use multimodal::{Co2Analysis, ModeComparison, ModeOption, RouteComparator};
pub use reasoning::{
    BoundedReasoning, ReasoningContext, ReasoningProvider, TemplateReasoningProvider,
};
pub use snapshot::PlanningSnapshot;
pub use utilization::{TopUpSuggestion, UtilizationEngine, UtilizationReport, WagonUtilization};
