// ==========================================
// 铁路车皮编组优化系统 - API 层
// ==========================================
// 职责: 请求校验、快照装配、引擎调用与落库编排
// 红线: API 不实现优化规则, 优化规则只在 Engine 层
// ==========================================

pub mod analysis_api;
pub mod dashboard_api;
pub mod dto;
pub mod error;
pub mod optimization_api;

// 重导出核心类型
pub use analysis_api::AnalysisApi;
pub use dashboard_api::DashboardApi;
pub use dto::{
    ApplyFormationResponse, Co2Response, CostOptimizationRequest, DashboardStats,
    DemurrageResponse, FreightCompareResponse, ImplementCostOptimizationResponse,
    LoadingOptimizationResponse, OptimizeRakeRequest, OptimizeRakeResponse, PenaltyResponse,
    RakeUtilizationView, RouteOptimizeRequest, RouteOptimizeResponse, RouteRequest,
    WagonUtilizationResponse,
};
pub use error::{ApiError, ApiResult};
pub use optimization_api::OptimizationApi;
