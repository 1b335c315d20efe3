// ==========================================
// 铁路车皮编组优化系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (编组方案由人工最终确认)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 优化与成本核算规则
pub mod engine;

// 配置层 - 优化参数与费率表
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与示例数据
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    OrderPriority, OrderStatus, RakeStatus, RouteCriterion, TransportMode, WagonStatus,
};

// 领域实体
pub use domain::{
    CompatibilityRule, CostBreakdown, Inventory, LoadingPoint, Material, Order, RakePlan,
    Stockyard, Wagon,
};

// 引擎
pub use engine::{
    AlertEngine, ConstraintResolver, CostModel, CostOptimizer, RakeFormationOptimizer,
    ReasoningProvider, RouteComparator, UtilizationEngine,
};

// 配置
pub use config::OptimizerConfig;

// API
pub use api::{AnalysisApi, DashboardApi, OptimizationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "铁路车皮编组优化系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
