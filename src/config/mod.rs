// ==========================================
// 铁路车皮编组优化系统 - 配置层
// ==========================================

pub mod optimizer_config;

pub use optimizer_config::{OptimizerConfig, RouteDistance};
