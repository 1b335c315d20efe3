// ==========================================
// 铁路车皮编组优化系统 - 领域层
// ==========================================
// 职责: 实体定义与领域不变式，不含数据访问
// ==========================================

pub mod compatibility;
pub mod loading_point;
pub mod material;
pub mod order;
pub mod rake;
pub mod stockyard;
pub mod types;
pub mod wagon;

// 重导出核心实体与类型
pub use types::{
    OrderPriority, OrderStatus, RakeStatus, RouteCriterion, TransportMode, WagonStatus,
};

pub use compatibility::CompatibilityRule;
pub use loading_point::LoadingPoint;
pub use material::Material;
pub use order::Order;
pub use rake::{CostBreakdown, RakePlan};
pub use stockyard::{Inventory, Stockyard};
pub use wagon::Wagon;
