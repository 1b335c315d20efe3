// ==========================================
// 铁路车皮编组优化系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑，只做数据访问
// 并发控制: 订单/车皮认领通过 status 列条件更新（CAS）实现，
//           不使用全局互斥锁，互不相交的优化请求可并行推进
// ==========================================

pub mod compatibility_repo;
pub mod error;
pub mod loading_point_repo;
pub mod material_repo;
pub mod order_repo;
pub mod rake_repo;
pub mod schema;
pub mod stockyard_repo;
pub mod wagon_repo;

// 重导出核心类型
pub use compatibility_repo::CompatibilityRuleRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use loading_point_repo::LoadingPointRepository;
pub use material_repo::MaterialRepository;
pub use order_repo::OrderRepository;
pub use rake_repo::RakeRepository;
pub use schema::init_schema;
pub use stockyard_repo::StockyardRepository;
pub use wagon_repo::WagonRepository;
