// ==========================================
// 铁路车皮编组优化系统 - 应用层
// ==========================================

pub mod sample_data;
pub mod state;

pub use sample_data::seed_if_empty;
pub use state::AppState;
