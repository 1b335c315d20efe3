// ==========================================
// 铁路车皮编组优化系统 - 应用状态装配
// ==========================================
// 职责: 连接初始化、建表、仓储/引擎/API 装配
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::api::{AnalysisApi, DashboardApi, OptimizationApi};
use crate::config::OptimizerConfig;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::{
    init_schema, CompatibilityRuleRepository, LoadingPointRepository, MaterialRepository,
    OrderRepository, RakeRepository, StockyardRepository, WagonRepository,
};

/// 应用状态: 持有全部仓储与 API 的装配结果
pub struct AppState {
    pub config: OptimizerConfig,

    pub order_repo: Arc<OrderRepository>,
    pub wagon_repo: Arc<WagonRepository>,
    pub stockyard_repo: Arc<StockyardRepository>,
    pub material_repo: Arc<MaterialRepository>,
    pub loading_point_repo: Arc<LoadingPointRepository>,
    pub compatibility_repo: Arc<CompatibilityRuleRepository>,
    pub rake_repo: Arc<RakeRepository>,

    pub optimization_api: OptimizationApi,
    pub analysis_api: AnalysisApi,
    pub dashboard_api: DashboardApi,
}

impl AppState {
    /// 打开数据库文件并完成装配
    pub fn new(db_path: &str, config: OptimizerConfig) -> Result<Self> {
        let conn = open_sqlite_connection(db_path)
            .with_context(|| format!("打开数据库失败: {}", db_path))?;
        info!(db_path = %db_path, "数据库已打开");
        Self::from_connection(conn, config)
    }

    /// 内存数据库装配 (测试用)
    pub fn in_memory(config: OptimizerConfig) -> Result<Self> {
        let conn = Connection::open_in_memory().context("打开内存数据库失败")?;
        configure_sqlite_connection(&conn).context("初始化连接参数失败")?;
        Self::from_connection(conn, config)
    }

    fn from_connection(conn: Connection, config: OptimizerConfig) -> Result<Self> {
        init_schema(&conn).context("初始化数据库表结构失败")?;
        let conn = Arc::new(Mutex::new(conn));

        let order_repo = Arc::new(OrderRepository::from_connection(Arc::clone(&conn)));
        let wagon_repo = Arc::new(WagonRepository::from_connection(Arc::clone(&conn)));
        let stockyard_repo = Arc::new(StockyardRepository::from_connection(Arc::clone(&conn)));
        let material_repo = Arc::new(MaterialRepository::from_connection(Arc::clone(&conn)));
        let loading_point_repo =
            Arc::new(LoadingPointRepository::from_connection(Arc::clone(&conn)));
        let compatibility_repo =
            Arc::new(CompatibilityRuleRepository::from_connection(Arc::clone(&conn)));
        let rake_repo = Arc::new(RakeRepository::from_connection(Arc::clone(&conn)));

        let optimization_api = OptimizationApi::new(
            Arc::clone(&order_repo),
            Arc::clone(&wagon_repo),
            Arc::clone(&stockyard_repo),
            Arc::clone(&material_repo),
            Arc::clone(&loading_point_repo),
            Arc::clone(&compatibility_repo),
            Arc::clone(&rake_repo),
            config.clone(),
        );
        let analysis_api = AnalysisApi::new(
            Arc::clone(&order_repo),
            Arc::clone(&wagon_repo),
            Arc::clone(&stockyard_repo),
            Arc::clone(&material_repo),
            Arc::clone(&loading_point_repo),
            Arc::clone(&compatibility_repo),
            Arc::clone(&rake_repo),
            config.clone(),
        );
        let dashboard_api = DashboardApi::new(
            Arc::clone(&order_repo),
            Arc::clone(&wagon_repo),
            Arc::clone(&stockyard_repo),
            Arc::clone(&loading_point_repo),
            Arc::clone(&rake_repo),
            config.clone(),
        );

        info!("应用状态装配完成");
        Ok(AppState {
            config,
            order_repo,
            wagon_repo,
            stockyard_repo,
            material_repo,
            loading_point_repo,
            compatibility_repo,
            rake_repo,
            optimization_api,
            analysis_api,
            dashboard_api,
        })
    }
}
