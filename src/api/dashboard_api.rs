// ==========================================
// 铁路车皮编组优化系统 - 看板 API
// ==========================================
// 职责: 运营态势的聚合统计, 只读
// ==========================================

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::api::dto::DashboardStats;
use crate::api::error::ApiResult;
use crate::config::OptimizerConfig;
use crate::domain::OrderStatus;
use crate::engine::AlertEngine;
use crate::repository::{
    LoadingPointRepository, OrderRepository, RakeRepository, StockyardRepository, WagonRepository,
};

/// 看板 API
pub struct DashboardApi {
    order_repo: Arc<OrderRepository>,
    wagon_repo: Arc<WagonRepository>,
    stockyard_repo: Arc<StockyardRepository>,
    loading_point_repo: Arc<LoadingPointRepository>,
    rake_repo: Arc<RakeRepository>,
    config: OptimizerConfig,
    alert_engine: AlertEngine,
}

impl DashboardApi {
    pub fn new(
        order_repo: Arc<OrderRepository>,
        wagon_repo: Arc<WagonRepository>,
        stockyard_repo: Arc<StockyardRepository>,
        loading_point_repo: Arc<LoadingPointRepository>,
        rake_repo: Arc<RakeRepository>,
        config: OptimizerConfig,
    ) -> Self {
        DashboardApi {
            order_repo,
            wagon_repo,
            stockyard_repo,
            loading_point_repo,
            rake_repo,
            alert_engine: AlertEngine::new(config.clone()),
            config,
        }
    }

    /// 看板统计聚合
    pub fn stats(&self) -> ApiResult<DashboardStats> {
        let now = Utc::now();
        let urgent_before = now + Duration::days(self.config.urgent_window_days);
        let active_rakes = self.rake_repo.list_active()?;

        Ok(DashboardStats {
            pending_orders: self.order_repo.count_by_status(OrderStatus::Pending)?,
            urgent_orders: self.order_repo.count_urgent_pending(urgent_before)?,
            available_wagons: self.wagon_repo.count_available()?,
            active_rakes: active_rakes.len() as i64,
            total_inventory_value: self.stockyard_repo.total_inventory_value()?,
            average_loading_point_utilization: self.loading_point_repo.average_utilization()?,
            total_demurrage_cost: self.alert_engine.total_demurrage_cost(&active_rakes, now),
            generated_at: now,
        })
    }
}
