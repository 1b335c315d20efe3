// ==========================================
// 铁路车皮编组优化系统 - 运营分析 API
// ==========================================
// 职责: 利用率、滞期、违约金、线路与排放等只读分析
// ==========================================

use std::sync::Arc;

use chrono::Utc;

use crate::api::dto::{
    Co2Response, DemurrageResponse, FreightCompareResponse, LoadingOptimizationResponse,
    PenaltyResponse, RakeUtilizationView, RouteOptimizeRequest, RouteRequest,
    WagonUtilizationResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::config::OptimizerConfig;
use crate::domain::RakeStatus;
use crate::engine::{
    AlertEngine, ConstraintResolver, PlanningSnapshot, RouteComparator, UtilizationEngine,
};
use crate::repository::{
    CompatibilityRuleRepository, LoadingPointRepository, MaterialRepository, OrderRepository,
    RakeRepository, StockyardRepository, WagonRepository,
};

/// 运营分析 API: 全部操作只读
pub struct AnalysisApi {
    order_repo: Arc<OrderRepository>,
    wagon_repo: Arc<WagonRepository>,
    stockyard_repo: Arc<StockyardRepository>,
    material_repo: Arc<MaterialRepository>,
    loading_point_repo: Arc<LoadingPointRepository>,
    compatibility_repo: Arc<CompatibilityRuleRepository>,
    rake_repo: Arc<RakeRepository>,
    config: OptimizerConfig,
    utilization_engine: UtilizationEngine,
    route_comparator: RouteComparator,
    alert_engine: AlertEngine,
}

impl AnalysisApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_repo: Arc<OrderRepository>,
        wagon_repo: Arc<WagonRepository>,
        stockyard_repo: Arc<StockyardRepository>,
        material_repo: Arc<MaterialRepository>,
        loading_point_repo: Arc<LoadingPointRepository>,
        compatibility_repo: Arc<CompatibilityRuleRepository>,
        rake_repo: Arc<RakeRepository>,
        config: OptimizerConfig,
    ) -> Self {
        AnalysisApi {
            order_repo,
            wagon_repo,
            stockyard_repo,
            material_repo,
            loading_point_repo,
            compatibility_repo,
            rake_repo,
            utilization_engine: UtilizationEngine::new(&config),
            route_comparator: RouteComparator::new(config.clone()),
            alert_engine: AlertEngine::new(config.clone()),
            config,
        }
    }

    fn validate_route_input(origin: &str, destination: &str, quantity_mt: f64) -> ApiResult<()> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "起点与目的地不能为空".to_string(),
            ));
        }
        if quantity_mt <= 0.0 {
            return Err(ApiError::InvalidRequest(format!(
                "发运量必须大于0 (quantity_mt={})",
                quantity_mt
            )));
        }
        Ok(())
    }

    /// 车皮利用率总览: 逐列活跃编组 + 车队概况
    pub fn wagon_utilization(&self) -> ApiResult<WagonUtilizationResponse> {
        let rakes = self.rake_repo.list_active()?;
        let mut views = Vec::with_capacity(rakes.len());
        for rake in &rakes {
            let mut wagons = Vec::with_capacity(rake.wagon_ids.len());
            for wagon_id in &rake.wagon_ids {
                if let Some(w) = self.wagon_repo.find_by_id(wagon_id)? {
                    wagons.push(w);
                }
            }
            let orders = self.order_repo.find_by_ids(&rake.order_ids)?;
            let total_quantity: f64 = orders.iter().map(|o| o.quantity_mt).sum();
            views.push(RakeUtilizationView {
                rake_id: rake.id.clone(),
                rake_number: rake.rake_number.clone(),
                status: rake.status.to_string(),
                report: self.utilization_engine.analyze_rake(&wagons, total_quantity),
            });
        }

        let fleet_average = if views.is_empty() {
            0.0
        } else {
            views
                .iter()
                .map(|v| v.report.average_utilization_pct)
                .sum::<f64>()
                / views.len() as f64
        };
        Ok(WagonUtilizationResponse {
            fleet_available: self.wagon_repo.count_available()?,
            fleet_average_utilization_pct: fleet_average,
            inefficient_rakes: views
                .iter()
                .filter(|v| v.report.average_utilization_pct < self.config.min_wagon_utilization * 100.0)
                .count(),
            rakes: views,
        })
    }

    /// 滞期费预警
    pub fn demurrage_alerts(&self) -> ApiResult<DemurrageResponse> {
        let now = Utc::now();
        let rakes = self.rake_repo.list_active()?;
        let alerts = self.alert_engine.demurrage_alerts(&rakes, now);
        Ok(DemurrageResponse {
            total_accrued_cost: alerts.iter().map(|a| a.accrued_cost).sum(),
            alerts,
            generated_at: now,
        })
    }

    /// 违约金风险预警
    pub fn penalty_alerts(&self) -> ApiResult<PenaltyResponse> {
        let now = Utc::now();
        let orders = self.order_repo.list_pending()?;
        let alerts = self.alert_engine.penalty_alerts(&orders, now);
        Ok(PenaltyResponse {
            total_accrued_exposure: alerts.iter().map(|a| a.accrued_exposure).sum(),
            alerts,
            generated_at: now,
        })
    }

    /// 铁路/公路/联运运价比选
    pub fn freight_rates_compare(&self, request: &RouteRequest) -> ApiResult<FreightCompareResponse> {
        Self::validate_route_input(&request.origin, &request.destination, request.quantity_mt)?;
        Ok(FreightCompareResponse {
            comparison: self.route_comparator.compare_modes(
                &request.origin,
                &request.destination,
                request.quantity_mt,
            ),
        })
    }

    /// 按准则选路
    pub fn optimize_route(
        &self,
        request: &RouteOptimizeRequest,
    ) -> ApiResult<crate::api::dto::RouteOptimizeResponse> {
        Self::validate_route_input(&request.origin, &request.destination, request.quantity_mt)?;
        let comparison = self.route_comparator.compare_modes(
            &request.origin,
            &request.destination,
            request.quantity_mt,
        );
        let best = self.route_comparator.optimize_route(
            &request.origin,
            &request.destination,
            request.quantity_mt,
            request.criterion,
        );
        Ok(crate::api::dto::RouteOptimizeResponse {
            criterion: request.criterion,
            alternatives: comparison
                .options
                .into_iter()
                .filter(|o| o.mode != best.mode)
                .collect(),
            best,
        })
    }

    /// 碳排放分析
    pub fn co2_analysis(&self, request: &RouteRequest) -> ApiResult<Co2Response> {
        Self::validate_route_input(&request.origin, &request.destination, request.quantity_mt)?;
        Ok(Co2Response {
            analysis: self.route_comparator.co2_analysis(
                &request.origin,
                &request.destination,
                request.quantity_mt,
            ),
        })
    }

    /// 装车调度建议: 装车点负荷 + 计划中编组的补载建议
    pub fn loading_optimization(&self) -> ApiResult<LoadingOptimizationResponse> {
        let loading_points = self.loading_point_repo.list()?;
        let rakes = self.rake_repo.list_active()?;
        let optimizations = self
            .alert_engine
            .loading_point_optimization(&loading_points, &rakes);

        // 补载建议基于快照相容性判定
        let snapshot = PlanningSnapshot {
            orders: self.order_repo.list_pending()?,
            materials: self.material_repo.list()?,
            stockyards: self.stockyard_repo.list()?,
            inventory: self.stockyard_repo.list_inventory()?,
            wagons: self.wagon_repo.list()?,
            loading_points: loading_points.clone(),
            compatibility_rules: self.compatibility_repo.list()?,
        };
        let resolver =
            ConstraintResolver::new(snapshot.compatibility_rules.clone(), &self.config);

        let mut top_ups = Vec::new();
        for rake in rakes.iter().filter(|r| r.status == RakeStatus::Planned) {
            let mut wagons = Vec::with_capacity(rake.wagon_ids.len());
            for wagon_id in &rake.wagon_ids {
                if let Some(w) = self.wagon_repo.find_by_id(wagon_id)? {
                    wagons.push(w);
                }
            }
            let wagon_type = match wagons.first() {
                Some(w) => w.wagon_type.clone(),
                None => continue,
            };
            let orders = self.order_repo.find_by_ids(&rake.order_ids)?;
            let total_quantity: f64 = orders.iter().map(|o| o.quantity_mt).sum();
            let report = self.utilization_engine.analyze_rake(&wagons, total_quantity);
            if report.spare_capacity_mt <= 0.0 {
                continue;
            }
            // 目的地取 route 的 "起点 -> 目的地" 尾段
            let destination = rake
                .route
                .rsplit(" -> ")
                .next()
                .unwrap_or(&rake.route)
                .to_string();
            let suggestions = self.utilization_engine.suggest_top_ups(
                &snapshot,
                &resolver,
                &destination,
                &wagon_type,
                report.spare_capacity_mt,
            );
            if !suggestions.is_empty() {
                top_ups.push((rake.rake_number.clone(), suggestions));
            }
        }

        Ok(LoadingOptimizationResponse {
            loading_points: optimizations,
            top_up_suggestions: top_ups,
        })
    }
}
