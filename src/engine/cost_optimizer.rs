// ==========================================
// 铁路车皮编组优化系统 - 成本优化引擎
// ==========================================
// 职责: 逐单比选发运料场, 量化相对首选料场基线的节约额
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::OptimizerConfig;
use crate::domain::{CostBreakdown, Order, TransportMode};
use crate::engine::compatibility::ConstraintResolver;
use crate::engine::cost::{CostContext, CostModel};
use crate::engine::snapshot::PlanningSnapshot;

/// 单订单成本分析
#[derive(Debug, Clone, Serialize)]
pub struct CostAnalysis {
    pub order_id: String,
    pub customer_name: String,
    pub destination: String,
    pub quantity_mt: f64,
    /// 最优发运料场
    pub stockyard_id: String,
    pub stockyard_name: String,
    pub loading_point_id: String,
    pub wagon_type: String,
    /// 物流成本 (装车+运输+滞期+违约金)
    pub cost: CostBreakdown,
    /// 物料成本 (库存单价 x 量)
    pub material_cost: f64,
    /// 基线 (料场ID字典序首个可行料场) 的全口径成本
    pub baseline_cost: f64,
    /// 节约额 = 基线 - 最优
    pub cost_savings: f64,
    /// 装运效率分 [0,100]
    pub efficiency_score: f64,
}

/// 成本优化结果
#[derive(Debug, Clone, Serialize)]
pub struct CostOptimizationResult {
    pub analyses: Vec<CostAnalysis>,
    /// 无法分析的订单及原因
    pub skipped: Vec<(String, String)>,
    pub total_cost: f64,
    pub total_savings: f64,
    pub average_efficiency: f64,
    pub budget_met: bool,
    pub recommended_actions: Vec<String>,
}

/// 成本优化引擎: 订单级的料场比选, 不占用车皮不落库
pub struct CostOptimizer {
    config: OptimizerConfig,
    cost_model: CostModel,
}

impl CostOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        let cost_model = CostModel::new(config.clone());
        CostOptimizer { config, cost_model }
    }

    /// 逐单比选: 对每个订单在可行料场中选全口径成本最低者
    pub fn optimize(
        &self,
        order_ids: &[String],
        max_budget: Option<f64>,
        snapshot: &PlanningSnapshot,
        now: DateTime<Utc>,
    ) -> CostOptimizationResult {
        let resolver = ConstraintResolver::new(snapshot.compatibility_rules.clone(), &self.config);
        let mut orders: Vec<&Order> = snapshot
            .orders
            .iter()
            .filter(|o| order_ids.contains(&o.id))
            .collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));

        let mut analyses = Vec::new();
        let mut skipped = Vec::new();
        for order in orders {
            match self.analyze_order(order, snapshot, &resolver, now) {
                Ok(analysis) => analyses.push(analysis),
                Err(reason) => skipped.push((order.id.clone(), reason)),
            }
        }

        let total_cost: f64 = analyses.iter().map(|a| a.cost.total + a.material_cost).sum();
        let total_savings: f64 = analyses.iter().map(|a| a.cost_savings).sum();
        let average_efficiency = if analyses.is_empty() {
            0.0
        } else {
            analyses.iter().map(|a| a.efficiency_score).sum::<f64>() / analyses.len() as f64
        };
        let budget_met = max_budget.map_or(true, |b| total_cost <= b);

        let mut recommended_actions: Vec<String> = analyses
            .iter()
            .filter(|a| a.cost_savings > 0.0)
            .map(|a| {
                format!(
                    "订单 {} ({}) 改由 {} 发运, 预计节约 {:.0} 元",
                    a.order_id, a.customer_name, a.stockyard_name, a.cost_savings
                )
            })
            .collect();
        if !budget_met {
            if let Some(budget) = max_budget {
                recommended_actions.push(format!(
                    "全口径成本 {:.0} 元超出预算 {:.0} 元, 建议分批发运或下调发运量",
                    total_cost, budget
                ));
            }
        }

        info!(
            analyzed = analyses.len(),
            skipped = skipped.len(),
            total_cost = total_cost,
            total_savings = total_savings,
            "成本优化完成"
        );

        CostOptimizationResult {
            analyses,
            skipped,
            total_cost,
            total_savings,
            average_efficiency,
            budget_met,
            recommended_actions,
        }
    }

    /// 单订单的料场比选
    fn analyze_order(
        &self,
        order: &Order,
        snapshot: &PlanningSnapshot,
        resolver: &ConstraintResolver,
        now: DateTime<Utc>,
    ) -> Result<CostAnalysis, String> {
        let material = snapshot
            .material(&order.material_id)
            .ok_or_else(|| format!("物料 {} 未登记", order.material_id))?;

        let mut wagon_types: Vec<String> = snapshot
            .wagons
            .iter()
            .map(|w| w.wagon_type.clone())
            .collect();
        wagon_types.sort();
        wagon_types.dedup();
        let feasible = resolver.feasible_wagon_types(
            &material.material_type,
            &wagon_types,
            &order.destination,
        );
        let (wagon_type, loading_efficiency) = feasible
            .first()
            .cloned()
            .ok_or_else(|| format!("物料类型 {} 无可行车皮类型", material.material_type))?;
        let wagon_capacity = snapshot
            .wagons
            .iter()
            .filter(|w| w.wagon_type == wagon_type)
            .map(|w| w.capacity_mt)
            .fold(0.0_f64, f64::max)
            .max(1.0);
        let wagon_count = (order.quantity_mt / wagon_capacity).ceil().max(1.0) as usize;
        let wagon_utilization = order.quantity_mt / (wagon_count as f64 * wagon_capacity);

        // 库存充足的候选料场, ID 升序保证基线确定
        struct YardOption {
            stockyard_id: String,
            stockyard_name: String,
            loading_point_id: String,
            cost: CostBreakdown,
            material_cost: f64,
        }
        let mut options: Vec<YardOption> = Vec::new();
        for inv in snapshot.inventory_by_material(&order.material_id) {
            if inv.quantity_mt < order.quantity_mt {
                continue;
            }
            let stockyard = match snapshot.stockyard(&inv.stockyard_id) {
                Some(s) => s,
                None => continue,
            };
            let lp = match snapshot.loading_points_of(&stockyard.id).first() {
                Some(lp) => (*lp).clone(),
                None => continue,
            };
            let distance = self.config.distance_km(&stockyard.location, &order.destination);
            let cost = self.cost_model.estimate(&CostContext {
                quantity_mt: order.quantity_mt,
                distance_km: distance,
                mode: TransportMode::Rail,
                loading_point_utilization: lp.current_utilization,
                wagon_count,
                order_deadlines: vec![(order.days_until_deadline(now), order.penalty_per_day)],
            });
            options.push(YardOption {
                stockyard_id: stockyard.id.clone(),
                stockyard_name: stockyard.name.clone(),
                loading_point_id: lp.id.clone(),
                material_cost: order.quantity_mt * inv.cost_per_unit,
                cost,
            });
        }
        if options.is_empty() {
            return Err(format!(
                "无库存充足且配有装车点的料场 (需 {:.0} 吨)",
                order.quantity_mt
            ));
        }

        // 基线 = 候选首个料场; 最优 = 全口径成本最低
        let baseline_cost = options[0].cost.total + options[0].material_cost;
        let best_idx = options
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let ta = a.cost.total + a.material_cost;
                let tb = b.cost.total + b.material_cost;
                ta.partial_cmp(&tb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.stockyard_id.cmp(&b.stockyard_id))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let best = options.swap_remove(best_idx);
        let best_total = best.cost.total + best.material_cost;

        Ok(CostAnalysis {
            order_id: order.id.clone(),
            customer_name: order.customer_name.clone(),
            destination: order.destination.clone(),
            quantity_mt: order.quantity_mt,
            stockyard_id: best.stockyard_id,
            stockyard_name: best.stockyard_name,
            loading_point_id: best.loading_point_id,
            wagon_type,
            material_cost: best.material_cost,
            baseline_cost,
            cost_savings: (baseline_cost - best_total).max(0.0),
            efficiency_score: self
                .cost_model
                .efficiency_score(loading_efficiency, wagon_utilization),
            cost: best.cost,
        })
    }
}
