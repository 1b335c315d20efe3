// ==========================================
// 铁路车皮编组优化系统 - 编组优化引擎
// ==========================================
// 职责: 将待处理订单合并为成本最低的编组方案
// 红线: 同一快照同一请求必须输出同一方案 (确定性);
//       无法满足的订单在结果内如实上报, 禁止静默丢弃
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::OptimizerConfig;
use crate::domain::{CostBreakdown, LoadingPoint, Material, Order, TransportMode, Wagon};
use crate::engine::compatibility::ConstraintResolver;
use crate::engine::cost::{CostContext, CostModel};
use crate::engine::reasoning::{BoundedReasoning, ReasoningContext, TemplateReasoningProvider};
use crate::engine::snapshot::PlanningSnapshot;

/// 编组优化请求
#[derive(Debug, Clone)]
pub struct FormationRequest {
    /// 参与规划的订单 ID (须为待处理状态)
    pub order_ids: Vec<String>,
    /// 优先级权重 w, 截断到 [0,1]: 评分 = (1-w)*总成本 + w*违约金风险
    pub priority_weight: f64,
    /// 预算上限 (可选), 超出仅置标志不报错
    pub max_budget: Option<f64>,
    /// 编组编号起始序号 (由仓储现有编组数推出)
    pub first_rake_seq: usize,
    /// 规划基准时间
    pub now: DateTime<Utc>,
}

/// 订单无法满足的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnfulfilledReason {
    /// 物料未登记
    UnknownMaterial,
    /// 无可行车皮类型 (相容性规则判不可行)
    NoFeasibleWagonType,
    /// 所有料场库存不足
    InsufficientInventory,
    /// 可用车皮运力不足
    InsufficientWagonCapacity,
    /// 候选料场无装车点
    NoLoadingPoint,
    /// 并发抢占失败 (落库阶段产生)
    ClaimConflict,
}

/// 无法满足的订单上报项
#[derive(Debug, Clone, Serialize)]
pub struct UnfulfilledOrder {
    pub order_id: String,
    pub customer_name: String,
    pub quantity_mt: f64,
    pub destination: String,
    pub reason: UnfulfilledReason,
    pub detail: String,
}

/// 单列编组建议
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedRake {
    pub rake_number: String,
    pub stockyard_id: String,
    pub stockyard_name: String,
    pub loading_point_id: String,
    /// 目的地 (即线路)
    pub route: String,
    pub order_ids: Vec<String>,
    pub wagon_ids: Vec<String>,
    pub wagon_count: usize,
    pub total_quantity_mt: f64,
    pub total_capacity_mt: f64,
    /// 车皮利用率 (%)
    pub utilization_pct: f64,
    pub cost: CostBreakdown,
    /// 装运效率分 [0,100]
    pub efficiency_score: f64,
    pub reasoning: String,
}

/// 编组优化结果
#[derive(Debug, Clone, Serialize)]
pub struct FormationResult {
    pub recommended_rakes: Vec<RecommendedRake>,
    pub unfulfilled: Vec<UnfulfilledOrder>,
    pub total_cost: f64,
    /// 相对逐单独立发运基线的节约额
    pub potential_savings: f64,
    /// 预算达成标志 (未设预算时为 true)
    pub budget_met: bool,
    pub explanation: String,
}

/// 编组中间结构: 目的地 + 固定料场/装车点/车皮类型的装载箱
struct RakeBin<'a> {
    stockyard_id: String,
    stockyard_name: String,
    stockyard_location: String,
    loading_point: &'a LoadingPoint,
    destination: String,
    wagon_type: String,
    orders: Vec<&'a Order>,
    wagons: Vec<&'a Wagon>,
    total_quantity_mt: f64,
    total_capacity_mt: f64,
    constraint_notes: Vec<String>,
}

/// 编组优化引擎
///
/// 贪心策略: 订单按 (优先级, 交期, 量降序, ID) 排序后依次装箱;
/// 同目的地、车皮类型相容且库存同源的订单合并为一列编组,
/// 新开编组时在 (料场 x 车皮类型) 组合中按加权评分择优
pub struct RakeFormationOptimizer {
    config: OptimizerConfig,
    cost_model: CostModel,
    reasoning: BoundedReasoning,
}

impl RakeFormationOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        let reasoning = BoundedReasoning::new(
            Arc::new(TemplateReasoningProvider::new()),
            config.reasoning_timeout_ms,
        );
        Self::with_reasoning(config, reasoning)
    }

    pub fn with_reasoning(config: OptimizerConfig, reasoning: BoundedReasoning) -> Self {
        let cost_model = CostModel::new(config.clone());
        RakeFormationOptimizer {
            config,
            cost_model,
            reasoning,
        }
    }

    /// 编组优化主入口
    pub fn optimize(
        &self,
        request: &FormationRequest,
        snapshot: &PlanningSnapshot,
    ) -> FormationResult {
        let weight = request.priority_weight.clamp(0.0, 1.0);
        let resolver = ConstraintResolver::new(snapshot.compatibility_rules.clone(), &self.config);

        // 参与规划的订单, 确定性排序
        let mut orders: Vec<&Order> = snapshot
            .orders
            .iter()
            .filter(|o| request.order_ids.contains(&o.id))
            .collect();
        orders.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.deadline.cmp(&b.deadline))
                .then_with(|| {
                    b.quantity_mt
                        .partial_cmp(&a.quantity_mt)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        });

        // 可用车皮池按类型分组
        let mut wagon_pool: HashMap<String, Vec<&Wagon>> = HashMap::new();
        for wagon in snapshot.available_wagons() {
            wagon_pool
                .entry(wagon.wagon_type.clone())
                .or_default()
                .push(wagon);
        }
        let mut all_wagon_types: Vec<String> = wagon_pool.keys().cloned().collect();
        all_wagon_types.sort();

        // 库存剩余量按 (料场, 物料) 跟踪, 防止超配
        let mut inventory_left: HashMap<(String, String), f64> = snapshot
            .inventory
            .iter()
            .map(|inv| {
                (
                    (inv.stockyard_id.clone(), inv.material_id.clone()),
                    inv.quantity_mt,
                )
            })
            .collect();

        let mut bins: Vec<RakeBin<'_>> = Vec::new();
        let mut unfulfilled: Vec<UnfulfilledOrder> = Vec::new();

        for &order in &orders {
            match self.place_order(
                order,
                snapshot,
                &resolver,
                &all_wagon_types,
                &mut wagon_pool,
                &mut inventory_left,
                &mut bins,
                weight,
                request.now,
            ) {
                Ok(()) => {}
                Err(item) => {
                    debug!(order_id = %item.order_id, reason = ?item.reason, "订单无法编入编组");
                    unfulfilled.push(item);
                }
            }
        }

        // 装箱完成, 逐箱终算并生成建议
        let mut recommended = Vec::new();
        for (idx, bin) in bins.iter().enumerate() {
            let rake_number = format!("RAKE-{:03}", request.first_rake_seq + idx);
            recommended.push(self.finalize_bin(bin, &rake_number, snapshot, &resolver, request.now));
        }

        let total_cost: f64 = recommended.iter().map(|r| r.cost.total).sum();
        let baseline = self.naive_baseline(&recommended, snapshot, request.now);
        let potential_savings = (baseline - total_cost).max(0.0);
        let budget_met = request.max_budget.map_or(true, |b| total_cost <= b);

        let fulfilled_count: usize = recommended.iter().map(|r| r.order_ids.len()).sum();
        let mut explanation = format!(
            "本次规划处理 {} 个订单: 组成 {} 列编组覆盖 {} 单, {} 单无法满足; \
             预计总成本 {:.0} 元, 较逐单独立发运节约 {:.0} 元",
            orders.len(),
            recommended.len(),
            fulfilled_count,
            unfulfilled.len(),
            total_cost,
            potential_savings,
        );
        if let Some(budget) = request.max_budget {
            if budget_met {
                explanation.push_str(&format!("; 满足预算上限 {:.0} 元", budget));
            } else {
                explanation.push_str(&format!(
                    "; 超出预算上限 {:.0} 元 (超出 {:.0} 元), 此方案已是当前约束下的最低成本",
                    budget,
                    total_cost - budget
                ));
            }
        }

        info!(
            rakes = recommended.len(),
            fulfilled = fulfilled_count,
            unfulfilled_count = unfulfilled.len(),
            total_cost = total_cost,
            "编组优化完成"
        );

        FormationResult {
            recommended_rakes: recommended,
            unfulfilled,
            total_cost,
            potential_savings,
            budget_met,
            explanation,
        }
    }

    /// 将单个订单并入已有编组或新开编组
    #[allow(clippy::too_many_arguments)]
    fn place_order<'a>(
        &self,
        order: &'a Order,
        snapshot: &'a PlanningSnapshot,
        resolver: &ConstraintResolver,
        all_wagon_types: &[String],
        wagon_pool: &mut HashMap<String, Vec<&'a Wagon>>,
        inventory_left: &mut HashMap<(String, String), f64>,
        bins: &mut Vec<RakeBin<'a>>,
        weight: f64,
        now: DateTime<Utc>,
    ) -> Result<(), UnfulfilledOrder> {
        let material = snapshot.material(&order.material_id).ok_or_else(|| {
            unfulfilled_item(
                order,
                UnfulfilledReason::UnknownMaterial,
                format!("物料 {} 未登记", order.material_id),
            )
        })?;

        // 尝试并入已有编组 (同目的地、车皮类型相容、同料场库存充足)
        for bin in bins.iter_mut() {
            if bin.destination != order.destination {
                continue;
            }
            if !resolver
                .resolve(&material.material_type, &bin.wagon_type, &order.destination)
                .feasible
            {
                continue;
            }
            let inv_key = (bin.stockyard_id.clone(), order.material_id.clone());
            let left = inventory_left.get(&inv_key).copied().unwrap_or(0.0);
            if left < order.quantity_mt {
                continue;
            }

            // 容量不足时补足车皮, 补不上则不并入此箱
            let shortfall = bin.total_quantity_mt + order.quantity_mt - bin.total_capacity_mt;
            let pool = wagon_pool.entry(bin.wagon_type.clone()).or_default();
            let extra = if shortfall > 0.0 {
                match select_wagons(pool, &bin.stockyard_location, shortfall) {
                    Some(indices) => indices,
                    None => continue,
                }
            } else {
                Vec::new()
            };

            for &i in extra.iter().rev() {
                let wagon = pool.remove(i);
                bin.total_capacity_mt += wagon.capacity_mt;
                bin.wagons.push(wagon);
            }
            bin.orders.push(order);
            bin.total_quantity_mt += order.quantity_mt;
            *inventory_left.entry(inv_key).or_insert(0.0) -= order.quantity_mt;
            return Ok(());
        }

        self.open_bin(
            order,
            material,
            snapshot,
            resolver,
            all_wagon_types,
            wagon_pool,
            inventory_left,
            bins,
            weight,
            now,
        )
    }

    /// 为订单新开编组, 在所有可行 (料场 x 车皮类型) 组合中按评分择优
    ///
    /// 评分 = (1-w)*总成本 + w*违约金风险; 同分按 (料场ID, 车皮类型) 字典序取小
    #[allow(clippy::too_many_arguments)]
    fn open_bin<'a>(
        &self,
        order: &'a Order,
        material: &Material,
        snapshot: &'a PlanningSnapshot,
        resolver: &ConstraintResolver,
        all_wagon_types: &[String],
        wagon_pool: &mut HashMap<String, Vec<&'a Wagon>>,
        inventory_left: &mut HashMap<(String, String), f64>,
        bins: &mut Vec<RakeBin<'a>>,
        weight: f64,
        now: DateTime<Utc>,
    ) -> Result<(), UnfulfilledOrder> {
        let feasible_types = resolver.feasible_wagon_types(
            &material.material_type,
            all_wagon_types,
            &order.destination,
        );
        if feasible_types.is_empty() {
            return Err(unfulfilled_item(
                order,
                UnfulfilledReason::NoFeasibleWagonType,
                format!(
                    "物料类型 {} 发往 {} 无可行车皮类型",
                    material.material_type, order.destination
                ),
            ));
        }

        // 剩余库存充足的候选料场
        let candidate_yards: Vec<String> = snapshot
            .inventory_by_material(&order.material_id)
            .into_iter()
            .filter(|inv| {
                let key = (inv.stockyard_id.clone(), inv.material_id.clone());
                inventory_left.get(&key).copied().unwrap_or(0.0) >= order.quantity_mt
            })
            .map(|inv| inv.stockyard_id.clone())
            .collect();
        if candidate_yards.is_empty() {
            return Err(unfulfilled_item(
                order,
                UnfulfilledReason::InsufficientInventory,
                format!(
                    "所有料场对物料 {} 的剩余库存均不足 {:.0} 吨",
                    material.name, order.quantity_mt
                ),
            ));
        }

        struct Candidate<'a> {
            stockyard_id: String,
            stockyard_name: String,
            stockyard_location: String,
            loading_point: &'a LoadingPoint,
            wagon_type: String,
            wagon_indices: Vec<usize>,
            score: f64,
        }
        let mut best: Option<Candidate<'a>> = None;
        let mut notes: Vec<String> = Vec::new();
        let mut saw_loading_point = false;

        for stockyard_id in &candidate_yards {
            let stockyard = match snapshot.stockyard(stockyard_id) {
                Some(s) => s,
                None => continue,
            };
            let lp = match snapshot.loading_points_of(&stockyard.id).first() {
                Some(lp) => *lp,
                None => {
                    notes.push(format!("排除 {}: 无装车点", stockyard.name));
                    continue;
                }
            };
            saw_loading_point = true;
            let distance = self.config.distance_km(&stockyard.location, &order.destination);

            for (wagon_type, _eff) in &feasible_types {
                let pool = wagon_pool.entry(wagon_type.clone()).or_default();
                let indices = match select_wagons(pool, &stockyard.location, order.quantity_mt) {
                    Some(indices) => indices,
                    None => {
                        notes.push(format!(
                            "排除 {} x {}: 可用车皮运力不足",
                            stockyard.name, wagon_type
                        ));
                        continue;
                    }
                };
                let cost = self.cost_model.estimate(&CostContext {
                    quantity_mt: order.quantity_mt,
                    distance_km: distance,
                    mode: TransportMode::Rail,
                    loading_point_utilization: lp.current_utilization,
                    wagon_count: indices.len(),
                    order_deadlines: vec![(order.days_until_deadline(now), order.penalty_per_day)],
                });
                let score = (1.0 - weight) * cost.total + weight * cost.penalty;

                let better = match &best {
                    None => true,
                    Some(b) => {
                        score < b.score
                            || (score == b.score
                                && (stockyard.id.as_str(), wagon_type.as_str())
                                    < (b.stockyard_id.as_str(), b.wagon_type.as_str()))
                    }
                };
                if better {
                    if let Some(prev) = best.take() {
                        notes.push(format!(
                            "排除 {} x {}: 评分更高",
                            prev.stockyard_name, prev.wagon_type
                        ));
                    }
                    best = Some(Candidate {
                        stockyard_id: stockyard.id.clone(),
                        stockyard_name: stockyard.name.clone(),
                        stockyard_location: stockyard.location.clone(),
                        loading_point: lp,
                        wagon_type: wagon_type.clone(),
                        wagon_indices: indices,
                        score,
                    });
                } else {
                    notes.push(format!("排除 {} x {}: 评分更高", stockyard.name, wagon_type));
                }
            }
        }

        let chosen = match best {
            Some(c) => c,
            None => {
                let (reason, detail) = if saw_loading_point {
                    (
                        UnfulfilledReason::InsufficientWagonCapacity,
                        format!("可用车皮无法覆盖 {:.0} 吨发运量", order.quantity_mt),
                    )
                } else {
                    (
                        UnfulfilledReason::NoLoadingPoint,
                        "候选料场均无装车点".to_string(),
                    )
                };
                return Err(unfulfilled_item(order, reason, detail));
            }
        };
        debug!(
            order_id = %order.id,
            stockyard = %chosen.stockyard_name,
            wagon_type = %chosen.wagon_type,
            score = chosen.score,
            "新开编组"
        );

        // 提交: 从池中移除车皮、扣减库存、建箱
        let pool = wagon_pool.entry(chosen.wagon_type.clone()).or_default();
        let mut wagons = Vec::new();
        let mut capacity = 0.0;
        for &i in chosen.wagon_indices.iter().rev() {
            let wagon = pool.remove(i);
            capacity += wagon.capacity_mt;
            wagons.push(wagon);
        }
        wagons.reverse();
        let inv_key = (chosen.stockyard_id.clone(), order.material_id.clone());
        *inventory_left.entry(inv_key).or_insert(0.0) -= order.quantity_mt;

        bins.push(RakeBin {
            stockyard_id: chosen.stockyard_id,
            stockyard_name: chosen.stockyard_name,
            stockyard_location: chosen.stockyard_location,
            loading_point: chosen.loading_point,
            destination: order.destination.clone(),
            wagon_type: chosen.wagon_type,
            orders: vec![order],
            wagons,
            total_quantity_mt: order.quantity_mt,
            total_capacity_mt: capacity,
            constraint_notes: notes,
        });
        Ok(())
    }

    /// 逐箱终算: 成本、利用率、效率分与编组理由
    fn finalize_bin(
        &self,
        bin: &RakeBin<'_>,
        rake_number: &str,
        snapshot: &PlanningSnapshot,
        resolver: &ConstraintResolver,
        now: DateTime<Utc>,
    ) -> RecommendedRake {
        let distance = self
            .config
            .distance_km(&bin.stockyard_location, &bin.destination);
        let order_deadlines: Vec<(i64, f64)> = bin
            .orders
            .iter()
            .map(|o| (o.days_until_deadline(now), o.penalty_per_day))
            .collect();
        let cost = self.cost_model.estimate(&CostContext {
            quantity_mt: bin.total_quantity_mt,
            distance_km: distance,
            mode: TransportMode::Rail,
            loading_point_utilization: bin.loading_point.current_utilization,
            wagon_count: bin.wagons.len(),
            order_deadlines,
        });

        let utilization = if bin.total_capacity_mt > 0.0 {
            bin.total_quantity_mt / bin.total_capacity_mt
        } else {
            0.0
        };

        // 装车效率按发运量加权平均
        let mut weighted_eff = 0.0;
        let mut total_q = 0.0;
        for order in &bin.orders {
            let eff = snapshot
                .material(&order.material_id)
                .map(|m| {
                    resolver
                        .resolve(&m.material_type, &bin.wagon_type, &bin.destination)
                        .loading_efficiency
                })
                .unwrap_or(0.0);
            weighted_eff += eff * order.quantity_mt;
            total_q += order.quantity_mt;
        }
        let loading_efficiency = if total_q > 0.0 {
            weighted_eff / total_q
        } else {
            0.0
        };
        let efficiency_score = self
            .cost_model
            .efficiency_score(loading_efficiency, utilization);

        let ctx = ReasoningContext {
            rake_number: rake_number.to_string(),
            route: bin.destination.clone(),
            stockyard_name: bin.stockyard_name.clone(),
            loading_point_name: bin.loading_point.name.clone(),
            order_count: bin.orders.len(),
            wagon_count: bin.wagons.len(),
            total_quantity_mt: bin.total_quantity_mt,
            utilization_pct: utilization * 100.0,
            total_cost: cost.total,
            dominant_cost: cost.dominant_component().to_string(),
            constraint_notes: bin.constraint_notes.clone(),
        };
        let reasoning = self.reasoning.explain(&ctx);

        RecommendedRake {
            rake_number: rake_number.to_string(),
            stockyard_id: bin.stockyard_id.clone(),
            stockyard_name: bin.stockyard_name.clone(),
            loading_point_id: bin.loading_point.id.clone(),
            route: bin.destination.clone(),
            order_ids: bin.orders.iter().map(|o| o.id.clone()).collect(),
            wagon_ids: bin.wagons.iter().map(|w| w.id.clone()).collect(),
            wagon_count: bin.wagons.len(),
            total_quantity_mt: bin.total_quantity_mt,
            total_capacity_mt: bin.total_capacity_mt,
            utilization_pct: utilization * 100.0,
            cost,
            efficiency_score,
            reasoning,
        }
    }

    /// 逐单独立发运基线: 每单单独成列、单独排队, 用于节约额核算
    fn naive_baseline(
        &self,
        recommended: &[RecommendedRake],
        snapshot: &PlanningSnapshot,
        now: DateTime<Utc>,
    ) -> f64 {
        let mut baseline = 0.0;
        for rake in recommended {
            let origin = snapshot
                .stockyard(&rake.stockyard_id)
                .map(|s| s.location.clone())
                .unwrap_or_default();
            let lp_util = snapshot
                .loading_point(&rake.loading_point_id)
                .map(|lp| lp.current_utilization)
                .unwrap_or(0.5);
            let avg_capacity = if rake.wagon_count > 0 {
                rake.total_capacity_mt / rake.wagon_count as f64
            } else {
                60.0
            };
            for order_id in &rake.order_ids {
                let order = match snapshot.orders.iter().find(|o| &o.id == order_id) {
                    Some(o) => o,
                    None => continue,
                };
                let distance = self.config.distance_km(&origin, &order.destination);
                let wagon_count = (order.quantity_mt / avg_capacity).ceil().max(1.0) as usize;
                let cost = self.cost_model.estimate(&CostContext {
                    quantity_mt: order.quantity_mt,
                    distance_km: distance,
                    mode: TransportMode::Rail,
                    loading_point_utilization: lp_util,
                    wagon_count,
                    order_deadlines: vec![(order.days_until_deadline(now), order.penalty_per_day)],
                });
                baseline += cost.total;
            }
        }
        baseline
    }
}

fn unfulfilled_item(order: &Order, reason: UnfulfilledReason, detail: String) -> UnfulfilledOrder {
    UnfulfilledOrder {
        order_id: order.id.clone(),
        customer_name: order.customer_name.clone(),
        quantity_mt: order.quantity_mt,
        destination: order.destination.clone(),
        reason,
        detail,
    }
}

/// 从车皮池中选取覆盖 needed_mt 的最少车皮
///
/// 排序: 就位车皮优先, 其次载重降序, 最后车号升序; 返回池内下标升序
fn select_wagons(pool: &[&Wagon], location: &str, needed_mt: f64) -> Option<Vec<usize>> {
    let mut indices: Vec<usize> = (0..pool.len()).collect();
    indices.sort_by(|&a, &b| {
        let at_a = pool[a].current_location.as_deref() == Some(location);
        let at_b = pool[b].current_location.as_deref() == Some(location);
        at_b.cmp(&at_a)
            .then_with(|| {
                pool[b]
                    .capacity_mt
                    .partial_cmp(&pool[a].capacity_mt)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| pool[a].wagon_number.cmp(&pool[b].wagon_number))
    });

    let mut chosen = Vec::new();
    let mut capacity = 0.0;
    for i in indices {
        chosen.push(i);
        capacity += pool[i].capacity_mt;
        if capacity >= needed_mt {
            chosen.sort_unstable();
            return Some(chosen);
        }
    }
    None
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompatibilityRule, Inventory, OrderPriority, Stockyard};
    use chrono::Duration;

    fn sample_snapshot() -> PlanningSnapshot {
        let now = Utc::now();
        let material = Material::new("Coal".to_string(), "Bulk".to_string(), "MT".to_string());
        let stockyard = Stockyard::new(
            "Plant North Yard".to_string(),
            "Plant North".to_string(),
            50_000.0,
        );
        let inventory = Inventory::new(stockyard.id.clone(), material.id.clone(), 10_000.0, 3_000.0);
        let lp = LoadingPoint::new("LP-North-1".to_string(), stockyard.id.clone(), 3.0, 0.2);

        let orders = vec![
            order(&material.id, "客户A", 500.0, "Delhi", OrderPriority::High, now + Duration::days(7)),
            order(&material.id, "客户B", 800.0, "Delhi", OrderPriority::Medium, now + Duration::days(10)),
            order(&material.id, "客户C", 300.0, "Delhi", OrderPriority::Low, now + Duration::days(14)),
        ];
        let wagons: Vec<Wagon> = (1..=30)
            .map(|i| {
                Wagon::new(
                    format!("BOXN-{:03}", i),
                    "BOXN".to_string(),
                    60.0,
                    Some("Plant North".to_string()),
                )
            })
            .collect();
        let rule = CompatibilityRule::new(
            "Bulk".to_string(),
            "BOXN".to_string(),
            0.95,
            0.90,
            vec![],
        )
        .unwrap();

        PlanningSnapshot {
            orders,
            materials: vec![material],
            stockyards: vec![stockyard],
            inventory: vec![inventory],
            wagons,
            loading_points: vec![lp],
            compatibility_rules: vec![rule],
        }
    }

    fn order(
        material_id: &str,
        customer: &str,
        quantity: f64,
        destination: &str,
        priority: OrderPriority,
        deadline: DateTime<Utc>,
    ) -> Order {
        Order::new(
            customer.to_string(),
            material_id.to_string(),
            quantity,
            destination.to_string(),
            priority,
            deadline,
            5_000.0,
        )
        .unwrap()
    }

    fn request(snapshot: &PlanningSnapshot) -> FormationRequest {
        FormationRequest {
            order_ids: snapshot.orders.iter().map(|o| o.id.clone()).collect(),
            priority_weight: 0.3,
            max_budget: None,
            first_rake_seq: 1,
            now: Utc::now(),
        }
    }

    // 测试1: 同目的地订单合并为一列编组, 全部满足
    #[test]
    fn test_coload_same_destination_into_one_rake() {
        let snapshot = sample_snapshot();
        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let result = optimizer.optimize(&request(&snapshot), &snapshot);

        assert_eq!(result.recommended_rakes.len(), 1);
        assert!(result.unfulfilled.is_empty());
        let rake = &result.recommended_rakes[0];
        assert_eq!(rake.order_ids.len(), 3);
        assert!((rake.total_quantity_mt - 1600.0).abs() < 1e-9);
        // 27 节 60 吨车皮 = 1620 吨容量, 利用率 ~98.8%
        assert_eq!(rake.wagon_count, 27);
        assert!(rake.utilization_pct > 95.0);
        assert!(rake.total_quantity_mt <= rake.total_capacity_mt);
        assert!(!rake.reasoning.is_empty());
        assert!(result.budget_met);
    }

    // 测试2: 确定性 - 同一快照两次优化输出一致
    #[test]
    fn test_optimize_deterministic() {
        let snapshot = sample_snapshot();
        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let req = request(&snapshot);
        let a = optimizer.optimize(&req, &snapshot);
        let b = optimizer.optimize(&req, &snapshot);

        assert_eq!(a.total_cost, b.total_cost);
        assert_eq!(a.recommended_rakes.len(), b.recommended_rakes.len());
        for (ra, rb) in a.recommended_rakes.iter().zip(b.recommended_rakes.iter()) {
            assert_eq!(ra.wagon_ids, rb.wagon_ids);
            assert_eq!(ra.order_ids, rb.order_ids);
        }
    }

    // 测试3: 车皮运力不足 -> 订单如实上报, 不报错
    #[test]
    fn test_insufficient_wagons_reported_in_band() {
        let mut snapshot = sample_snapshot();
        snapshot.wagons.truncate(5); // 仅 300 吨运力
        let now = Utc::now();
        snapshot.orders = vec![order(
            &snapshot.materials[0].id,
            "客户D",
            1200.0,
            "Delhi",
            OrderPriority::High,
            now + chrono::Duration::days(7),
        )];

        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let result = optimizer.optimize(&request(&snapshot), &snapshot);

        assert!(result.recommended_rakes.is_empty());
        assert_eq!(result.unfulfilled.len(), 1);
        assert_eq!(
            result.unfulfilled[0].reason,
            UnfulfilledReason::InsufficientWagonCapacity
        );
    }

    // 测试4: 库存不足 -> 上报 INSUFFICIENT_INVENTORY
    #[test]
    fn test_insufficient_inventory_reported() {
        let mut snapshot = sample_snapshot();
        snapshot.inventory[0].quantity_mt = 100.0;

        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let result = optimizer.optimize(&request(&snapshot), &snapshot);

        assert!(result.recommended_rakes.is_empty());
        assert_eq!(result.unfulfilled.len(), 3);
        assert!(result
            .unfulfilled
            .iter()
            .all(|u| u.reason == UnfulfilledReason::InsufficientInventory));
    }

    // 测试5: 无相容规则 -> fail-closed 上报 NO_FEASIBLE_WAGON_TYPE
    #[test]
    fn test_no_rule_fails_closed() {
        let mut snapshot = sample_snapshot();
        snapshot.compatibility_rules.clear();

        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let result = optimizer.optimize(&request(&snapshot), &snapshot);

        assert!(result.recommended_rakes.is_empty());
        assert!(result
            .unfulfilled
            .iter()
            .all(|u| u.reason == UnfulfilledReason::NoFeasibleWagonType));
    }

    // 测试6: 预算上限不足 -> budget_met=false 但方案照常返回
    #[test]
    fn test_budget_flag_not_error() {
        let snapshot = sample_snapshot();
        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let mut req = request(&snapshot);
        req.max_budget = Some(1.0);
        let result = optimizer.optimize(&req, &snapshot);

        assert!(!result.budget_met);
        assert_eq!(result.recommended_rakes.len(), 1);
        assert!(result.explanation.contains("超出预算上限"));
    }

    // 测试7: 库存扣减跨编组生效, 不超配
    #[test]
    fn test_inventory_not_overallocated() {
        let mut snapshot = sample_snapshot();
        snapshot.inventory[0].quantity_mt = 1000.0; // 仅够前两单中的一部分

        let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
        let result = optimizer.optimize(&request(&snapshot), &snapshot);

        let fulfilled_mt: f64 = result
            .recommended_rakes
            .iter()
            .map(|r| r.total_quantity_mt)
            .sum();
        assert!(fulfilled_mt <= 1000.0);
        assert!(!result.unfulfilled.is_empty());
    }
}
