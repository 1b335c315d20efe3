// ==========================================
// 铁路车皮编组优化系统 - 编组优化 API
// ==========================================
// 职责: 规划请求校验、快照装配、方案落库时的并发认领
// 红线: 落库必须逐项 CAS 认领; 任一认领失败立即回滚该列编组
//       (释放订单/车皮并回补已扣库存), 重算至多一次且沿用原预算上限,
//       二次冲突如实上报为未满足
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::api::dto::{
    ApplyFormationResponse, CostOptimizationRequest, ImplementCostOptimizationResponse,
    OptimizeRakeRequest, OptimizeRakeResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::config::OptimizerConfig;
use crate::domain::{Order, OrderStatus, RakePlan, RakeStatus};
use crate::engine::{
    CostOptimizationResult, CostOptimizer, FormationRequest, FormationResult, PlanningSnapshot,
    RakeFormationOptimizer, RecommendedRake, UnfulfilledOrder, UnfulfilledReason,
};
use crate::repository::{
    CompatibilityRuleRepository, LoadingPointRepository, MaterialRepository, OrderRepository,
    RakeRepository, StockyardRepository, WagonRepository,
};

/// 编组优化 API
pub struct OptimizationApi {
    order_repo: Arc<OrderRepository>,
    wagon_repo: Arc<WagonRepository>,
    stockyard_repo: Arc<StockyardRepository>,
    material_repo: Arc<MaterialRepository>,
    loading_point_repo: Arc<LoadingPointRepository>,
    compatibility_repo: Arc<CompatibilityRuleRepository>,
    rake_repo: Arc<RakeRepository>,
    optimizer: RakeFormationOptimizer,
    cost_optimizer: CostOptimizer,
}

impl OptimizationApi {
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
        OptimizationApi {
            order_repo,
            wagon_repo,
            stockyard_repo,
            material_repo,
            loading_point_repo,
            compatibility_repo,
            rake_repo,
            optimizer: RakeFormationOptimizer::new(config.clone()),
            cost_optimizer: CostOptimizer::new(config),
        }
    }

    /// 装配规划快照 (一次性读取, 引擎只读)
    fn load_snapshot(&self) -> ApiResult<PlanningSnapshot> {
        Ok(PlanningSnapshot {
            orders: self.order_repo.list()?,
            materials: self.material_repo.list()?,
            stockyards: self.stockyard_repo.list()?,
            inventory: self.stockyard_repo.list_inventory()?,
            wagons: self.wagon_repo.list()?,
            loading_points: self.loading_point_repo.list()?,
            compatibility_rules: self.compatibility_repo.list()?,
        })
    }

    /// 解析并校验参与规划的订单: 为空取全部待处理, 非空逐一校验存在且待处理
    fn resolve_order_ids(&self, requested: &[String]) -> ApiResult<Vec<String>> {
        if requested.is_empty() {
            let pending = self.order_repo.list_pending()?;
            if pending.is_empty() {
                return Err(ApiError::InvalidRequest("当前没有待处理订单".to_string()));
            }
            return Ok(pending.into_iter().map(|o| o.id).collect());
        }
        let orders = self.order_repo.find_by_ids(requested)?;
        for order in &orders {
            if order.status != OrderStatus::Pending {
                return Err(ApiError::BusinessRule(format!(
                    "订单 {} 状态为 {}, 仅待处理订单可参与编组",
                    order.id, order.status
                )));
            }
        }
        Ok(orders.into_iter().map(|o| o.id).collect())
    }

    /// 只读编组规划: 不认领、不落库
    pub fn optimize_rake(&self, request: &OptimizeRakeRequest) -> ApiResult<OptimizeRakeResponse> {
        if let Some(budget) = request.max_budget {
            if budget <= 0.0 {
                return Err(ApiError::InvalidRequest(format!(
                    "预算上限必须大于0 (max_budget={})",
                    budget
                )));
            }
        }
        let order_ids = self.resolve_order_ids(&request.order_ids)?;
        let snapshot = self.load_snapshot()?;
        let formation_request = FormationRequest {
            order_ids,
            priority_weight: request.priority_weight,
            max_budget: request.max_budget,
            first_rake_seq: self.rake_repo.next_rake_seq()?,
            now: Utc::now(),
        };
        let result = self.optimizer.optimize(&formation_request, &snapshot);
        Ok(OptimizeRakeResponse {
            result,
            generated_at: formation_request.now,
        })
    }

    /// 编组规划并落库
    ///
    /// 逐列编组认领订单与车皮 (CAS); 任一认领失败即回滚该列已认领项;
    /// 发生过冲突则以最新数据重算一次, 二次冲突不再重试
    pub fn apply_formation(&self, request: &OptimizeRakeRequest) -> ApiResult<ApplyFormationResponse> {
        let planned = self.optimize_rake(request)?;
        self.apply_planned(request, &planned)
    }

    /// 落库既定规划 (冲突重算沿用请求的预算上限)
    fn apply_planned(
        &self,
        request: &OptimizeRakeRequest,
        planned: &OptimizeRakeResponse,
    ) -> ApiResult<ApplyFormationResponse> {
        let (mut created, mut unfulfilled, had_conflict) = self.commit(&planned.result)?;
        unfulfilled.extend(planned.result.unfulfilled.iter().cloned());

        let mut recomputed = false;
        if had_conflict {
            // 冲突订单回到待处理, 以最新库内状态重算一次
            warn!("编组落库发生认领冲突, 以最新数据重算一次");
            recomputed = true;
            let retry_ids: Vec<String> = unfulfilled
                .iter()
                .filter(|u| u.reason == UnfulfilledReason::ClaimConflict)
                .map(|u| u.order_id.clone())
                .filter(|id| {
                    matches!(
                        self.order_repo.find_by_id(id),
                        Ok(Some(Order {
                            status: OrderStatus::Pending,
                            ..
                        }))
                    )
                })
                .collect();
            if !retry_ids.is_empty() {
                let retry_request = OptimizeRakeRequest {
                    order_ids: retry_ids.clone(),
                    priority_weight: request.priority_weight,
                    max_budget: request.max_budget,
                };
                let retry_plan = self.optimize_rake(&retry_request)?;
                let (retry_created, retry_unfulfilled, _) = self.commit(&retry_plan.result)?;
                // 重试订单以本轮结果为准, 清除首轮的冲突上报
                unfulfilled.retain(|u| !retry_ids.contains(&u.order_id));
                unfulfilled.extend(retry_plan.result.unfulfilled.iter().cloned());
                unfulfilled.extend(retry_unfulfilled);
                created.extend(retry_created);
            }
        }

        // 预算标志以最终落库总成本为准 (重算轮的编组计入)
        let total_cost: f64 = created.iter().map(|r| r.cost.total).sum();
        let budget_met = request.max_budget.map_or(true, |b| total_cost <= b);
        info!(
            created = created.len(),
            unfulfilled_count = unfulfilled.len(),
            recomputed,
            total_cost,
            budget_met,
            "编组方案落库完成"
        );
        Ok(ApplyFormationResponse {
            explanation: planned.result.explanation.clone(),
            created_rakes: created,
            unfulfilled,
            recomputed,
            total_cost,
            budget_met,
        })
    }

    /// 提交一份规划: 返回 (已落库编组, 认领失败订单, 是否发生冲突)
    fn commit(
        &self,
        result: &FormationResult,
    ) -> ApiResult<(Vec<RakePlan>, Vec<UnfulfilledOrder>, bool)> {
        let mut created = Vec::new();
        let mut conflicts = Vec::new();
        let mut had_conflict = false;

        for rake in &result.recommended_rakes {
            match self.commit_rake(rake)? {
                Ok(plan) => created.push(plan),
                Err(items) => {
                    had_conflict = true;
                    conflicts.extend(items);
                }
            }
        }
        Ok((created, conflicts, had_conflict))
    }

    /// 提交单列编组; 认领失败时回滚本列全部已认领项
    ///
    /// 外层 Err 表示仓储故障; 内层 Err 表示认领冲突 (按订单上报)
    fn commit_rake(
        &self,
        rake: &RecommendedRake,
    ) -> ApiResult<Result<RakePlan, Vec<UnfulfilledOrder>>> {
        RakePlan::validate_capacity(rake.total_quantity_mt, rake.total_capacity_mt)
            .map_err(ApiError::BusinessRule)?;

        let mut claimed_orders: Vec<String> = Vec::new();
        let mut claimed_wagons: Vec<String> = Vec::new();
        // 已扣减库存 (material_id, 扣减量), 回滚时逐项回补
        let mut allocations: Vec<(String, f64)> = Vec::new();

        for order_id in &rake.order_ids {
            if self.order_repo.claim_pending(order_id)? {
                claimed_orders.push(order_id.clone());
            } else {
                warn!(order_id = %order_id, rake = %rake.rake_number, "订单认领冲突, 回滚本列编组");
                self.rollback_rake(&claimed_orders, &claimed_wagons, &rake.stockyard_id, &allocations)?;
                return Ok(Err(self.conflict_items(rake)?));
            }
        }
        for wagon_id in &rake.wagon_ids {
            if self.wagon_repo.claim_available(wagon_id)? {
                claimed_wagons.push(wagon_id.clone());
            } else {
                warn!(wagon_id = %wagon_id, rake = %rake.rake_number, "车皮认领冲突, 回滚本列编组");
                self.rollback_rake(&claimed_orders, &claimed_wagons, &rake.stockyard_id, &allocations)?;
                return Ok(Err(self.conflict_items(rake)?));
            }
        }

        // 扣减库存 (条件更新, 不足即失败)
        let orders = self.order_repo.find_by_ids(&rake.order_ids)?;
        for order in &orders {
            match self.stockyard_repo.allocate_inventory(
                &rake.stockyard_id,
                &order.material_id,
                order.quantity_mt,
            ) {
                Ok(()) => allocations.push((order.material_id.clone(), order.quantity_mt)),
                Err(err) => {
                    warn!(order_id = %order.id, error = %err, "库存扣减失败, 回滚本列编组");
                    self.rollback_rake(&claimed_orders, &claimed_wagons, &rake.stockyard_id, &allocations)?;
                    return Ok(Err(self.conflict_items(rake)?));
                }
            }
        }

        let plan = RakePlan {
            id: uuid::Uuid::new_v4().to_string(),
            rake_number: rake.rake_number.clone(),
            wagon_ids: rake.wagon_ids.clone(),
            order_ids: rake.order_ids.clone(),
            loading_point_id: rake.loading_point_id.clone(),
            route: format!("{} -> {}", rake.stockyard_name, rake.route),
            cost: rake.cost,
            status: RakeStatus::Planned,
            reasoning: rake.reasoning.clone(),
            formation_date: Utc::now(),
        };
        if let Err(err) = self.rake_repo.insert(&plan) {
            warn!(rake = %plan.rake_number, error = %err, "编组落库失败, 回滚本列已认领项");
            if let Err(rollback_err) =
                self.rollback_rake(&claimed_orders, &claimed_wagons, &rake.stockyard_id, &allocations)
            {
                warn!(error = %rollback_err, "编组落库失败后的回滚未完全成功");
            }
            return Err(err.into());
        }
        info!(rake = %plan.rake_number, orders = plan.order_ids.len(),
              wagons = plan.wagon_ids.len(), "编组已落库");
        Ok(Ok(plan))
    }

    /// 回滚整列编组: 释放已认领订单/车皮并回补已扣库存
    ///
    /// 尽力而为: 单项释放失败不中断其余项, 全部处理完后返回首个错误
    fn rollback_rake(
        &self,
        orders: &[String],
        wagons: &[String],
        stockyard_id: &str,
        allocations: &[(String, f64)],
    ) -> ApiResult<()> {
        let mut first_err: Option<ApiError> = None;
        for id in orders {
            if let Err(err) = self.order_repo.release(id) {
                warn!(order_id = %id, error = %err, "回滚释放订单失败, 继续处理剩余项");
                first_err.get_or_insert(err.into());
            }
        }
        for id in wagons {
            if let Err(err) = self.wagon_repo.release(id) {
                warn!(wagon_id = %id, error = %err, "回滚释放车皮失败, 继续处理剩余项");
                first_err.get_or_insert(err.into());
            }
        }
        for (material_id, quantity_mt) in allocations {
            if let Err(err) =
                self.stockyard_repo
                    .release_inventory(stockyard_id, material_id, *quantity_mt)
            {
                warn!(material_id = %material_id, error = %err, "回滚回补库存失败, 继续处理剩余项");
                first_err.get_or_insert(err.into());
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// 将整列编组的订单折算为认领冲突上报项
    fn conflict_items(&self, rake: &RecommendedRake) -> ApiResult<Vec<UnfulfilledOrder>> {
        let orders = self.order_repo.find_by_ids(&rake.order_ids)?;
        Ok(orders
            .into_iter()
            .map(|o| UnfulfilledOrder {
                order_id: o.id,
                customer_name: o.customer_name,
                quantity_mt: o.quantity_mt,
                destination: o.destination,
                reason: UnfulfilledReason::ClaimConflict,
                detail: format!("编组 {} 认领冲突, 整列回滚", rake.rake_number),
            })
            .collect())
    }

    /// 成本优化分析 (只读)
    pub fn cost_optimization(
        &self,
        request: &CostOptimizationRequest,
    ) -> ApiResult<CostOptimizationResult> {
        if let Some(budget) = request.max_budget {
            if budget <= 0.0 {
                return Err(ApiError::InvalidRequest(format!(
                    "预算上限必须大于0 (max_budget={})",
                    budget
                )));
            }
        }
        let order_ids = self.resolve_order_ids(&request.order_ids)?;
        let snapshot = self.load_snapshot()?;
        Ok(self
            .cost_optimizer
            .optimize(&order_ids, request.max_budget, &snapshot, Utc::now()))
    }

    /// 实施成本优化方案: 逐单认领订单并按最优料场扣减库存
    pub fn implement_cost_optimization(
        &self,
        request: &CostOptimizationRequest,
    ) -> ApiResult<ImplementCostOptimizationResponse> {
        let result = self.cost_optimization(request)?;
        let mut implemented = Vec::new();
        let mut conflicts: Vec<(String, String)> = Vec::new();

        for analysis in &result.analyses {
            if !self.order_repo.claim_pending(&analysis.order_id)? {
                conflicts.push((
                    analysis.order_id.clone(),
                    "订单已被其他请求认领".to_string(),
                ));
                continue;
            }
            let order = match self.order_repo.find_by_id(&analysis.order_id)? {
                Some(o) => o,
                None => {
                    conflicts.push((analysis.order_id.clone(), "订单不存在".to_string()));
                    continue;
                }
            };
            if let Err(err) = self.stockyard_repo.allocate_inventory(
                &analysis.stockyard_id,
                &order.material_id,
                order.quantity_mt,
            ) {
                self.order_repo.release(&analysis.order_id)?;
                conflicts.push((analysis.order_id.clone(), err.to_string()));
                continue;
            }
            implemented.push(analysis.order_id.clone());
        }

        info!(
            implemented = implemented.len(),
            conflicts = conflicts.len(),
            "成本优化方案实施完成"
        );
        Ok(ImplementCostOptimizationResponse {
            implemented,
            conflicts,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::Duration;
    use rusqlite::Connection;

    use crate::db::configure_sqlite_connection;
    use crate::domain::{
        CompatibilityRule, CostBreakdown, Inventory, LoadingPoint, Material, OrderPriority,
        Stockyard, Wagon, WagonStatus,
    };
    use crate::repository::init_schema;

    struct Harness {
        conn: Arc<Mutex<Connection>>,
        api: OptimizationApi,
        order_repo: Arc<OrderRepository>,
        wagon_repo: Arc<WagonRepository>,
        stockyard_repo: Arc<StockyardRepository>,
        material_repo: Arc<MaterialRepository>,
        loading_point_repo: Arc<LoadingPointRepository>,
        compatibility_repo: Arc<CompatibilityRuleRepository>,
        rake_repo: Arc<RakeRepository>,
    }

    fn harness() -> Harness {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
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

        let api = OptimizationApi::new(
            Arc::clone(&order_repo),
            Arc::clone(&wagon_repo),
            Arc::clone(&stockyard_repo),
            Arc::clone(&material_repo),
            Arc::clone(&loading_point_repo),
            Arc::clone(&compatibility_repo),
            Arc::clone(&rake_repo),
            OptimizerConfig::default(),
        );
        Harness {
            conn,
            api,
            order_repo,
            wagon_repo,
            stockyard_repo,
            material_repo,
            loading_point_repo,
            compatibility_repo,
            rake_repo,
        }
    }

    struct World {
        yard: Stockyard,
        loading_point_id: String,
        material_id: String,
        order_ids: Vec<String>,
        wagons: Vec<Wagon>,
    }

    /// 单物料单料场世界: 指定订单吨数、库存量与车皮数 (BOXN 60 吨)
    fn seed_world(h: &Harness, order_quantities: &[f64], stock_mt: f64, wagon_count: usize) -> World {
        let material = Material::new("Coal".to_string(), "Bulk".to_string(), "MT".to_string());
        h.material_repo.insert(&material).unwrap();

        let yard = Stockyard::new("North Yard".to_string(), "Plant North".to_string(), 50_000.0);
        h.stockyard_repo.insert(&yard).unwrap();
        h.stockyard_repo
            .upsert_inventory(&Inventory::new(
                yard.id.clone(),
                material.id.clone(),
                stock_mt,
                3_200.0,
            ))
            .unwrap();

        let lp = LoadingPoint::new("LP-1".to_string(), yard.id.clone(), 3.0, 0.2);
        h.loading_point_repo.insert(&lp).unwrap();
        h.compatibility_repo
            .upsert(
                &CompatibilityRule::new("Bulk".to_string(), "BOXN".to_string(), 0.95, 0.90, vec![])
                    .unwrap(),
            )
            .unwrap();

        let mut wagons = Vec::new();
        for i in 1..=wagon_count {
            let wagon = Wagon::new(
                format!("BOXN-{:03}", i),
                "BOXN".to_string(),
                60.0,
                Some("Plant North".to_string()),
            );
            h.wagon_repo.insert(&wagon).unwrap();
            wagons.push(wagon);
        }

        let now = Utc::now();
        let mut order_ids = Vec::new();
        for (i, quantity) in order_quantities.iter().enumerate() {
            let order = Order::new(
                format!("客户{}", i + 1),
                material.id.clone(),
                *quantity,
                "Delhi".to_string(),
                OrderPriority::Medium,
                now + Duration::days(10),
                5_000.0,
            )
            .unwrap();
            h.order_repo.insert(&order).unwrap();
            order_ids.push(order.id);
        }

        World {
            yard,
            loading_point_id: lp.id,
            material_id: material.id,
            order_ids,
            wagons,
        }
    }

    fn quantity_of(h: &Harness, material_id: &str) -> f64 {
        h.stockyard_repo
            .list_inventory()
            .unwrap()
            .into_iter()
            .find(|i| i.material_id == material_id)
            .unwrap()
            .quantity_mt
    }

    /// 手工装配一列编组 (占用世界里全部车皮), 用于直接驱动落库路径
    fn forged_rake(world: &World, order_ids: Vec<String>, total_quantity_mt: f64) -> RecommendedRake {
        let total_capacity_mt: f64 = world.wagons.iter().map(|w| w.capacity_mt).sum();
        RecommendedRake {
            rake_number: "RAKE-2026-001".to_string(),
            stockyard_id: world.yard.id.clone(),
            stockyard_name: world.yard.name.clone(),
            loading_point_id: world.loading_point_id.clone(),
            route: "Delhi".to_string(),
            order_ids,
            wagon_ids: world.wagons.iter().map(|w| w.id.clone()).collect(),
            wagon_count: world.wagons.len(),
            total_quantity_mt,
            total_capacity_mt,
            utilization_pct: total_quantity_mt / total_capacity_mt * 100.0,
            cost: CostBreakdown::new(48_000.0, 120_000.0, 0.0, 0.0),
            efficiency_score: 80.0,
            reasoning: "人工装配的落库用例".to_string(),
        }
    }

    // 测试1: 多订单编组中途库存扣减失败 -> 整列回滚并回补已扣库存
    #[test]
    fn test_allocation_failure_restores_earlier_allocations() {
        let h = harness();
        // 第一单 500 吨扣减成功后剩 500, 第二单 800 吨必然失败
        let world = seed_world(&h, &[500.0, 800.0], 1_000.0, 22);

        let rake = forged_rake(&world, world.order_ids.clone(), 1_300.0);
        let conflicts = h.api.commit_rake(&rake).unwrap().unwrap_err();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .all(|c| c.reason == UnfulfilledReason::ClaimConflict));

        // 订单与车皮全部释放, 先行扣减的 500 吨已回补
        for order_id in &world.order_ids {
            let order = h.order_repo.find_by_id(order_id).unwrap().unwrap();
            assert_eq!(order.status, OrderStatus::Pending);
        }
        assert_eq!(h.wagon_repo.count_available().unwrap(), 22);
        assert!((quantity_of(&h, &world.material_id) - 1_000.0).abs() < 1e-9);
        assert_eq!(h.rake_repo.count_active().unwrap(), 0);
    }

    // 测试2: 订单认领冲突 -> 整列回滚, 已被抢占的订单维持抢占方状态
    #[test]
    fn test_order_claim_conflict_rolls_back_whole_rake() {
        let h = harness();
        let world = seed_world(&h, &[600.0, 600.0], 10_000.0, 20);

        // 第二单已被竞争方抢占
        assert!(h.order_repo.claim_pending(&world.order_ids[1]).unwrap());

        let rake = forged_rake(&world, world.order_ids.clone(), 1_200.0);
        let conflicts = h.api.commit_rake(&rake).unwrap().unwrap_err();
        assert!(!conflicts.is_empty());

        let first = h.order_repo.find_by_id(&world.order_ids[0]).unwrap().unwrap();
        assert_eq!(first.status, OrderStatus::Pending);
        let second = h.order_repo.find_by_id(&world.order_ids[1]).unwrap().unwrap();
        assert_eq!(second.status, OrderStatus::Assigned);
        assert_eq!(h.wagon_repo.count_available().unwrap(), 20);
        assert!((quantity_of(&h, &world.material_id) - 10_000.0).abs() < 1e-9);
    }

    // 测试3: 编组落库本身失败 -> 认领与库存全部还原, 故障向上传播
    #[test]
    fn test_insert_failure_releases_claims_and_inventory() {
        let h = harness();
        let world = seed_world(&h, &[600.0], 10_000.0, 10);

        // 装车点外键非法, rake 插入必然失败
        let mut rake = forged_rake(&world, world.order_ids.clone(), 600.0);
        rake.loading_point_id = "no-such-loading-point".to_string();
        assert!(h.api.commit_rake(&rake).is_err());

        let order = h.order_repo.find_by_id(&world.order_ids[0]).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(h.wagon_repo.count_available().unwrap(), 10);
        assert!((quantity_of(&h, &world.material_id) - 10_000.0).abs() < 1e-9);
        assert_eq!(h.rake_repo.count_active().unwrap(), 0);
    }

    // 测试4: 落库前订单被抢占 -> 冲突编组整列回滚后重算一次, 其余订单照常成组
    #[test]
    fn test_commit_conflict_triggers_single_recompute() {
        let h = harness();
        let world = seed_world(&h, &[500.0, 800.0, 300.0], 10_000.0, 30);

        let request = OptimizeRakeRequest {
            order_ids: Vec::new(),
            priority_weight: 0.3,
            max_budget: Some(10_000_000.0),
        };
        let planned = h.api.optimize_rake(&request).unwrap();
        assert_eq!(planned.result.recommended_rakes.len(), 1);

        // 规划与落库之间, 竞争方抢占第一单
        assert!(h.order_repo.claim_pending(&world.order_ids[0]).unwrap());

        let response = h.api.apply_planned(&request, &planned).unwrap();
        assert!(response.recomputed);
        assert_eq!(response.created_rakes.len(), 1);
        assert!(response.budget_met);

        // 重算轮覆盖其余两单, 被抢占的订单如实上报为认领冲突
        let covered: Vec<&String> = response
            .created_rakes
            .iter()
            .flat_map(|r| r.order_ids.iter())
            .collect();
        assert_eq!(covered.len(), 2);
        assert!(!covered.contains(&&world.order_ids[0]));
        assert!(response
            .unfulfilled
            .iter()
            .any(|u| u.order_id == world.order_ids[0]
                && u.reason == UnfulfilledReason::ClaimConflict));

        for order_id in &world.order_ids[1..] {
            let order = h.order_repo.find_by_id(order_id).unwrap().unwrap();
            assert_eq!(order.status, OrderStatus::Assigned);
        }
        // 落库总成本与回应一致, 库存按重算轮发运量扣减
        let rake_cost: f64 = response.created_rakes.iter().map(|r| r.cost.total).sum();
        assert!((response.total_cost - rake_cost).abs() < 1e-9);
        assert!((quantity_of(&h, &world.material_id) - (10_000.0 - 1_100.0)).abs() < 1e-9);
    }

    // 测试5: 回滚尽力而为 - 某类释放失败时其余项仍被释放, 错误最终上报
    #[test]
    fn test_rollback_continues_past_failed_release() {
        let h = harness();
        let world = seed_world(&h, &[600.0, 600.0], 1_000.0, 20);

        for order_id in &world.order_ids {
            assert!(h.order_repo.claim_pending(order_id).unwrap());
        }
        let wagon_ids: Vec<String> = world.wagons[..2].iter().map(|w| w.id.clone()).collect();
        for wagon_id in &wagon_ids {
            assert!(h.wagon_repo.claim_available(wagon_id).unwrap());
        }
        h.stockyard_repo
            .allocate_inventory(&world.yard.id, &world.material_id, 600.0)
            .unwrap();

        // 订单表被破坏, 订单释放必然失败
        h.conn
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE rake_orders; DROP TABLE orders;")
            .unwrap();

        let result = h.api.rollback_rake(
            &world.order_ids,
            &wagon_ids,
            &world.yard.id,
            &[(world.material_id.clone(), 600.0)],
        );
        assert!(result.is_err());

        // 车皮与库存仍被还原
        for wagon_id in &wagon_ids {
            let wagon = h.wagon_repo.find_by_id(wagon_id).unwrap().unwrap();
            assert_eq!(wagon.status, WagonStatus::Available);
        }
        assert!((quantity_of(&h, &world.material_id) - 1_000.0).abs() < 1e-9);
    }
}
