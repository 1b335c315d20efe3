// ==========================================
// 编组优化引擎集成测试: 典型场景与边界场景
// ==========================================

use chrono::{Duration, Utc};

use rake_formation_dss::config::OptimizerConfig;
use rake_formation_dss::domain::{
    CompatibilityRule, Inventory, LoadingPoint, Material, Order, OrderPriority, Stockyard, Wagon,
};
use rake_formation_dss::engine::{
    FormationRequest, PlanningSnapshot, RakeFormationOptimizer, UnfulfilledReason,
};

fn make_order(
    material_id: &str,
    customer: &str,
    quantity_mt: f64,
    priority: OrderPriority,
    deadline_days: i64,
) -> Order {
    Order::new(
        customer.to_string(),
        material_id.to_string(),
        quantity_mt,
        "Delhi".to_string(),
        priority,
        Utc::now() + Duration::days(deadline_days),
        5_000.0,
    )
    .unwrap()
}

/// 两节 1000 吨巨型车皮 + 三个订单的快照
fn two_wagon_snapshot() -> PlanningSnapshot {
    let material = Material::new("Coal".to_string(), "Bulk".to_string(), "MT".to_string());
    let stockyard = Stockyard::new(
        "Plant North Yard".to_string(),
        "Plant North".to_string(),
        50_000.0,
    );
    let inventory = Inventory::new(stockyard.id.clone(), material.id.clone(), 10_000.0, 3_200.0);
    let lp = LoadingPoint::new("LP-North-1".to_string(), stockyard.id.clone(), 3.0, 0.1);
    let orders = vec![
        make_order(&material.id, "客户A", 500.0, OrderPriority::High, 7),
        make_order(&material.id, "客户B", 800.0, OrderPriority::Medium, 10),
        make_order(&material.id, "客户C", 300.0, OrderPriority::Low, 14),
    ];
    let wagons = vec![
        Wagon::new(
            "HVY-001".to_string(),
            "BOXN".to_string(),
            1_000.0,
            Some("Plant North".to_string()),
        ),
        Wagon::new(
            "HVY-002".to_string(),
            "BOXN".to_string(),
            1_000.0,
            Some("Plant North".to_string()),
        ),
    ];
    let rule =
        CompatibilityRule::new("Bulk".to_string(), "BOXN".to_string(), 0.95, 0.90, vec![])
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

fn request_for(snapshot: &PlanningSnapshot) -> FormationRequest {
    FormationRequest {
        order_ids: snapshot.orders.iter().map(|o| o.id.clone()).collect(),
        priority_weight: 0.3,
        max_budget: None,
        first_rake_seq: 1,
        now: Utc::now(),
    }
}

// 场景1: 三单合一列, 两节车皮利用率 >= 80%, 无未满足订单
#[test]
fn test_three_orders_two_wagons_single_rake() {
    let snapshot = two_wagon_snapshot();
    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let result = optimizer.optimize(&request_for(&snapshot), &snapshot);

    assert_eq!(result.recommended_rakes.len(), 1);
    assert!(result.unfulfilled.is_empty());
    let rake = &result.recommended_rakes[0];
    assert_eq!(rake.order_ids.len(), 3);
    assert_eq!(rake.wagon_count, 2);
    assert!((rake.total_quantity_mt - 1_600.0).abs() < 1e-9);
    assert!(rake.utilization_pct >= 80.0);
    assert!(rake.total_quantity_mt <= rake.total_capacity_mt);
}

// 场景2: 1200 吨需求对 1000 吨运力, 覆盖最大可行子集并如实上报剩余
#[test]
fn test_partial_fulfillment_when_capacity_short() {
    let mut snapshot = two_wagon_snapshot();
    snapshot.wagons = vec![
        Wagon::new("W-500A".to_string(), "BOXN".to_string(), 500.0, None),
        Wagon::new("W-500B".to_string(), "BOXN".to_string(), 500.0, None),
    ];
    let material_id = snapshot.materials[0].id.clone();
    snapshot.orders = vec![
        make_order(&material_id, "客户大", 700.0, OrderPriority::High, 7),
        make_order(&material_id, "客户小", 500.0, OrderPriority::Medium, 10),
    ];

    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let result = optimizer.optimize(&request_for(&snapshot), &snapshot);

    // 高优先级 700 吨占两节车皮, 剩余 500 吨无车可用
    assert_eq!(result.recommended_rakes.len(), 1);
    assert!((result.recommended_rakes[0].total_quantity_mt - 700.0).abs() < 1e-9);
    assert_eq!(result.unfulfilled.len(), 1);
    assert_eq!(result.unfulfilled[0].customer_name, "客户小");
    assert_eq!(
        result.unfulfilled[0].reason,
        UnfulfilledReason::InsufficientWagonCapacity
    );
}

// 场景3: 单一超大订单超出全部运力, 返回空方案而非报错
#[test]
fn test_oversized_single_order_reported_not_error() {
    let mut snapshot = two_wagon_snapshot();
    let material_id = snapshot.materials[0].id.clone();
    snapshot.orders = vec![make_order(
        &material_id,
        "客户超",
        5_000.0,
        OrderPriority::High,
        7,
    )];

    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let result = optimizer.optimize(&request_for(&snapshot), &snapshot);

    assert!(result.recommended_rakes.is_empty());
    assert_eq!(result.unfulfilled.len(), 1);
    assert_eq!(result.total_cost, 0.0);
}

// 场景4: 预算上限超限仅置标志, 方案仍为当前最低成本
#[test]
fn test_budget_unmet_is_flag_not_error() {
    let snapshot = two_wagon_snapshot();
    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let mut request = request_for(&snapshot);
    request.max_budget = Some(10.0);
    let result = optimizer.optimize(&request, &snapshot);

    assert!(!result.budget_met);
    assert_eq!(result.recommended_rakes.len(), 1);
    assert!(result.total_cost > 10.0);
}

// 场景5: 同一快照同一请求, 两次输出完全一致
#[test]
fn test_repeat_optimization_is_deterministic() {
    let snapshot = two_wagon_snapshot();
    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let request = request_for(&snapshot);

    let first = optimizer.optimize(&request, &snapshot);
    let second = optimizer.optimize(&request, &snapshot);

    assert_eq!(first.total_cost, second.total_cost);
    assert_eq!(first.potential_savings, second.potential_savings);
    assert_eq!(
        first.recommended_rakes.len(),
        second.recommended_rakes.len()
    );
    for (a, b) in first
        .recommended_rakes
        .iter()
        .zip(second.recommended_rakes.iter())
    {
        assert_eq!(a.rake_number, b.rake_number);
        assert_eq!(a.order_ids, b.order_ids);
        assert_eq!(a.wagon_ids, b.wagon_ids);
        assert_eq!(a.cost.total, b.cost.total);
    }
}

// 场景6: 相容性规则缺失时一律判不可行 (fail-closed)
#[test]
fn test_missing_rule_fails_closed() {
    let mut snapshot = two_wagon_snapshot();
    snapshot.compatibility_rules.clear();

    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let result = optimizer.optimize(&request_for(&snapshot), &snapshot);

    assert!(result.recommended_rakes.is_empty());
    assert_eq!(result.unfulfilled.len(), 3);
    assert!(result
        .unfulfilled
        .iter()
        .all(|u| u.reason == UnfulfilledReason::NoFeasibleWagonType));
}

// 场景7: 受限线路上的车皮类型被排除
#[test]
fn test_restricted_route_excluded() {
    let mut snapshot = two_wagon_snapshot();
    snapshot.compatibility_rules = vec![CompatibilityRule::new(
        "Bulk".to_string(),
        "BOXN".to_string(),
        0.95,
        0.90,
        vec!["Delhi".to_string()],
    )
    .unwrap()];

    let optimizer = RakeFormationOptimizer::new(OptimizerConfig::default());
    let result = optimizer.optimize(&request_for(&snapshot), &snapshot);

    assert!(result.recommended_rakes.is_empty());
    assert!(result
        .unfulfilled
        .iter()
        .all(|u| u.reason == UnfulfilledReason::NoFeasibleWagonType));
}
