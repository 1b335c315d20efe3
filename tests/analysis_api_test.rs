// ==========================================
// 运营分析 API 集成测试: 利用率/预警/线路比选/看板
// ==========================================


use chrono::{Duration, Utc};

use rake_formation_dss::api::{OptimizeRakeRequest, RouteOptimizeRequest, RouteRequest};
use rake_formation_dss::api::ApiError;
use rake_formation_dss::domain::{OrderPriority, RouteCriterion, TransportMode};

use test_helpers::{add_order, seed_small_world, temp_state};

fn apply_all(state: &rake_formation_dss::app::AppState) {
    state
        .optimization_api
        .apply_formation(&OptimizeRakeRequest {
            order_ids: Vec::new(),
            priority_weight: 0.3,
            max_budget: None,
        })
        .unwrap();
}

// 测试1: 落库后的车皮利用率总览
#[test]
fn test_wagon_utilization_after_apply() {
    let (_dir, state) = temp_state();
    seed_small_world(&state);
    apply_all(&state);

    let response = state.analysis_api.wagon_utilization().unwrap();
    assert_eq!(response.rakes.len(), 1);
    let report = &response.rakes[0].report;
    // 1600 吨 / 27 节 x 60 吨
    assert!(report.average_utilization_pct > 95.0);
    assert!(report.per_wagon.iter().all(|w| w.utilization_pct <= 100.0));
    assert_eq!(response.fleet_available, 3);
}

// 测试2: 新落库编组未超免费时长, 无滞期预警
#[test]
fn test_no_demurrage_for_fresh_rake() {
    let (_dir, state) = temp_state();
    seed_small_world(&state);
    apply_all(&state);

    let response = state.analysis_api.demurrage_alerts().unwrap();
    assert!(response.alerts.is_empty());
    assert_eq!(response.total_accrued_cost, 0.0);
}

// 测试3: 交期临近订单触发违约金预警
#[test]
fn test_penalty_alert_for_urgent_order() {
    let (_dir, state) = temp_state();
    let world = seed_small_world(&state);
    let urgent_id = add_order(
        &state,
        &world,
        "紧急客户",
        200.0,
        "Delhi",
        OrderPriority::High,
        2,
    );

    let response = state.analysis_api.penalty_alerts().unwrap();
    assert_eq!(response.alerts.len(), 1);
    assert_eq!(response.alerts[0].order_id, urgent_id);
    assert!(!response.alerts[0].overdue);
    assert_eq!(response.total_accrued_exposure, 0.0);
}

// 测试4: 运价比选与按准则选路一致
#[test]
fn test_freight_compare_and_route_optimize() {
    let (_dir, state) = temp_state();
    seed_small_world(&state);

    let compare = state
        .analysis_api
        .freight_rates_compare(&RouteRequest {
            origin: "Plant North".to_string(),
            destination: "Delhi".to_string(),
            quantity_mt: 1_000.0,
        })
        .unwrap();
    assert_eq!(compare.comparison.cheapest, TransportMode::Rail);

    let optimize = state
        .analysis_api
        .optimize_route(&RouteOptimizeRequest {
            origin: "Plant North".to_string(),
            destination: "Delhi".to_string(),
            quantity_mt: 1_000.0,
            criterion: RouteCriterion::Cost,
        })
        .unwrap();
    assert_eq!(optimize.best.mode, compare.comparison.cheapest);
    assert_eq!(optimize.alternatives.len(), 2);
}

// 测试5: 运价比选两次结果一致 (确定性)
#[test]
fn test_route_comparison_deterministic() {
    let (_dir, state) = temp_state();
    seed_small_world(&state);
    let request = RouteRequest {
        origin: "Plant North".to_string(),
        destination: "Mumbai".to_string(),
        quantity_mt: 500.0,
    };

    let a = state.analysis_api.freight_rates_compare(&request).unwrap();
    let b = state.analysis_api.freight_rates_compare(&request).unwrap();
    for (oa, ob) in a
        .comparison
        .options
        .iter()
        .zip(b.comparison.options.iter())
    {
        assert_eq!(oa.cost, ob.cost);
        assert_eq!(oa.time_hours, ob.time_hours);
        assert_eq!(oa.co2_kg, ob.co2_kg);
    }
}

// 测试6: 碳排放分析铁路最优
#[test]
fn test_co2_analysis_rail_best() {
    let (_dir, state) = temp_state();
    seed_small_world(&state);

    let response = state
        .analysis_api
        .co2_analysis(&RouteRequest {
            origin: "Plant North".to_string(),
            destination: "Kolkata".to_string(),
            quantity_mt: 800.0,
        })
        .unwrap();
    assert_eq!(response.analysis.best_mode, TransportMode::Rail);
    assert!(response.analysis.max_saving_kg > 0.0);
}

// 测试7: 非法线路入参被拒绝
#[test]
fn test_route_input_validation() {
    let (_dir, state) = temp_state();
    seed_small_world(&state);

    let err = state
        .analysis_api
        .freight_rates_compare(&RouteRequest {
            origin: "".to_string(),
            destination: "Delhi".to_string(),
            quantity_mt: 100.0,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));

    let err = state
        .analysis_api
        .co2_analysis(&RouteRequest {
            origin: "Plant North".to_string(),
            destination: "Delhi".to_string(),
            quantity_mt: 0.0,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

// 测试8: 装车调度建议包含补载建议
#[test]
fn test_loading_optimization_with_top_up() {
    let (_dir, state) = temp_state();
    let world = seed_small_world(&state);
    apply_all(&state);
    // 落库后追加小单, 可装入编组剩余 20 吨容量
    add_order(&state, &world, "补载客户", 15.0, "Delhi", OrderPriority::Low, 14);

    let response = state.analysis_api.loading_optimization().unwrap();
    assert_eq!(response.loading_points.len(), 1);
    assert_eq!(response.top_up_suggestions.len(), 1);
    let (rake_number, suggestions) = &response.top_up_suggestions[0];
    assert!(rake_number.starts_with("RAKE-"));
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].customer_name, "补载客户");

    // 装车点接近满负荷后出现分流建议
    state
        .loading_point_repo
        .set_utilization(&world.loading_point_id, 0.95)
        .unwrap();
    let lp = state
        .loading_point_repo
        .find_by_id(&world.loading_point_id)
        .unwrap()
        .unwrap();
    assert!((lp.current_utilization - 0.95).abs() < 1e-9);
    let response = state.analysis_api.loading_optimization().unwrap();
    assert!(response.loading_points[0]
        .recommendations
        .iter()
        .any(|r| r.contains("分流")));
}

// 测试9: 看板统计口径
#[test]
fn test_dashboard_stats() {
    let (_dir, state) = temp_state();
    let world = seed_small_world(&state);
    add_order(&state, &world, "紧急客户", 200.0, "Delhi", OrderPriority::High, 2);

    let stats = state.dashboard_api.stats().unwrap();
    assert_eq!(stats.pending_orders, 4);
    assert_eq!(stats.urgent_orders, 1);
    assert_eq!(stats.available_wagons, 30);
    assert_eq!(stats.active_rakes, 0);
    assert!((stats.total_inventory_value - 10_000.0 * 3_200.0).abs() < 1e-6);
    assert!((stats.average_loading_point_utilization - 0.2).abs() < 1e-9);

    apply_all(&state);
    let stats = state.dashboard_api.stats().unwrap();
    assert_eq!(stats.active_rakes, 1);
    assert_eq!(stats.pending_orders, 0);
}
