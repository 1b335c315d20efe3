// ==========================================
// 铁路车皮编组优化系统 - 示例数据
// ==========================================
// 职责: 首次启动时的幂等种子数据 (物料/料场/库存/订单/车皮/装车点/规则)
// ==========================================

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use tracing::info;

use crate::app::state::AppState;
use crate::domain::{
    CompatibilityRule, Inventory, LoadingPoint, Material, Order, OrderPriority, Stockyard, Wagon,
};

/// 幂等种子: 已有物料数据时直接跳过
///
/// # 返回
/// - Ok(true): 本次完成了种子写入
/// - Ok(false): 数据已存在, 跳过
pub fn seed_if_empty(state: &AppState) -> Result<bool> {
    if state.material_repo.count()? > 0 {
        info!("示例数据已存在, 跳过种子写入");
        return Ok(false);
    }

    // ---------- 物料 ----------
    let coal = Material::new("Coal".to_string(), "Bulk".to_string(), "MT".to_string());
    let iron_ore = Material::new("Iron Ore".to_string(), "Bulk".to_string(), "MT".to_string());
    let steel_coils = Material::new(
        "Steel Coils".to_string(),
        "Finished".to_string(),
        "MT".to_string(),
    );
    let limestone = Material::new("Limestone".to_string(), "Bulk".to_string(), "MT".to_string());
    for material in [&coal, &iron_ore, &steel_coils, &limestone] {
        state.material_repo.insert(material)?;
    }

    // ---------- 料场 ----------
    let north = Stockyard::new(
        "Plant North Yard".to_string(),
        "Plant North".to_string(),
        50_000.0,
    );
    let south = Stockyard::new(
        "Plant South Yard".to_string(),
        "Plant South".to_string(),
        40_000.0,
    );
    let east = Stockyard::new(
        "Plant East Yard".to_string(),
        "Plant East".to_string(),
        30_000.0,
    );
    for stockyard in [&north, &south, &east] {
        state.stockyard_repo.insert(stockyard)?;
    }

    // ---------- 库存 ----------
    let inventory = [
        Inventory::new(north.id.clone(), coal.id.clone(), 15_000.0, 3_200.0),
        Inventory::new(north.id.clone(), iron_ore.id.clone(), 12_000.0, 4_500.0),
        Inventory::new(south.id.clone(), steel_coils.id.clone(), 8_000.0, 52_000.0),
        Inventory::new(south.id.clone(), coal.id.clone(), 10_000.0, 3_100.0),
        Inventory::new(east.id.clone(), limestone.id.clone(), 9_000.0, 1_800.0),
        Inventory::new(east.id.clone(), iron_ore.id.clone(), 7_000.0, 4_400.0),
    ];
    for row in &inventory {
        state.stockyard_repo.upsert_inventory(row)?;
    }

    // ---------- 订单 ----------
    let now = Utc::now();
    let orders = [
        Order::new(
            "Tata Infra".to_string(),
            steel_coils.id.clone(),
            1_500.0,
            "Mumbai".to_string(),
            OrderPriority::High,
            now + Duration::days(7),
            8_000.0,
        ),
        Order::new(
            "NTPC Power".to_string(),
            coal.id.clone(),
            2_000.0,
            "Delhi".to_string(),
            OrderPriority::Medium,
            now + Duration::days(10),
            5_000.0,
        ),
        Order::new(
            "Eastern Steels".to_string(),
            iron_ore.id.clone(),
            1_800.0,
            "Kolkata".to_string(),
            OrderPriority::Medium,
            now + Duration::days(12),
            4_500.0,
        ),
        Order::new(
            "Chennai Cements".to_string(),
            limestone.id.clone(),
            1_200.0,
            "Chennai".to_string(),
            OrderPriority::Low,
            now + Duration::days(15),
            3_000.0,
        ),
    ];
    for order in orders {
        let order = order.map_err(|e| anyhow!("示例订单无效: {}", e))?;
        state.order_repo.insert(&order)?;
    }

    // ---------- 车皮 ----------
    // BOXN 60吨 x90 (北场就位), BRN 50吨 x35 (南场), BCN 55吨 x20 (东场)
    for i in 1..=90 {
        state.wagon_repo.insert(&Wagon::new(
            format!("BOXN-{:03}", i),
            "BOXN".to_string(),
            60.0,
            Some("Plant North".to_string()),
        ))?;
    }
    for i in 1..=35 {
        state.wagon_repo.insert(&Wagon::new(
            format!("BRN-{:03}", i),
            "BRN".to_string(),
            50.0,
            Some("Plant South".to_string()),
        ))?;
    }
    for i in 1..=20 {
        state.wagon_repo.insert(&Wagon::new(
            format!("BCN-{:03}", i),
            "BCN".to_string(),
            55.0,
            Some("Plant East".to_string()),
        ))?;
    }

    // ---------- 装车点 ----------
    let loading_points = [
        LoadingPoint::new("LP-North-1".to_string(), north.id.clone(), 3.0, 0.45),
        LoadingPoint::new("LP-South-1".to_string(), south.id.clone(), 2.0, 0.60),
        LoadingPoint::new("LP-East-1".to_string(), east.id.clone(), 2.0, 0.30),
    ];
    for lp in &loading_points {
        state.loading_point_repo.insert(lp)?;
    }

    // ---------- 相容性规则 ----------
    let rules = [
        CompatibilityRule::new("Bulk".to_string(), "BOXN".to_string(), 0.95, 0.90, vec![]),
        CompatibilityRule::new("Bulk".to_string(), "BCN".to_string(), 0.85, 0.82, vec![]),
        // 散货不宜用平板车, 低于阈值判不可行
        CompatibilityRule::new("Bulk".to_string(), "BRN".to_string(), 0.30, 0.50, vec![]),
        CompatibilityRule::new("Finished".to_string(), "BRN".to_string(), 0.92, 0.88, vec![]),
        CompatibilityRule::new("Finished".to_string(), "BOST".to_string(), 0.80, 0.75, vec![]),
        // 成品入棚车需倒装, 且 Chennai 方向限界受限
        CompatibilityRule::new(
            "Finished".to_string(),
            "BCN".to_string(),
            0.55,
            0.60,
            vec!["Chennai".to_string()],
        ),
    ];
    for rule in rules {
        let rule = rule.map_err(|e| anyhow!("示例规则无效: {}", e))?;
        state.compatibility_repo.upsert(&rule)?;
    }

    info!(
        materials = 4,
        stockyards = 3,
        orders = 4,
        wagons = 145,
        loading_points = 3,
        "示例数据写入完成"
    );
    Ok(true)
}
