// ==========================================
// 铁路车皮编组优化系统 - 规划快照
// ==========================================
// 职责: 一次性读取的规划输入数据集, 引擎只读不写
// ==========================================

use crate::domain::{
    CompatibilityRule, Inventory, LoadingPoint, Material, Order, Stockyard, Wagon,
};

/// 规划快照: 优化引擎的全部只读输入
///
/// 由 API 层从仓储一次性读出后传入引擎, 引擎运行期间不再访问数据库,
/// 保证同一快照下的优化结果完全可复现
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub orders: Vec<Order>,
    pub materials: Vec<Material>,
    pub stockyards: Vec<Stockyard>,
    pub inventory: Vec<Inventory>,
    pub wagons: Vec<Wagon>,
    pub loading_points: Vec<LoadingPoint>,
    pub compatibility_rules: Vec<CompatibilityRule>,
}

impl PlanningSnapshot {
    /// 按 ID 查物料
    pub fn material(&self, material_id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == material_id)
    }

    /// 按 ID 查料场
    pub fn stockyard(&self, stockyard_id: &str) -> Option<&Stockyard> {
        self.stockyards.iter().find(|s| s.id == stockyard_id)
    }

    /// 按 ID 查装车点
    pub fn loading_point(&self, loading_point_id: &str) -> Option<&LoadingPoint> {
        self.loading_points.iter().find(|lp| lp.id == loading_point_id)
    }

    /// 某料场下的装车点, 按当前占用率升序
    pub fn loading_points_of(&self, stockyard_id: &str) -> Vec<&LoadingPoint> {
        let mut lps: Vec<&LoadingPoint> = self
            .loading_points
            .iter()
            .filter(|lp| lp.stockyard_id == stockyard_id)
            .collect();
        lps.sort_by(|a, b| {
            a.current_utilization
                .partial_cmp(&b.current_utilization)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        lps
    }

    /// 某物料在各料场的库存, 按料场 ID 升序 (保证确定性遍历)
    pub fn inventory_by_material(&self, material_id: &str) -> Vec<&Inventory> {
        let mut rows: Vec<&Inventory> = self
            .inventory
            .iter()
            .filter(|inv| inv.material_id == material_id)
            .collect();
        rows.sort_by(|a, b| a.stockyard_id.cmp(&b.stockyard_id));
        rows
    }

    /// 可用车皮, 按载重降序、车号升序
    pub fn available_wagons(&self) -> Vec<&Wagon> {
        let mut wagons: Vec<&Wagon> = self
            .wagons
            .iter()
            .filter(|w| w.status == crate::domain::WagonStatus::Available)
            .collect();
        wagons.sort_by(|a, b| {
            b.capacity_mt
                .partial_cmp(&a.capacity_mt)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.wagon_number.cmp(&b.wagon_number))
        });
        wagons
    }
}
