// ==========================================
// 铁路车皮编组优化系统 - 车皮利用率引擎
// ==========================================
// 职责: 逐皮利用率核算与编组补载建议
// 红线: 任何车皮装载量不得超过标载, 利用率不得超过 100%
// ==========================================

use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::domain::{Order, OrderStatus, Wagon};
use crate::engine::compatibility::ConstraintResolver;
use crate::engine::snapshot::PlanningSnapshot;

/// 单节车皮的利用率
#[derive(Debug, Clone, Serialize)]
pub struct WagonUtilization {
    pub wagon_id: String,
    pub wagon_number: String,
    pub wagon_type: String,
    pub capacity_mt: f64,
    pub assigned_mt: f64,
    pub utilization_pct: f64,
    /// 低于最低利用率阈值
    pub inefficient: bool,
}

/// 编组利用率报告
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationReport {
    pub per_wagon: Vec<WagonUtilization>,
    pub average_utilization_pct: f64,
    pub inefficient_count: usize,
    /// 剩余可装容量 (吨)
    pub spare_capacity_mt: f64,
}

/// 补载建议: 利用编组剩余容量装入待处理订单
#[derive(Debug, Clone, Serialize)]
pub struct TopUpSuggestion {
    pub order_id: String,
    pub customer_name: String,
    pub quantity_mt: f64,
    pub spare_before_mt: f64,
    pub spare_after_mt: f64,
}

/// 车皮利用率引擎
pub struct UtilizationEngine {
    min_utilization: f64,
}

impl UtilizationEngine {
    pub fn new(config: &OptimizerConfig) -> Self {
        UtilizationEngine {
            min_utilization: config.min_wagon_utilization,
        }
    }

    /// 逐皮利用率核算: 载重降序贪心装填, 不超标载
    pub fn analyze_rake(&self, wagons: &[Wagon], total_quantity_mt: f64) -> UtilizationReport {
        let mut sorted: Vec<&Wagon> = wagons.iter().collect();
        sorted.sort_by(|a, b| {
            b.capacity_mt
                .partial_cmp(&a.capacity_mt)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.wagon_number.cmp(&b.wagon_number))
        });

        let mut remaining = total_quantity_mt.max(0.0);
        let mut per_wagon = Vec::with_capacity(sorted.len());
        for wagon in sorted {
            let assigned = remaining.min(wagon.capacity_mt);
            remaining -= assigned;
            let utilization = if wagon.capacity_mt > 0.0 {
                assigned / wagon.capacity_mt
            } else {
                0.0
            };
            per_wagon.push(WagonUtilization {
                wagon_id: wagon.id.clone(),
                wagon_number: wagon.wagon_number.clone(),
                wagon_type: wagon.wagon_type.clone(),
                capacity_mt: wagon.capacity_mt,
                assigned_mt: assigned,
                utilization_pct: (utilization * 100.0).min(100.0),
                inefficient: utilization < self.min_utilization,
            });
        }

        let total_capacity: f64 = per_wagon.iter().map(|w| w.capacity_mt).sum();
        let total_assigned: f64 = per_wagon.iter().map(|w| w.assigned_mt).sum();
        let average = if total_capacity > 0.0 {
            (total_assigned / total_capacity * 100.0).min(100.0)
        } else {
            0.0
        };
        UtilizationReport {
            inefficient_count: per_wagon.iter().filter(|w| w.inefficient).count(),
            spare_capacity_mt: (total_capacity - total_assigned).max(0.0),
            average_utilization_pct: average,
            per_wagon,
        }
    }

    /// 补载建议: 在待处理订单中挑选同目的地且车皮类型相容的订单填充剩余容量
    ///
    /// 建议按 (优先级, 交期, ID) 顺序生成, 累计量不超过剩余容量
    pub fn suggest_top_ups(
        &self,
        snapshot: &PlanningSnapshot,
        resolver: &ConstraintResolver,
        destination: &str,
        wagon_type: &str,
        spare_capacity_mt: f64,
    ) -> Vec<TopUpSuggestion> {
        let mut candidates: Vec<&Order> = snapshot
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending && o.destination == destination)
            .filter(|o| {
                snapshot
                    .material(&o.material_id)
                    .map(|m| {
                        resolver
                            .resolve(&m.material_type, wagon_type, destination)
                            .feasible
                    })
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.deadline.cmp(&b.deadline))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut spare = spare_capacity_mt;
        let mut suggestions = Vec::new();
        for order in candidates {
            if order.quantity_mt <= spare {
                suggestions.push(TopUpSuggestion {
                    order_id: order.id.clone(),
                    customer_name: order.customer_name.clone(),
                    quantity_mt: order.quantity_mt,
                    spare_before_mt: spare,
                    spare_after_mt: spare - order.quantity_mt,
                });
                spare -= order.quantity_mt;
            }
        }
        suggestions
    }
}
