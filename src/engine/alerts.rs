// ==========================================
// 铁路车皮编组优化系统 - 预警引擎
// ==========================================
// 职责: 滞期费、违约金风险与装车点拥堵的事前预警
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::domain::{LoadingPoint, Order, OrderStatus, RakePlan, RakeStatus};

/// 滞期费预警
#[derive(Debug, Clone, Serialize)]
pub struct DemurrageAlert {
    pub rake_id: String,
    pub rake_number: String,
    pub loading_point_id: String,
    /// 已占用时长 (小时)
    pub held_hours: f64,
    /// 免费时长 (小时)
    pub free_time_hours: f64,
    pub wagon_count: usize,
    /// 已产生滞期费 (元)
    pub accrued_cost: f64,
}

/// 违约金风险预警
#[derive(Debug, Clone, Serialize)]
pub struct PenaltyAlert {
    pub order_id: String,
    pub customer_name: String,
    pub destination: String,
    pub deadline: DateTime<Utc>,
    /// 距交期天数 (已逾期为负)
    pub days_until_deadline: i64,
    pub penalty_per_day: f64,
    /// 已逾期订单的累计风险敞口 (元)
    pub accrued_exposure: f64,
    /// 已逾期标志
    pub overdue: bool,
}

/// 装车点调度建议
#[derive(Debug, Clone, Serialize)]
pub struct LoadingPointOptimization {
    pub loading_point_id: String,
    pub name: String,
    pub current_utilization: f64,
    /// 排队编组数 (计划/装车中)
    pub queue_length: usize,
    /// 预计清空排队所需时长 (小时)
    pub projected_wait_hours: f64,
    pub recommendations: Vec<String>,
}

/// 预警引擎: 只读分析, 不改数据
pub struct AlertEngine {
    config: OptimizerConfig,
}

impl AlertEngine {
    pub fn new(config: OptimizerConfig) -> Self {
        AlertEngine { config }
    }

    /// 滞期费预警: 仍滞留装车点 (计划/装车中) 且超出免费时长的编组
    pub fn demurrage_alerts(&self, rakes: &[RakePlan], now: DateTime<Utc>) -> Vec<DemurrageAlert> {
        let mut alerts: Vec<DemurrageAlert> = rakes
            .iter()
            .filter(|r| matches!(r.status, RakeStatus::Planned | RakeStatus::Loading))
            .filter_map(|rake| {
                let held_hours = (now - rake.formation_date).num_minutes() as f64 / 60.0;
                let excess = held_hours - self.config.free_time_hours;
                if excess <= 0.0 {
                    return None;
                }
                let wagon_count = rake.wagon_ids.len();
                Some(DemurrageAlert {
                    rake_id: rake.id.clone(),
                    rake_number: rake.rake_number.clone(),
                    loading_point_id: rake.loading_point_id.clone(),
                    held_hours,
                    free_time_hours: self.config.free_time_hours,
                    wagon_count,
                    accrued_cost: excess
                        * self.config.demurrage_rate_per_wagon_hour
                        * wagon_count as f64,
                })
            })
            .collect();
        alerts.sort_by(|a, b| {
            b.accrued_cost
                .partial_cmp(&a.accrued_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.rake_number.cmp(&b.rake_number))
        });
        alerts
    }

    /// 在场编组的滞期费总额
    pub fn total_demurrage_cost(&self, rakes: &[RakePlan], now: DateTime<Utc>) -> f64 {
        self.demurrage_alerts(rakes, now)
            .iter()
            .map(|a| a.accrued_cost)
            .sum()
    }

    /// 违约金风险预警: 交期临近 (紧急窗口内) 或已逾期的待处理订单
    pub fn penalty_alerts(&self, orders: &[Order], now: DateTime<Utc>) -> Vec<PenaltyAlert> {
        let mut alerts: Vec<PenaltyAlert> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .filter_map(|order| {
                let days = order.days_until_deadline(now);
                if days > self.config.urgent_window_days {
                    return None;
                }
                let overdue = days < 0;
                Some(PenaltyAlert {
                    order_id: order.id.clone(),
                    customer_name: order.customer_name.clone(),
                    destination: order.destination.clone(),
                    deadline: order.deadline,
                    days_until_deadline: days,
                    penalty_per_day: order.penalty_per_day,
                    accrued_exposure: if overdue {
                        (-days) as f64 * order.penalty_per_day
                    } else {
                        0.0
                    },
                    overdue,
                })
            })
            .collect();
        alerts.sort_by(|a, b| {
            a.days_until_deadline
                .cmp(&b.days_until_deadline)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        alerts
    }

    /// 装车点调度建议: 按排队深度与占用率给出分流建议
    pub fn loading_point_optimization(
        &self,
        loading_points: &[LoadingPoint],
        rakes: &[RakePlan],
    ) -> Vec<LoadingPointOptimization> {
        let mut results: Vec<LoadingPointOptimization> = loading_points
            .iter()
            .map(|lp| {
                let queue_length = rakes
                    .iter()
                    .filter(|r| {
                        r.loading_point_id == lp.id
                            && matches!(r.status, RakeStatus::Planned | RakeStatus::Loading)
                    })
                    .count();
                let per_day = lp.capacity_rakes_per_day.max(0.1);
                let projected_wait_hours = queue_length as f64 / per_day * 24.0;

                let mut recommendations = Vec::new();
                if lp.current_utilization >= 0.9 {
                    recommendations.push(format!(
                        "{} 占用率 {:.0}%, 建议将新编组分流至其他装车点",
                        lp.name,
                        lp.current_utilization * 100.0
                    ));
                }
                if projected_wait_hours > self.config.free_time_hours {
                    recommendations.push(format!(
                        "排队 {} 列预计等待 {:.1} 小时, 超出免费时长, 滞期费风险高",
                        queue_length, projected_wait_hours
                    ));
                }
                if recommendations.is_empty() {
                    recommendations.push(format!("{} 负荷正常", lp.name));
                }

                LoadingPointOptimization {
                    loading_point_id: lp.id.clone(),
                    name: lp.name.clone(),
                    current_utilization: lp.current_utilization,
                    queue_length,
                    projected_wait_hours,
                    recommendations,
                }
            })
            .collect();
        results.sort_by(|a, b| {
            b.queue_length
                .cmp(&a.queue_length)
                .then_with(|| a.loading_point_id.cmp(&b.loading_point_id))
        });
        results
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CostBreakdown, OrderPriority};
    use chrono::Duration;

    fn engine() -> AlertEngine {
        AlertEngine::new(OptimizerConfig::default())
    }

    fn rake(status: RakeStatus, formed_hours_ago: i64, wagons: usize) -> RakePlan {
        let now = Utc::now();
        RakePlan {
            id: uuid::Uuid::new_v4().to_string(),
            rake_number: format!("RAKE-{:03}", wagons),
            wagon_ids: (0..wagons).map(|i| format!("w-{}", i)).collect(),
            order_ids: vec!["o-1".to_string()],
            loading_point_id: "lp-1".to_string(),
            route: "Delhi".to_string(),
            cost: CostBreakdown::new(1000.0, 2000.0, 0.0, 0.0),
            status,
            reasoning: String::new(),
            formation_date: now - Duration::hours(formed_hours_ago),
        }
    }

    // 测试1: 超免费时长且在场的编组触发滞期预警
    #[test]
    fn test_demurrage_alert_for_held_rake() {
        let rakes = vec![rake(RakeStatus::Loading, 10, 17)];
        let alerts = engine().demurrage_alerts(&rakes, Utc::now());

        assert_eq!(alerts.len(), 1);
        // 超出 4 小时 x 150 元 x 17 节
        assert!((alerts[0].accrued_cost - 4.0 * 150.0 * 17.0).abs() < 1.0);
    }

    // 测试2: 在途/已送达编组不计滞期
    #[test]
    fn test_no_demurrage_for_departed_rakes() {
        let rakes = vec![
            rake(RakeStatus::InTransit, 48, 17),
            rake(RakeStatus::Delivered, 96, 17),
            rake(RakeStatus::Planned, 2, 17), // 未超免费时长
        ];
        assert!(engine().demurrage_alerts(&rakes, Utc::now()).is_empty());
        assert_eq!(engine().total_demurrage_cost(&rakes, Utc::now()), 0.0);
    }

    // 测试3: 紧急窗口内与已逾期订单触发违约金预警
    #[test]
    fn test_penalty_alerts_window_and_overdue() {
        let now = Utc::now();
        let mk = |days: i64, customer: &str| {
            let mut o = Order::new(
                customer.to_string(),
                "m-1".to_string(),
                100.0,
                "Delhi".to_string(),
                OrderPriority::High,
                now + Duration::days(30),
                5_000.0,
            )
            .unwrap();
            o.deadline = now + Duration::days(days);
            o
        };
        let orders = vec![mk(2, "紧急客户"), mk(-3, "逾期客户"), mk(10, "宽裕客户")];
        let alerts = engine().penalty_alerts(&orders, now);

        assert_eq!(alerts.len(), 2);
        // 逾期订单排最前且有风险敞口
        assert_eq!(alerts[0].customer_name, "逾期客户");
        assert!(alerts[0].overdue);
        assert!((alerts[0].accrued_exposure - 3.0 * 5_000.0).abs() < 1e-6);
        assert!(!alerts[1].overdue);
        assert_eq!(alerts[1].accrued_exposure, 0.0);
    }

    // 测试4: 高占用装车点得到分流建议, 排队深者排前
    #[test]
    fn test_loading_point_recommendations() {
        let lp_busy = LoadingPoint::new("LP-忙".to_string(), "yard-1".to_string(), 2.0, 0.95);
        let lp_idle = LoadingPoint::new("LP-闲".to_string(), "yard-1".to_string(), 3.0, 0.1);
        let mut queued = rake(RakeStatus::Planned, 1, 5);
        queued.loading_point_id = lp_busy.id.clone();

        let results = engine().loading_point_optimization(&[lp_idle.clone(), lp_busy.clone()], &[queued]);
        assert_eq!(results[0].loading_point_id, lp_busy.id);
        assert_eq!(results[0].queue_length, 1);
        assert!(results[0]
            .recommendations
            .iter()
            .any(|r| r.contains("分流")));
        assert!(results[1].recommendations.iter().any(|r| r.contains("负荷正常")));
    }
}
