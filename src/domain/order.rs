// ==========================================
// 铁路车皮编组优化系统 - 订单实体
// ==========================================
// 职责: 发运订单主数据
// 不变式: quantity_mt > 0; 创建时 deadline 在未来; 状态单向推进
// ==========================================

use crate::domain::types::{OrderPriority, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 发运订单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 订单ID
    pub id: String,

    /// 客户名称
    pub customer_name: String,

    /// 物料ID
    pub material_id: String,

    /// 发运量（吨）
    pub quantity_mt: f64,

    /// 目的地
    pub destination: String,

    /// 优先级
    pub priority: OrderPriority,

    /// 交付期限
    pub deadline: DateTime<Utc>,

    /// 状态
    pub status: OrderStatus,

    /// 逾期违约金（元/天）
    pub penalty_per_day: f64,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// 创建新订单（校验不变式）
    ///
    /// # 返回
    /// - Ok(Order): 订单实体
    /// - Err(String): 校验失败原因
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        customer_name: String,
        material_id: String,
        quantity_mt: f64,
        destination: String,
        priority: OrderPriority,
        deadline: DateTime<Utc>,
        penalty_per_day: f64,
    ) -> Result<Self, String> {
        let now = Utc::now();
        Self::validate(quantity_mt, deadline, penalty_per_day, now)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            customer_name,
            material_id,
            quantity_mt,
            destination,
            priority,
            deadline,
            status: OrderStatus::Pending,
            penalty_per_day,
            created_at: now,
        })
    }

    /// 订单不变式校验
    pub fn validate(
        quantity_mt: f64,
        deadline: DateTime<Utc>,
        penalty_per_day: f64,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        if quantity_mt <= 0.0 {
            return Err(format!("发运量必须大于0（quantity_mt={}）", quantity_mt));
        }
        if deadline <= now {
            return Err(format!("交付期限必须在未来（deadline={}）", deadline));
        }
        if penalty_per_day < 0.0 {
            return Err(format!("违约金不能为负（penalty_per_day={}）", penalty_per_day));
        }
        Ok(())
    }

    /// 距离交付期限的天数（已逾期为负数）
    pub fn days_until_deadline(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_order_invariants() {
        let now = Utc::now();
        let future = now + Duration::days(5);

        // 正常创建
        assert!(Order::validate(100.0, future, 1000.0, now).is_ok());

        // 发运量必须为正
        assert!(Order::validate(0.0, future, 1000.0, now).is_err());
        assert!(Order::validate(-10.0, future, 1000.0, now).is_err());

        // 交付期限必须在未来
        assert!(Order::validate(100.0, now - Duration::days(1), 1000.0, now).is_err());

        // 违约金不能为负
        assert!(Order::validate(100.0, future, -1.0, now).is_err());
    }

    #[test]
    fn test_days_until_deadline() {
        let order = Order::new(
            "测试客户".to_string(),
            "M001".to_string(),
            500.0,
            "Delhi".to_string(),
            OrderPriority::High,
            Utc::now() + Duration::days(3),
            5000.0,
        )
        .unwrap();

        let days = order.days_until_deadline(Utc::now());
        assert!((2..=3).contains(&days));
    }
}
