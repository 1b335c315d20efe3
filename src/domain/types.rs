// ==========================================
// 铁路车皮编组优化系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单优先级 (Order Priority)
// ==========================================
// 顺序: High < Medium < Low（Ord 用于排序，High 排最前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPriority {
    High,   // 高优先级
    Medium, // 中优先级
    Low,    // 低优先级
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderPriority::High => write!(f, "HIGH"),
            OrderPriority::Medium => write!(f, "MEDIUM"),
            OrderPriority::Low => write!(f, "LOW"),
        }
    }
}

impl OrderPriority {
    /// 从字符串解析优先级（未知值回落为 Medium）
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "HIGH" => OrderPriority::High,
            "LOW" => OrderPriority::Low,
            _ => OrderPriority::Medium,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderPriority::High => "HIGH",
            OrderPriority::Medium => "MEDIUM",
            OrderPriority::Low => "LOW",
        }
    }
}

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 状态机单向推进: PENDING → ASSIGNED → SHIPPED → DELIVERED
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,   // 待编组
    Assigned,  // 已编入编组
    Shipped,   // 已发运
    Delivered, // 已送达
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Assigned => write!(f, "ASSIGNED"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
        }
    }
}

impl OrderStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ASSIGNED" => OrderStatus::Assigned,
            "SHIPPED" => OrderStatus::Shipped,
            "DELIVERED" => OrderStatus::Delivered,
            _ => OrderStatus::Pending,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// 检查状态转换是否合法（只允许单向推进）
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        matches!(
            (self, target),
            (OrderStatus::Pending, OrderStatus::Assigned)
                | (OrderStatus::Assigned, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }
}

// ==========================================
// 车皮状态 (Wagon Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WagonStatus {
    Available,   // 可用
    Loaded,      // 已装车（已被编组占用）
    InTransit,   // 在途
    Maintenance, // 检修
}

impl fmt::Display for WagonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagonStatus::Available => write!(f, "AVAILABLE"),
            WagonStatus::Loaded => write!(f, "LOADED"),
            WagonStatus::InTransit => write!(f, "IN_TRANSIT"),
            WagonStatus::Maintenance => write!(f, "MAINTENANCE"),
        }
    }
}

impl WagonStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOADED" => WagonStatus::Loaded,
            "IN_TRANSIT" => WagonStatus::InTransit,
            "MAINTENANCE" => WagonStatus::Maintenance,
            _ => WagonStatus::Available,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WagonStatus::Available => "AVAILABLE",
            WagonStatus::Loaded => "LOADED",
            WagonStatus::InTransit => "IN_TRANSIT",
            WagonStatus::Maintenance => "MAINTENANCE",
        }
    }
}

// ==========================================
// 编组状态 (Rake Status)
// ==========================================
// 编组生命周期: PLANNED → LOADING → IN_TRANSIT → UNLOADING → DELIVERED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RakeStatus {
    Planned,   // 已规划
    Loading,   // 装车中
    InTransit, // 在途
    Unloading, // 卸车中
    Delivered, // 已送达
}

impl fmt::Display for RakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RakeStatus::Planned => write!(f, "PLANNED"),
            RakeStatus::Loading => write!(f, "LOADING"),
            RakeStatus::InTransit => write!(f, "IN_TRANSIT"),
            RakeStatus::Unloading => write!(f, "UNLOADING"),
            RakeStatus::Delivered => write!(f, "DELIVERED"),
        }
    }
}

impl RakeStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOADING" => RakeStatus::Loading,
            "IN_TRANSIT" => RakeStatus::InTransit,
            "UNLOADING" => RakeStatus::Unloading,
            "DELIVERED" => RakeStatus::Delivered,
            _ => RakeStatus::Planned,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RakeStatus::Planned => "PLANNED",
            RakeStatus::Loading => "LOADING",
            RakeStatus::InTransit => "IN_TRANSIT",
            RakeStatus::Unloading => "UNLOADING",
            RakeStatus::Delivered => "DELIVERED",
        }
    }

    /// 是否为活跃状态（活跃编组独占其车皮）
    pub fn is_active(&self) -> bool {
        !matches!(self, RakeStatus::Delivered)
    }
}

// ==========================================
// 运输方式 (Transport Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Rail,     // 铁路
    Road,     // 公路
    Combined, // 铁路+公路联运
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Rail => write!(f, "RAIL"),
            TransportMode::Road => write!(f, "ROAD"),
            TransportMode::Combined => write!(f, "COMBINED"),
        }
    }
}

// ==========================================
// 路线优化准则 (Route Criterion)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteCriterion {
    Cost,     // 成本最低
    Time,     // 时间最短
    Distance, // 距离最短
    Emission, // 排放最低
}

impl fmt::Display for RouteCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteCriterion::Cost => write!(f, "cost"),
            RouteCriterion::Time => write!(f, "time"),
            RouteCriterion::Distance => write!(f, "distance"),
            RouteCriterion::Emission => write!(f, "emission"),
        }
    }
}

impl RouteCriterion {
    /// 从字符串解析准则
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cost" => Some(RouteCriterion::Cost),
            "time" => Some(RouteCriterion::Time),
            "distance" => Some(RouteCriterion::Distance),
            "emission" => Some(RouteCriterion::Emission),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Assigned));
        assert!(OrderStatus::Assigned.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        // 禁止回退
        assert!(!OrderStatus::Assigned.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
        // 禁止跳级
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(OrderPriority::High < OrderPriority::Medium);
        assert!(OrderPriority::Medium < OrderPriority::Low);
    }

    #[test]
    fn test_rake_status_active() {
        assert!(RakeStatus::Planned.is_active());
        assert!(RakeStatus::Loading.is_active());
        assert!(RakeStatus::InTransit.is_active());
        assert!(RakeStatus::Unloading.is_active());
        assert!(!RakeStatus::Delivered.is_active());
    }

    #[test]
    fn test_db_str_roundtrip() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Assigned,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::from_str(s.to_db_str()), s);
        }
        for s in [
            WagonStatus::Available,
            WagonStatus::Loaded,
            WagonStatus::InTransit,
            WagonStatus::Maintenance,
        ] {
            assert_eq!(WagonStatus::from_str(s.to_db_str()), s);
        }
    }
}
