// ==========================================
// 铁路车皮编组优化系统 - 优化器配置
// ==========================================
// 职责: 优化阈值 / 费率表 / 距离表 / 排放因子
// 说明: 所有参数均可通过 JSON 配置文件覆盖（#[serde(default)]），
//       兼容性阈值与装箱启发式是可配置参数而非硬编码假设
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// 路线距离表
// ==========================================

/// 路线距离条目（起点 → 目的地）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDistance {
    /// 起点（与料场 location 对齐）
    pub origin: String,

    /// 目的地
    pub destination: String,

    /// 距离（公里）
    pub distance_km: f64,
}

// ==========================================
// 优化器配置
// ==========================================

/// 优化器配置
///
/// 所有字段带默认值；缺省字段在反序列化时回落到默认。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// 最低兼容性阈值，评分低于该值的组合视为不可行
    #[serde(default = "default_min_compatibility_score")]
    pub min_compatibility_score: f64,

    /// 车皮利用率下限，低于该值标记为低效（提交人工复核）
    #[serde(default = "default_min_wagon_utilization")]
    pub min_wagon_utilization: f64,

    /// 滞期免费时长（小时）
    #[serde(default = "default_free_time_hours")]
    pub free_time_hours: f64,

    /// 滞期费率（元/车皮/小时）
    #[serde(default = "default_demurrage_rate")]
    pub demurrage_rate_per_wagon_hour: f64,

    /// 装车基础成本（元/吨）
    #[serde(default = "default_loading_cost_per_mt")]
    pub loading_cost_per_mt: f64,

    /// 装车点拥堵系数（装车成本随利用率的放大倍率）
    #[serde(default = "default_congestion_factor")]
    pub congestion_factor: f64,

    /// 铁路运价（元/吨/公里）
    #[serde(default = "default_rail_rate")]
    pub rail_rate_per_mt_km: f64,

    /// 公路运价（元/吨/公里）
    #[serde(default = "default_road_rate")]
    pub road_rate_per_mt_km: f64,

    /// 铁路平均运行速度（公里/小时）
    #[serde(default = "default_rail_speed")]
    pub rail_speed_kmph: f64,

    /// 公路平均运行速度（公里/小时）
    #[serde(default = "default_road_speed")]
    pub road_speed_kmph: f64,

    /// 铁路排放因子（kg CO2/吨/公里）
    #[serde(default = "default_rail_emission")]
    pub rail_emission_kg_per_mt_km: f64,

    /// 公路排放因子（kg CO2/吨/公里）
    #[serde(default = "default_road_emission")]
    pub road_emission_kg_per_mt_km: f64,

    /// 联运换装附加时间（小时）
    #[serde(default = "default_transshipment_hours")]
    pub transshipment_hours: f64,

    /// 联运换装附加成本（元/吨）
    #[serde(default = "default_transshipment_cost")]
    pub transshipment_cost_per_mt: f64,

    /// 紧急订单窗口（天），期限在窗口内的待编组订单计入预警
    #[serde(default = "default_urgent_window_days")]
    pub urgent_window_days: i64,

    /// 装车吞吐（吨/小时/装车点，满负荷时）
    #[serde(default = "default_loading_throughput")]
    pub loading_throughput_mt_per_hour: f64,

    /// 距离表未命中时的默认距离（公里）
    #[serde(default = "default_distance_km")]
    pub default_distance_km: f64,

    /// 路线距离表
    #[serde(default = "default_route_distances")]
    pub route_distances: Vec<RouteDistance>,

    /// 外部推理调用超时（毫秒），超时降级为模板推理
    #[serde(default = "default_reasoning_timeout_ms")]
    pub reasoning_timeout_ms: u64,
}

fn default_min_compatibility_score() -> f64 {
    0.5
}
fn default_min_wagon_utilization() -> f64 {
    0.70
}
fn default_free_time_hours() -> f64 {
    6.0
}
fn default_demurrage_rate() -> f64 {
    150.0
}
fn default_loading_cost_per_mt() -> f64 {
    40.0
}
fn default_congestion_factor() -> f64 {
    0.8
}
fn default_rail_rate() -> f64 {
    1.2
}
fn default_road_rate() -> f64 {
    2.5
}
fn default_rail_speed() -> f64 {
    45.0
}
fn default_road_speed() -> f64 {
    40.0
}
fn default_rail_emission() -> f64 {
    0.022
}
fn default_road_emission() -> f64 {
    0.062
}
fn default_transshipment_hours() -> f64 {
    8.0
}
fn default_transshipment_cost() -> f64 {
    15.0
}
fn default_urgent_window_days() -> i64 {
    3
}
fn default_loading_throughput() -> f64 {
    500.0
}
fn default_distance_km() -> f64 {
    750.0
}
fn default_reasoning_timeout_ms() -> u64 {
    3_000
}

/// 默认距离表（厂区料场 → 主要目的地）
fn default_route_distances() -> Vec<RouteDistance> {
    let entries = [
        ("Plant North", "Mumbai", 1350.0),
        ("Plant North", "Delhi", 420.0),
        ("Plant North", "Kolkata", 760.0),
        ("Plant North", "Chennai", 1680.0),
        ("Plant South", "Mumbai", 1280.0),
        ("Plant South", "Delhi", 480.0),
        ("Plant South", "Kolkata", 720.0),
        ("Plant South", "Chennai", 1620.0),
        ("Plant East", "Mumbai", 1420.0),
        ("Plant East", "Delhi", 460.0),
        ("Plant East", "Kolkata", 680.0),
        ("Plant East", "Chennai", 1710.0),
    ];
    entries
        .iter()
        .map(|(origin, destination, km)| RouteDistance {
            origin: origin.to_string(),
            destination: destination.to_string(),
            distance_km: *km,
        })
        .collect()
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        // 空 JSON 反序列化 = 全默认值
        serde_json::from_str("{}").expect("默认配置构造失败")
    }
}

impl OptimizerConfig {
    /// 从 JSON 文件加载配置（缺省字段回落默认值）
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("读取配置文件失败 {}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("解析配置文件失败: {}", e))
    }

    /// 查询起点→目的地距离（未命中回落默认距离）
    pub fn distance_km(&self, origin: &str, destination: &str) -> f64 {
        self.route_distances
            .iter()
            .find(|r| r.origin == origin && r.destination == destination)
            .map(|r| r.distance_km)
            .unwrap_or(self.default_distance_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OptimizerConfig::default();
        assert_eq!(config.min_compatibility_score, 0.5);
        assert_eq!(config.min_wagon_utilization, 0.70);
        assert_eq!(config.urgent_window_days, 3);
        assert!(!config.route_distances.is_empty());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{"min_compatibility_score": 0.6}"#).unwrap();
        assert_eq!(config.min_compatibility_score, 0.6);
        assert_eq!(config.min_wagon_utilization, 0.70);
    }

    #[test]
    fn test_distance_lookup() {
        let config = OptimizerConfig::default();
        assert_eq!(config.distance_km("Plant North", "Delhi"), 420.0);
        // 未命中回落默认距离，绝不报错
        assert_eq!(config.distance_km("Unknown", "Nowhere"), 750.0);
    }
}
