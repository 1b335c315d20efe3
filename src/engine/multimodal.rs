// ==========================================
// 铁路车皮编组优化系统 - 多式联运比选引擎
// ==========================================
// 职责: 铁路/公路/联运三种方式的成本、时效、排放比选
// 红线: 同一输入同一结果; 准则同分时以成本低者胜出
// ==========================================

use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::domain::{RouteCriterion, TransportMode};

/// 单一运输方式方案
#[derive(Debug, Clone, Serialize)]
pub struct ModeOption {
    pub mode: TransportMode,
    pub distance_km: f64,
    pub cost: f64,
    pub time_hours: f64,
    pub co2_kg: f64,
}

/// 三方式比选结果
#[derive(Debug, Clone, Serialize)]
pub struct ModeComparison {
    pub origin: String,
    pub destination: String,
    pub quantity_mt: f64,
    pub options: Vec<ModeOption>,
    /// 各准则下的最优方式
    pub cheapest: TransportMode,
    pub fastest: TransportMode,
    pub greenest: TransportMode,
}

/// 碳排放分析结果
#[derive(Debug, Clone, Serialize)]
pub struct Co2Analysis {
    pub origin: String,
    pub destination: String,
    pub quantity_mt: f64,
    pub options: Vec<ModeOption>,
    pub best_mode: TransportMode,
    pub worst_mode: TransportMode,
    /// 最差与最优方式的排放差 (kg)
    pub max_saving_kg: f64,
}

/// 多式联运比选引擎
pub struct RouteComparator {
    config: OptimizerConfig,
}

impl RouteComparator {
    pub fn new(config: OptimizerConfig) -> Self {
        RouteComparator { config }
    }

    /// 构造某一方式的完整方案
    fn option(&self, mode: TransportMode, distance_km: f64, quantity_mt: f64) -> ModeOption {
        let cfg = &self.config;
        let (cost, time_hours, co2_kg) = match mode {
            TransportMode::Rail => (
                distance_km * quantity_mt * cfg.rail_rate_per_mt_km,
                distance_km / cfg.rail_speed_kmph.max(1.0),
                distance_km * quantity_mt * cfg.rail_emission_kg_per_mt_km,
            ),
            TransportMode::Road => (
                distance_km * quantity_mt * cfg.road_rate_per_mt_km,
                distance_km / cfg.road_speed_kmph.max(1.0),
                distance_km * quantity_mt * cfg.road_emission_kg_per_mt_km,
            ),
            // 联运: 铁路段 70% + 公路段 30% + 转运环节
            TransportMode::Combined => {
                let rail_km = distance_km * 0.7;
                let road_km = distance_km * 0.3;
                let cost = rail_km * quantity_mt * cfg.rail_rate_per_mt_km
                    + road_km * quantity_mt * cfg.road_rate_per_mt_km
                    + quantity_mt * cfg.transshipment_cost_per_mt;
                let time = rail_km / cfg.rail_speed_kmph.max(1.0)
                    + road_km / cfg.road_speed_kmph.max(1.0)
                    + cfg.transshipment_hours;
                let co2 = rail_km * quantity_mt * cfg.rail_emission_kg_per_mt_km
                    + road_km * quantity_mt * cfg.road_emission_kg_per_mt_km;
                (cost, time, co2)
            }
        };
        ModeOption {
            mode,
            distance_km,
            cost,
            time_hours,
            co2_kg,
        }
    }

    fn options(&self, origin: &str, destination: &str, quantity_mt: f64) -> Vec<ModeOption> {
        let distance = self.config.distance_km(origin, destination);
        vec![
            self.option(TransportMode::Rail, distance, quantity_mt),
            self.option(TransportMode::Road, distance, quantity_mt),
            self.option(TransportMode::Combined, distance, quantity_mt),
        ]
    }

    /// 三方式全量比选
    pub fn compare_modes(&self, origin: &str, destination: &str, quantity_mt: f64) -> ModeComparison {
        let options = self.options(origin, destination, quantity_mt);
        ModeComparison {
            origin: origin.to_string(),
            destination: destination.to_string(),
            quantity_mt,
            cheapest: pick_best(&options, RouteCriterion::Cost).mode,
            fastest: pick_best(&options, RouteCriterion::Time).mode,
            greenest: pick_best(&options, RouteCriterion::Emission).mode,
            options,
        }
    }

    /// 按指定准则选最优方式
    pub fn optimize_route(
        &self,
        origin: &str,
        destination: &str,
        quantity_mt: f64,
        criterion: RouteCriterion,
    ) -> ModeOption {
        let options = self.options(origin, destination, quantity_mt);
        pick_best(&options, criterion).clone()
    }

    /// 碳排放对比分析
    pub fn co2_analysis(&self, origin: &str, destination: &str, quantity_mt: f64) -> Co2Analysis {
        let options = self.options(origin, destination, quantity_mt);
        let best = pick_best(&options, RouteCriterion::Emission).clone();
        let worst = options
            .iter()
            .max_by(|a, b| {
                a.co2_kg
                    .partial_cmp(&b.co2_kg)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
            .unwrap_or_else(|| best.clone());
        Co2Analysis {
            origin: origin.to_string(),
            destination: destination.to_string(),
            quantity_mt,
            best_mode: best.mode,
            worst_mode: worst.mode,
            max_saving_kg: (worst.co2_kg - best.co2_kg).max(0.0),
            options,
        }
    }
}

/// 按准则取最优方案, 同分时以成本低者胜出, 再同分按方式名取小
fn pick_best(options: &[ModeOption], criterion: RouteCriterion) -> &ModeOption {
    let key = |o: &ModeOption| -> f64 {
        match criterion {
            RouteCriterion::Cost => o.cost,
            RouteCriterion::Time => o.time_hours,
            RouteCriterion::Distance => o.distance_km,
            RouteCriterion::Emission => o.co2_kg,
        }
    };
    options
        .iter()
        .min_by(|a, b| {
            key(a)
                .partial_cmp(&key(b))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.cost
                        .partial_cmp(&b.cost)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.mode.to_string().cmp(&b.mode.to_string()))
        })
        .unwrap_or(&options[0])
}
