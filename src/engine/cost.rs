// ==========================================
// 铁路车皮编组优化系统 - 成本核算模型
// ==========================================
// 职责: 装车/运输/滞期/违约金四项成本的确定性核算
// 红线: 同一输入必须得到同一成本, 禁止引入随机量
// ==========================================

use crate::config::OptimizerConfig;
use crate::domain::{CostBreakdown, TransportMode};

/// 单次成本核算的输入
#[derive(Debug, Clone)]
pub struct CostContext {
    /// 装运总量 (吨)
    pub quantity_mt: f64,
    /// 运距 (公里)
    pub distance_km: f64,
    /// 运输方式
    pub mode: TransportMode,
    /// 装车点当前占用率 [0,1]
    pub loading_point_utilization: f64,
    /// 车皮数
    pub wagon_count: usize,
    /// 各订单的 (距交期天数, 日违约金), 用于违约金风险核算
    pub order_deadlines: Vec<(i64, f64)>,
}

/// 成本时间线: 排队/装车/在途的核算中间量
#[derive(Debug, Clone)]
pub struct CostTimeline {
    /// 排队等待 (小时)
    pub queue_wait_hours: f64,
    /// 装车作业 (小时)
    pub loading_hours: f64,
    /// 在途 (小时)
    pub transit_hours: f64,
    /// 预计全程天数 (向上取整)
    pub projected_days: i64,
}

/// 成本核算模型: 纯函数核, 不访问数据库
pub struct CostModel {
    config: OptimizerConfig,
}

impl CostModel {
    pub fn new(config: OptimizerConfig) -> Self {
        CostModel { config }
    }

    /// 运输单价 (元/吨公里)
    fn rate_per_mt_km(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Rail => self.config.rail_rate_per_mt_km,
            TransportMode::Road => self.config.road_rate_per_mt_km,
            // 联运按铁路 70% + 公路 30% 分段计价
            TransportMode::Combined => {
                self.config.rail_rate_per_mt_km * 0.7 + self.config.road_rate_per_mt_km * 0.3
            }
        }
    }

    /// 运输速度 (公里/小时)
    fn speed_kmph(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Rail => self.config.rail_speed_kmph,
            TransportMode::Road => self.config.road_speed_kmph,
            TransportMode::Combined => {
                self.config.rail_speed_kmph * 0.7 + self.config.road_speed_kmph * 0.3
            }
        }
    }

    /// 核算时间线: 排队 + 装车 + 在途
    pub fn timeline(&self, ctx: &CostContext) -> CostTimeline {
        // 占用率线性折算排队时长: 满负荷按一天排队计
        let queue_wait_hours = ctx.loading_point_utilization.clamp(0.0, 1.0) * 24.0;
        let loading_hours = if self.config.loading_throughput_mt_per_hour > 0.0 {
            ctx.quantity_mt / self.config.loading_throughput_mt_per_hour
        } else {
            0.0
        };
        let mut transit_hours = ctx.distance_km / self.speed_kmph(ctx.mode).max(1.0);
        if ctx.mode == TransportMode::Combined {
            transit_hours += self.config.transshipment_hours;
        }
        let total_hours = queue_wait_hours + loading_hours + transit_hours;
        CostTimeline {
            queue_wait_hours,
            loading_hours,
            transit_hours,
            projected_days: (total_hours / 24.0).ceil() as i64,
        }
    }

    /// 四项成本核算
    ///
    /// 装车成本随装车点拥堵上浮; 滞期费按超出免费时长的占用小时计;
    /// 违约金按预计天数晚于交期的订单逐单累加
    pub fn estimate(&self, ctx: &CostContext) -> CostBreakdown {
        let timeline = self.timeline(ctx);

        let congestion_markup =
            1.0 + self.config.congestion_factor * ctx.loading_point_utilization.clamp(0.0, 1.0);
        let loading = ctx.quantity_mt * self.config.loading_cost_per_mt * congestion_markup;

        let mut transport = ctx.distance_km * ctx.quantity_mt * self.rate_per_mt_km(ctx.mode);
        if ctx.mode == TransportMode::Combined {
            transport += ctx.quantity_mt * self.config.transshipment_cost_per_mt;
        }

        let held_hours = timeline.queue_wait_hours + timeline.loading_hours;
        let excess_hours = (held_hours - self.config.free_time_hours).max(0.0);
        let demurrage =
            excess_hours * self.config.demurrage_rate_per_wagon_hour * ctx.wagon_count as f64;

        let penalty: f64 = ctx
            .order_deadlines
            .iter()
            .map(|(days_until_deadline, penalty_per_day)| {
                let days_late = (timeline.projected_days - days_until_deadline).max(0);
                days_late as f64 * penalty_per_day
            })
            .sum();

        CostBreakdown::new(loading, transport, demurrage, penalty)
    }

    /// 装运效率分 [0,100]: 装车效率 x 车皮利用率
    pub fn efficiency_score(&self, loading_efficiency: f64, wagon_utilization: f64) -> f64 {
        (loading_efficiency.clamp(0.0, 1.0) * wagon_utilization.clamp(0.0, 1.0) * 100.0).round()
    }
}
