// ==========================================
// 铁路车皮编组优化系统 - 程序入口
// ==========================================
// 职责: 初始化日志与数据库, 写入示例数据, 跑一轮演示规划并输出看板
// ==========================================

use anyhow::{Context, Result};
use tracing::info;

use rake_formation_dss::api::OptimizeRakeRequest;
use rake_formation_dss::app::{seed_if_empty, AppState};
use rake_formation_dss::config::OptimizerConfig;
use rake_formation_dss::db::default_db_path;
use rake_formation_dss::{logging, APP_NAME, VERSION};

fn main() -> Result<()> {
    logging::init();
    info!(app = APP_NAME, version = VERSION, "系统启动");

    let db_path = default_db_path();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("创建数据目录失败: {}", parent.display()))?;
    }

    // 配置文件可经 RAKE_DSS_CONFIG 指定, 未指定时用默认参数
    let config = match std::env::var_os("RAKE_DSS_CONFIG") {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            OptimizerConfig::load_from_file(&path).map_err(anyhow::Error::msg)?
        }
        None => OptimizerConfig::default(),
    };
    let state = AppState::new(&db_path, config)?;
    seed_if_empty(&state)?;

    // 演示规划: 全部待处理订单, 默认权重, 不设预算
    let request = OptimizeRakeRequest {
        order_ids: Vec::new(),
        priority_weight: 0.3,
        max_budget: None,
    };
    match state.optimization_api.optimize_rake(&request) {
        Ok(response) => {
            info!("{}", response.result.explanation);
            for rake in &response.result.recommended_rakes {
                info!(
                    rake = %rake.rake_number,
                    route = %rake.route,
                    orders = rake.order_ids.len(),
                    wagons = rake.wagon_count,
                    utilization_pct = format!("{:.1}", rake.utilization_pct).as_str(),
                    total_cost = format!("{:.0}", rake.cost.total).as_str(),
                    "编组建议"
                );
                info!(rake = %rake.rake_number, "理由: {}", rake.reasoning);
            }
            for item in &response.result.unfulfilled {
                info!(
                    order_id = %item.order_id,
                    reason = ?item.reason,
                    "未满足订单: {}", item.detail
                );
            }
        }
        Err(err) => {
            info!("演示规划未执行: {}", err);
        }
    }

    let stats = state.dashboard_api.stats()?;
    info!(
        pending_orders = stats.pending_orders,
        urgent_orders = stats.urgent_orders,
        available_wagons = stats.available_wagons,
        active_rakes = stats.active_rakes,
        total_inventory_value = format!("{:.0}", stats.total_inventory_value).as_str(),
        avg_lp_utilization = format!("{:.2}", stats.average_loading_point_utilization).as_str(),
        total_demurrage_cost = format!("{:.0}", stats.total_demurrage_cost).as_str(),
        "运营看板"
    );

    Ok(())
}
