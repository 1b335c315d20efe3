// ==========================================
// 铁路车皮编组优化系统 - 日志初始化
// ==========================================
// tracing + tracing-subscriber, 级别由 RUST_LOG 控制
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 级别过滤器（默认 info），如 RUST_LOG=rake_formation_dss=trace
/// - RAKE_DSS_LOG_FORMAT: 设为 json 时输出结构化 JSON 行（采集管道用）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_output = std::env::var("RAKE_DSS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);
    if json_output {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 测试环境日志: debug 级别, 输出交给测试框架捕获, 重复初始化直接忽略
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
