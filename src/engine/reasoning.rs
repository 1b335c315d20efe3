// ==========================================
// 铁路车皮编组优化系统 - 编组理由生成
// ==========================================
// 职责: 为每个编组建议生成人可读的决策说明
// 红线: 理由生成失败或超时不得影响编组结果, 必须降级为模板说明
// ==========================================

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// 理由生成的输入上下文
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningContext {
    pub rake_number: String,
    pub route: String,
    pub stockyard_name: String,
    pub loading_point_name: String,
    pub order_count: usize,
    pub wagon_count: usize,
    pub total_quantity_mt: f64,
    pub utilization_pct: f64,
    pub total_cost: f64,
    /// 成本主导项 (中文)
    pub dominant_cost: String,
    /// 约束判定记录 (被排除的备选方案等)
    pub constraint_notes: Vec<String>,
}

/// 理由提供方抽象: 模板实现与外部模型实现共用此接口
pub trait ReasoningProvider: Send + Sync {
    fn explain(&self, ctx: &ReasoningContext) -> anyhow::Result<String>;
}

/// 模板理由提供方: 确定性拼装, 永不失败
#[derive(Debug, Default)]
pub struct TemplateReasoningProvider;

impl TemplateReasoningProvider {
    pub fn new() -> Self {
        TemplateReasoningProvider
    }
}

impl ReasoningProvider for TemplateReasoningProvider {
    fn explain(&self, ctx: &ReasoningContext) -> anyhow::Result<String> {
        let mut text = format!(
            "编组 {} 发往 {}: 自 {} 经 {} 装运 {:.0} 吨, 合并 {} 个订单使用 {} 节车皮, \
             车皮利用率 {:.1}%, 预计总成本 {:.0} 元, 成本主导项为{}",
            ctx.rake_number,
            ctx.route,
            ctx.stockyard_name,
            ctx.loading_point_name,
            ctx.total_quantity_mt,
            ctx.order_count,
            ctx.wagon_count,
            ctx.utilization_pct,
            ctx.total_cost,
            ctx.dominant_cost,
        );
        if !ctx.constraint_notes.is_empty() {
            text.push_str(&format!("; 约束判定: {}", ctx.constraint_notes.join("; ")));
        }
        Ok(text)
    }
}

/// 有界理由生成: 包装任意提供方, 超时或出错降级为模板说明
pub struct BoundedReasoning {
    inner: Arc<dyn ReasoningProvider>,
    fallback: TemplateReasoningProvider,
    timeout: Duration,
}

impl BoundedReasoning {
    pub fn new(inner: Arc<dyn ReasoningProvider>, timeout_ms: u64) -> Self {
        BoundedReasoning {
            inner,
            fallback: TemplateReasoningProvider::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// 在超时预算内生成理由; 超时、出错、线程崩溃一律降级
    pub fn explain(&self, ctx: &ReasoningContext) -> String {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let ctx_owned = ctx.clone();
        thread::spawn(move || {
            let result = inner.explain(&ctx_owned);
            // 接收端已超时离开时发送失败, 直接丢弃
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!(rake = %ctx.rake_number, error = %err, "理由生成失败, 降级为模板说明");
                self.template(ctx)
            }
            Err(_) => {
                warn!(rake = %ctx.rake_number, timeout_ms = self.timeout.as_millis() as u64,
                      "理由生成超时, 降级为模板说明");
                self.template(ctx)
            }
        }
    }

    fn template(&self, ctx: &ReasoningContext) -> String {
        match self.fallback.explain(ctx) {
            Ok(text) => text,
            Err(_) => format!("编组 {} 发往 {}", ctx.rake_number, ctx.route),
        }
    }
}
