// ==========================================
// 铁路车皮编组优化系统 - 相容性约束解析器
// ==========================================
// 职责: 判定 (物料类型, 车皮类型, 线路) 组合是否可装运
// 红线: 未登记的组合一律视为不可行 (fail-closed), 禁止默认放行
// ==========================================

use std::collections::HashMap;

use crate::config::OptimizerConfig;
use crate::domain::CompatibilityRule;

/// 单次相容性判定结果
#[derive(Debug, Clone)]
pub struct Resolution {
    /// 是否可行 (分数达标且线路未受限)
    pub feasible: bool,
    /// 相容性分数 [0,1], 无规则时为 0
    pub compatibility_score: f64,
    /// 装车效率 [0,1], 无规则时为 0
    pub loading_efficiency: f64,
    /// 不可行原因 (可行时为空)
    pub restrictions: Vec<String>,
}

impl Resolution {
    fn infeasible(reason: String) -> Self {
        Resolution {
            feasible: false,
            compatibility_score: 0.0,
            loading_efficiency: 0.0,
            restrictions: vec![reason],
        }
    }
}

/// 相容性约束解析器
///
/// 持有一次规划内不变的规则表与阈值。规则缺失时判为不可行,
/// 安全默认优先于吞吐
pub struct ConstraintResolver {
    rules: HashMap<(String, String), CompatibilityRule>,
    min_score: f64,
}

impl ConstraintResolver {
    pub fn new(rules: Vec<CompatibilityRule>, config: &OptimizerConfig) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| ((r.material_type.clone(), r.wagon_type.clone()), r))
            .collect();
        ConstraintResolver {
            rules,
            min_score: config.min_compatibility_score,
        }
    }

    /// 判定 (物料类型, 车皮类型) 在某条线路上的可行性
    pub fn resolve(&self, material_type: &str, wagon_type: &str, route: &str) -> Resolution {
        let key = (material_type.to_string(), wagon_type.to_string());
        let rule = match self.rules.get(&key) {
            Some(rule) => rule,
            None => {
                return Resolution::infeasible(format!(
                    "无相容性规则: 物料类型 {} x 车皮类型 {}",
                    material_type, wagon_type
                ));
            }
        };

        let mut restrictions = Vec::new();
        if rule.compatibility_score < self.min_score {
            restrictions.push(format!(
                "相容性分数 {:.2} 低于阈值 {:.2}",
                rule.compatibility_score, self.min_score
            ));
        }
        if rule.restricts_route(route) {
            restrictions.push(format!("线路 {} 受限", route));
        }

        Resolution {
            feasible: restrictions.is_empty(),
            compatibility_score: rule.compatibility_score,
            loading_efficiency: rule.loading_efficiency,
            restrictions,
        }
    }

    /// 在候选车皮类型中筛出对 (物料类型, 线路) 可行的子集
    ///
    /// 返回 (车皮类型, 装车效率), 按相容性分数降序、类型名升序
    pub fn feasible_wagon_types(
        &self,
        material_type: &str,
        wagon_types: &[String],
        route: &str,
    ) -> Vec<(String, f64)> {
        let mut feasible: Vec<(String, f64, f64)> = wagon_types
            .iter()
            .filter_map(|wt| {
                let res = self.resolve(material_type, wt, route);
                if res.feasible {
                    Some((wt.clone(), res.loading_efficiency, res.compatibility_score))
                } else {
                    None
                }
            })
            .collect();
        feasible.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        feasible.into_iter().map(|(wt, eff, _)| (wt, eff)).collect()
    }
}
