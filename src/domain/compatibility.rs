// ==========================================
// 铁路车皮编组优化系统 - 兼容性规则实体
// ==========================================
// 职责: (物料类型, 车皮类型) 兼容性参考数据
// 不变式: compatibility_score 与 loading_efficiency 均在 [0,1]
// 红线: 无规则 = 不兼容（fail-closed，绝不默认兼容）
// ==========================================

use serde::{Deserialize, Serialize};

/// 兼容性规则
///
/// 以 (material_type, wagon_type) 为键；restricted_routes 列出
/// 该组合禁止通行的路线/目的地。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityRule {
    /// 物料类型
    pub material_type: String,

    /// 车皮类型
    pub wagon_type: String,

    /// 兼容性评分 [0,1]，低于阈值视为不可行
    pub compatibility_score: f64,

    /// 装车效率 [0,1]
    pub loading_efficiency: f64,

    /// 受限路线（禁止目的地/路线）
    pub restricted_routes: Vec<String>,
}

impl CompatibilityRule {
    /// 创建新规则（校验评分范围）
    pub fn new(
        material_type: String,
        wagon_type: String,
        compatibility_score: f64,
        loading_efficiency: f64,
        restricted_routes: Vec<String>,
    ) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&compatibility_score) {
            return Err(format!(
                "兼容性评分必须在[0,1]（score={}）",
                compatibility_score
            ));
        }
        if !(0.0..=1.0).contains(&loading_efficiency) {
            return Err(format!(
                "装车效率必须在[0,1]（efficiency={}）",
                loading_efficiency
            ));
        }

        Ok(Self {
            material_type,
            wagon_type,
            compatibility_score,
            loading_efficiency,
            restricted_routes,
        })
    }

    /// 该规则是否禁止指定路线
    pub fn restricts_route(&self, route: &str) -> bool {
        self.restricted_routes.iter().any(|r| r == route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range_validation() {
        assert!(CompatibilityRule::new(
            "Bulk".to_string(),
            "BOXN".to_string(),
            1.1,
            0.9,
            vec![]
        )
        .is_err());
        assert!(CompatibilityRule::new(
            "Bulk".to_string(),
            "BOXN".to_string(),
            0.9,
            -0.1,
            vec![]
        )
        .is_err());
        assert!(CompatibilityRule::new(
            "Bulk".to_string(),
            "BOXN".to_string(),
            0.9,
            0.85,
            vec!["Ghat Section".to_string()]
        )
        .is_ok());
    }

    #[test]
    fn test_restricts_route() {
        let rule = CompatibilityRule::new(
            "Bulk".to_string(),
            "BOXN".to_string(),
            0.9,
            0.85,
            vec!["Mumbai".to_string()],
        )
        .unwrap();
        assert!(rule.restricts_route("Mumbai"));
        assert!(!rule.restricts_route("Delhi"));
    }
}
