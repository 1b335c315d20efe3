// ==========================================
// 铁路车皮编组优化系统 - 兼容性规则仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 无规则 = 不兼容的判定在引擎层（ConstraintResolver），
//       此处 find_rule 如实返回 None
// ==========================================

use crate::domain::compatibility::CompatibilityRule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 兼容性规则仓储
pub struct CompatibilityRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompatibilityRuleRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射（restricted_routes 以 JSON 数组存储）
    fn map_row(row: &Row) -> rusqlite::Result<CompatibilityRule> {
        let restricted_json: String = row.get(4)?;
        let restricted_routes: Vec<String> =
            serde_json::from_str(&restricted_json).unwrap_or_default();
        Ok(CompatibilityRule {
            material_type: row.get(0)?,
            wagon_type: row.get(1)?,
            compatibility_score: row.get(2)?,
            loading_efficiency: row.get(3)?,
            restricted_routes,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "material_type, wagon_type, compatibility_score, loading_efficiency, restricted_routes";

    /// 插入或更新规则
    pub fn upsert(&self, rule: &CompatibilityRule) -> RepositoryResult<()> {
        let restricted_json = serde_json::to_string(&rule.restricted_routes)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO compatibility_rules (
                material_type, wagon_type, compatibility_score, loading_efficiency, restricted_routes
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                rule.material_type,
                rule.wagon_type,
                rule.compatibility_score,
                rule.loading_efficiency,
                restricted_json,
            ],
        )?;
        Ok(())
    }

    /// 按 (物料类型, 车皮类型) 查询规则
    ///
    /// # 返回
    /// - Ok(Some(rule)): 有规则
    /// - Ok(None): 无规则（引擎层按不兼容处理）
    pub fn find_rule(
        &self,
        material_type: &str,
        wagon_type: &str,
    ) -> RepositoryResult<Option<CompatibilityRule>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM compatibility_rules WHERE material_type = ?1 AND wagon_type = ?2",
            Self::SELECT_COLUMNS
        );
        let rule = conn
            .query_row(&sql, params![material_type, wagon_type], Self::map_row)
            .optional()?;
        Ok(rule)
    }

    /// 查询全部规则
    pub fn list(&self) -> RepositoryResult<Vec<CompatibilityRule>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM compatibility_rules ORDER BY material_type, wagon_type",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rules = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<CompatibilityRule>>>()?;
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema::init_schema;

    fn repo() -> CompatibilityRuleRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        CompatibilityRuleRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    // 测试1: upsert 后可按键查得, 无规则返回 None
    #[test]
    fn test_upsert_and_find_rule() {
        let repo = repo();
        let rule = CompatibilityRule::new(
            "Bulk".to_string(),
            "BOXN".to_string(),
            0.95,
            0.9,
            vec!["Ghat Section".to_string()],
        )
        .unwrap();
        repo.upsert(&rule).unwrap();

        let found = repo.find_rule("Bulk", "BOXN").unwrap().unwrap();
        assert_eq!(found.compatibility_score, 0.95);
        assert_eq!(found.restricted_routes, vec!["Ghat Section".to_string()]);

        assert!(repo.find_rule("Bulk", "BRN").unwrap().is_none());
    }

    // 测试2: 同键重复 upsert 覆盖旧值
    #[test]
    fn test_upsert_replaces_existing() {
        let repo = repo();
        let mut rule =
            CompatibilityRule::new("Bulk".to_string(), "BOXN".to_string(), 0.5, 0.5, vec![])
                .unwrap();
        repo.upsert(&rule).unwrap();
        rule.compatibility_score = 0.9;
        repo.upsert(&rule).unwrap();

        assert_eq!(repo.list().unwrap().len(), 1);
        let found = repo.find_rule("Bulk", "BOXN").unwrap().unwrap();
        assert_eq!(found.compatibility_score, 0.9);
    }
}
