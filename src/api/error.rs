// ==========================================
// 铁路车皮编组优化系统 - API 错误
// ==========================================

use thiserror::Error;

use crate::repository::RepositoryError;

/// API 层错误: 仓储错误在此折叠为面向调用方的类别
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),

    #[error("资源不存在: {entity} (id={id})")]
    NotFound { entity: String, id: String },

    #[error("并发冲突: {0}")]
    Conflict(String),

    #[error("业务规则冲突: {0}")]
    BusinessRule(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            RepositoryError::ClaimConflict { entity, id } => {
                ApiError::Conflict(format!("{} (id={}) 已被其他编组认领", entity, id))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRule(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::BusinessRule(format!("无效的状态转换: {} -> {}", from, to))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidRequest(msg),
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::BusinessRule(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
