// ==========================================
// 材料目录智能助手 - API层错误类型
// ==========================================
// 职责: 将解析/仓储/数据源/配置错误统一为调用方可见的领域错误
// 约定: 错误消息即 error 结果中的 message 文本
// ==========================================

use crate::config::ConfigError;
use crate::parser::ParseError;
use crate::repository::error::RepositoryError;
use crate::store::StoreError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    /// 缺少必填条件、销售请求中没有编码等
    #[error("{0}")]
    ValidationError(String),

    /// 归组时编码不存在
    #[error("Código de material não encontrado: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    /// 表格缺少必需列
    #[error("{0}")]
    LookupError(String),

    #[error("{0}")]
    LoadError(String),

    #[error("{0}")]
    PersistenceError(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("{0}")]
    OptimisticLockFailure(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("{0}")]
    ConfigError(String),

    #[error("Erro interno: {0}")]
    InternalError(String),
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        match err {
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::MissingColumn { .. } => ApiError::LookupError(message),
            RepositoryError::CodeNotFound(codes) => ApiError::NotFound(codes),
            RepositoryError::LoadError { .. } => ApiError::LoadError(message),
            RepositoryError::PersistenceError { .. } => ApiError::PersistenceError(message),
            RepositoryError::OptimisticLockFailure { .. } => {
                ApiError::OptimisticLockFailure(message)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::LoadError(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_validation() {
        let err: ApiError = ParseError::MissingMandatory {
            missing: "largura".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert!(err.to_string().contains("Espessura e Largura são obrigatórios"));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::MissingColumn {
            table: "materiais".to_string(),
            column: "WIDTH".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::LookupError(ref m) if m.contains("WIDTH")));

        let err: ApiError = RepositoryError::CodeNotFound("999".to_string()).into();
        assert_eq!(err.to_string(), "Código de material não encontrado: 999");

        let err: ApiError = RepositoryError::from_write(
            "materiais",
            StoreError::RevisionConflict {
                expected: "1".to_string(),
                actual: "2".to_string(),
            },
        )
        .into();
        assert!(matches!(err, ApiError::OptimisticLockFailure(_)));
    }
}
