// ==========================================
// 材料目录智能助手 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: "未匹配到材料" 不是错误，是正常结果
// ==========================================

use crate::store::StoreError;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 前置条件错误 =====
    #[error("Erro de validação: {0}")]
    ValidationError(String),

    #[error("Coluna obrigatória '{column}' ausente na tabela de {table}")]
    MissingColumn { table: String, column: String },

    #[error("Código de material não encontrado: {0}")]
    CodeNotFound(String),

    // ===== 数据源错误 =====
    #[error("Erro ao carregar {table}: {source}")]
    LoadError {
        table: String,
        #[source]
        source: StoreError,
    },

    #[error("Erro ao gravar {table}: {source}")]
    PersistenceError {
        table: String,
        #[source]
        source: StoreError,
    },

    // ===== 并发控制错误 =====
    #[error("Conflito de versão na tabela de {table}: esperada {expected}, atual {actual}")]
    OptimisticLockFailure {
        table: String,
        expected: String,
        actual: String,
    },
}

impl RepositoryError {
    /// 写入失败的分类: 版本冲突单独识别
    pub fn from_write(table: &str, err: StoreError) -> Self {
        match err {
            StoreError::RevisionConflict { expected, actual } => {
                RepositoryError::OptimisticLockFailure {
                    table: table.to_string(),
                    expected,
                    actual,
                }
            }
            other => RepositoryError::PersistenceError {
                table: table.to_string(),
                source: other,
            },
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
