// ==========================================
// 材料目录智能助手 - 解析层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 解析层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Espessura e Largura são obrigatórios (ausente: {missing})")]
    MissingMandatory { missing: String },

    #[error("Espessura inválida: '{0}'")]
    InvalidThickness(String),

    #[error("Regra de rótulo inválida ({label}): {message}")]
    InvalidRule { label: String, message: String },
}

/// Result 类型别名
pub type ParseResult<T> = Result<T, ParseError>;
