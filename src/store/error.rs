// ==========================================
// 材料目录智能助手 - 数据源错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据源（表格读写）错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== 文件相关错误 =====
    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato de arquivo não suportado: {0} (apenas .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("Falha ao ler arquivo: {0}")]
    FileReadError(String),

    #[error("Falha ao interpretar Excel: {0}")]
    ExcelParseError(String),

    #[error("Falha ao interpretar CSV: {0}")]
    CsvParseError(String),

    #[error("Falha ao gravar tabela: {0}")]
    WriteError(String),

    // ===== 远程数据源错误 =====
    #[error("Falha na API de dados: {0}")]
    HttpError(String),

    // ===== 并发控制错误 =====
    #[error("Tabela alterada por outra sessão (revisão esperada {expected}, atual {actual})")]
    RevisionConflict { expected: String, actual: String },

    #[error("Falha ao obter trava: {0}")]
    LockError(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for StoreError {
    fn from(err: calamine::Error) -> Self {
        StoreError::ExcelParseError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for StoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        StoreError::WriteError(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::HttpError(err.to_string())
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
