// ==========================================
// 材料目录智能助手 - 核心库
// ==========================================
// 技术栈: Rust + Excel/CSV 表格数据源
// 系统定位: 规格解析 + 目录匹配 + 销售历史查询
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 查询条件与表格模型
pub mod domain;

// 解析层 - 自由文本 → 查询条件
pub mod parser;

// 数据源层 - 表格读写
pub mod store;

// 数据仓储层 - 目录/销售数据访问
pub mod repository;

// 引擎层 - 匹配与汇总
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 请求分发
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{CellValue, MaterialCriteria, Row, Table, TaggedResult};
pub use parser::PromptParser;
pub use repository::{MaterialCatalog, TableCatalog};
pub use store::{FileTableStore, HttpTableStore, MemoryTableStore, TableStore};
pub use engine::{MatchEngine, MatchOutcome, SalesSummary};
pub use api::{ApiError, BoltAgent};
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Bolt AI";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
