// ==========================================
// 材料目录智能助手 - 数据仓储层
// ==========================================
// 职责: 目录查找、销售历史查询、材料新增、归组
// 红线: 仓储不做提示词解析，不生成回复文本
// ==========================================

pub mod catalog_repo;
pub mod error;
pub mod table_catalog;

// 重导出核心仓储
pub use catalog_repo::MaterialCatalog;
pub use error::{RepositoryError, RepositoryResult};
pub use table_catalog::TableCatalog;
