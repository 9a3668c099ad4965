// ==========================================
// 材料目录智能助手 - 引擎层
// ==========================================
// 职责: 材料匹配流程、销售历史汇总
// 红线: 引擎不读写表格，只通过 MaterialCatalog 访问数据
// ==========================================

pub mod match_engine;
pub mod sales_summary;

// 重导出核心引擎
pub use match_engine::{MatchEngine, MatchOutcome};
pub use sales_summary::SalesSummary;
