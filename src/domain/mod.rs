// ==========================================
// 材料目录智能助手 - 领域模型层
// ==========================================
// 职责: 查询条件、表格模型、请求结果
// 红线: 不含数据访问逻辑，不含匹配逻辑
// ==========================================

pub mod criteria;
pub mod outcome;
pub mod table;

// 重导出核心类型
pub use criteria::{
    normalize_quality, normalize_upper, parse_decimal, CriteriaField, MaterialCriteria,
};
pub use outcome::TaggedResult;
pub use table::{normalize_header, CellValue, Row, Table};
