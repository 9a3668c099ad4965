// ==========================================
// 材料目录智能助手 - API 层
// ==========================================
// 职责: 对外入口（自由文本请求、材料新增、归组）
// ==========================================

pub mod agent;
pub mod error;

// 重导出核心类型
pub use agent::BoltAgent;
pub use error::{ApiError, ApiResult};
