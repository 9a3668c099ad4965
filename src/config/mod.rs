// ==========================================
// 材料目录智能助手 - 配置层
// ==========================================
// 职责: 数据源位置、语言、匹配参数、列名别名
// 存储: JSON 配置文件 + 环境变量覆写
// ==========================================

pub mod app_config;
pub mod columns;

// 重导出核心配置
pub use app_config::{
    default_data_dir, env_keys, AppConfig, ConfigError, ConfigResult, DEFAULT_TOLERANCE,
};
pub use columns::{CatalogColumns, SalesColumns};
