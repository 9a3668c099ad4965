// ==========================================
// 材料目录智能助手 - 解析层
// ==========================================
// 职责: 自由文本 → 结构化查询条件
// 形式: 有序标签规则表 + 正则抽取
// ==========================================

pub mod error;
pub mod label_rules;
pub mod prompt_parser;

pub use error::{ParseError, ParseResult};
pub use label_rules::{LabelRule, ValueShape, DEFAULT_RULES};
pub use prompt_parser::PromptParser;
