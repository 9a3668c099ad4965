// ==========================================
// 材料目录智能助手 - 请求结果
// ==========================================
// 职责: 分发器对外唯一的结果形态（带状态标签）
// JSON: {"status": "found_material", ...}
// ==========================================

use crate::domain::criteria::MaterialCriteria;
use crate::domain::table::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaggedResult {
    FoundMaterial {
        code: String,
        criteria: MaterialCriteria,
    },
    Alternatives {
        rows: Vec<Row>,
        criteria: MaterialCriteria,
    },
    NotFound {
        message: String,
    },
    SalesOpportunity {
        code: String,
        rows: Vec<Row>,
        summary_text: String,
    },
    NoSales {
        message: String,
    },
    Error {
        message: String,
    },
}

impl TaggedResult {
    /// 状态标签（与 JSON 中 status 一致）
    pub fn status(&self) -> &'static str {
        match self {
            TaggedResult::FoundMaterial { .. } => "found_material",
            TaggedResult::Alternatives { .. } => "alternatives",
            TaggedResult::NotFound { .. } => "not_found",
            TaggedResult::SalesOpportunity { .. } => "sales_opportunity",
            TaggedResult::NoSales { .. } => "no_sales",
            TaggedResult::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TaggedResult::Error { .. })
    }
}
