// ==========================================
// 材料目录智能助手 - 匹配引擎
// ==========================================
// 流程: 精确查找 → 替代品查找 → 未找到
// 依赖: 仅 MaterialCatalog 接口（不感知数据源类型）
// ==========================================

use crate::domain::{MaterialCriteria, Row};
use crate::repository::{MaterialCatalog, RepositoryResult};
use std::sync::Arc;

/// 匹配结果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// 精确命中的材料编码
    Exact(String),
    /// 厚度容差范围内的替代品
    Alternatives(Vec<Row>),
    NotFound,
}

pub struct MatchEngine {
    catalog: Arc<dyn MaterialCatalog>,
}

impl MatchEngine {
    pub fn new(catalog: Arc<dyn MaterialCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn MaterialCatalog> {
        &self.catalog
    }

    /// 按条件匹配材料
    ///
    /// # 错误
    /// - 条件缺少厚度、目录缺列、数据源读取失败
    pub fn match_criteria(&self, criteria: &MaterialCriteria) -> RepositoryResult<MatchOutcome> {
        if let Some(code) = self.catalog.find_exact_code(criteria)? {
            tracing::info!("精确匹配: {}", code);
            return Ok(MatchOutcome::Exact(code));
        }

        let rows = self.catalog.find_alternatives(criteria)?;
        if rows.is_empty() {
            tracing::info!("无精确匹配，也无替代品");
            Ok(MatchOutcome::NotFound)
        } else {
            tracing::info!("无精确匹配，返回 {} 个替代品", rows.len());
            Ok(MatchOutcome::Alternatives(rows))
        }
    }
}
