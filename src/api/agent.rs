// ==========================================
// 材料目录智能助手 - 请求分发器
// ==========================================
// 职责: 自由文本请求 → 带状态标签的结果
// 路由: 含销售关键词 → 销售历史；否则 → 规格解析 + 目录匹配
// 表单入口: find_material 由键值字段构造条件，走同一匹配流程
// 红线: process_request / find_material 不向调用方抛出错误，一律转为 error 结果
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AppConfig, SalesColumns};
use crate::domain::{MaterialCriteria, TaggedResult};
use crate::engine::{MatchEngine, MatchOutcome, SalesSummary};
use crate::i18n;
use crate::parser::PromptParser;
use crate::repository::{MaterialCatalog, TableCatalog};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::Arc;

/// 销售请求中的材料编码: 第一段连续 4 位及以上数字
const CODE_PATTERN: &str = r"\d{4,}";

// ==========================================
// BoltAgent - 智能助手入口
// ==========================================
pub struct BoltAgent {
    parser: PromptParser,
    engine: MatchEngine,
    code_pattern: Regex,
    sales_keywords: Vec<String>,
    sales_columns: SalesColumns,
    locale: String,
}

impl BoltAgent {
    /// 创建助手
    ///
    /// # 参数
    /// - `catalog`: 目录仓储（任意数据源组合）
    /// - `config`: 关键词、语言、销售列名
    pub fn new(catalog: Arc<dyn MaterialCatalog>, config: &AppConfig) -> ApiResult<Self> {
        let parser = PromptParser::new()?;
        let code_pattern =
            Regex::new(CODE_PATTERN).map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(Self {
            parser,
            engine: MatchEngine::new(catalog),
            code_pattern,
            sales_keywords: config
                .sales_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            sales_columns: config.sales_columns.clone(),
            locale: config.locale.clone(),
        })
    }

    /// 按配置打开数据源并创建助手
    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        let catalog = TableCatalog::from_config(config)?;
        Self::new(Arc::new(catalog), config)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    // ==========================================
    // 请求处理
    // ==========================================

    /// 处理一条自由文本请求
    pub fn process_request(&self, text: &str) -> TaggedResult {
        tracing::info!("收到请求: {}", text);
        into_tagged(self.dispatch(text))
    }

    /// 按表单字段查找材料（键名别名见 `CriteriaField::aliases`）
    pub fn find_material(&self, fields: &IndexMap<String, String>) -> TaggedResult {
        tracing::info!("收到表单查询: {:?}", fields);
        let criteria = MaterialCriteria::from_fields(fields);
        if !criteria.has_thickness() {
            return into_tagged(Err(ApiError::ValidationError(
                "Espessura é obrigatória".to_string(),
            )));
        }
        into_tagged(self.match_material(criteria))
    }

    fn dispatch(&self, text: &str) -> ApiResult<TaggedResult> {
        if self.is_sales_request(text) {
            self.sales_opportunity(text)
        } else {
            let criteria = self.parser.parse(text)?;
            self.match_material(criteria)
        }
    }

    fn is_sales_request(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.sales_keywords
            .iter()
            .any(|k| lowered.contains(k.as_str()))
    }

    fn sales_opportunity(&self, text: &str) -> ApiResult<TaggedResult> {
        let code = self
            .code_pattern
            .find(text)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                ApiError::ValidationError(
                    "Código do material não encontrado na solicitação".to_string(),
                )
            })?;

        let rows = self.engine.catalog().find_sales_by_code(&code)?;
        if rows.is_empty() {
            return Ok(TaggedResult::NoSales {
                message: i18n::t_with_args(&self.locale, "agent.no_sales", &[("code", &code)]),
            });
        }

        let summary = SalesSummary::from_rows(&rows, &self.sales_columns);
        tracing::info!(
            "销售汇总: code={}, 笔数={}, 总重量={}, 总金额={}",
            code,
            summary.len(),
            summary.total_weight,
            summary.total_value
        );
        Ok(TaggedResult::SalesOpportunity {
            code,
            summary_text: summary.summary_text(&self.locale),
            rows,
        })
    }

    fn match_material(&self, criteria: MaterialCriteria) -> ApiResult<TaggedResult> {
        let result = match self.engine.match_criteria(&criteria)? {
            MatchOutcome::Exact(code) => TaggedResult::FoundMaterial { code, criteria },
            MatchOutcome::Alternatives(rows) => TaggedResult::Alternatives { rows, criteria },
            MatchOutcome::NotFound => TaggedResult::NotFound {
                message: i18n::t(&self.locale, "agent.not_found"),
            },
        };
        Ok(result)
    }

    // ==========================================
    // 目录维护
    // ==========================================

    /// 新增材料，返回系统分配的编码
    pub fn add_material(&self, fields: &IndexMap<String, String>) -> ApiResult<String> {
        let code = self.engine.catalog().add_material(fields)?;
        Ok(code)
    }

    /// 将单个编码归入分组
    pub fn assign_group(&self, code: &str, group: &str) -> ApiResult<()> {
        self.assign_group_many(&[code.to_string()], group)?;
        Ok(())
    }

    /// 批量归组，返回更新行数
    pub fn assign_group_many(&self, codes: &[String], group: &str) -> ApiResult<usize> {
        let group = group.trim();
        if group.is_empty() {
            return Err(ApiError::ValidationError(
                "Nome do grupo não pode ser vazio".to_string(),
            ));
        }
        let updated = self.engine.catalog().assign_group_many(codes, group)?;
        Ok(updated)
    }
}

fn into_tagged(result: ApiResult<TaggedResult>) -> TaggedResult {
    match result {
        Ok(result) => {
            tracing::info!("请求完成: status={}", result.status());
            result
        }
        Err(e) => {
            tracing::warn!("请求失败: {}", e);
            TaggedResult::Error {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, Row, Table};
    use crate::store::MemoryTableStore;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for values in rows {
            let row: Row = columns.iter().map(|c| c.to_string()).zip(values).collect();
            table.push_row(row);
        }
        table
    }

    fn agent(sales: Table) -> BoltAgent {
        let materials = table(
            &[
                "MATERIAL_CODE",
                "THICKNESS",
                "WIDTH",
                "LENGTH",
                "LAMINATION_TYPE",
                "QUALITY",
            ],
            vec![vec![
                CellValue::from("12345"),
                CellValue::Float(0.6),
                CellValue::Float(1200.0),
                CellValue::Empty,
                CellValue::from("LF"),
                CellValue::from("SAE1006"),
            ]],
        );
        let catalog = TableCatalog::new(
            Arc::new(MemoryTableStore::new("materials", materials)),
            Arc::new(MemoryTableStore::new("sales", sales)),
        );
        BoltAgent::new(Arc::new(catalog), &AppConfig::default()).unwrap()
    }

    #[test]
    fn test_sales_keyword_routing() {
        let agent = agent(Table::default());
        assert!(agent.is_sales_request("Oportunidade de VENDA 12345"));
        assert!(agent.is_sales_request("vendas 12345"));
        assert!(!agent.is_sales_request("espessura: 0,6 largura: 1200"));
    }

    #[test]
    fn test_sales_request_without_code() {
        let sales = table(&["MATERIAL_CODE"], vec![]);
        let result = agent(sales).process_request("venda do material 123");
        assert!(result.is_error());
    }

    #[test]
    fn test_found_material() {
        let result = agent(Table::default())
            .process_request("Espessura: 0,6mm, Largura: 1200, Qualidade: SAE-1006, Laminação: LF");
        match result {
            TaggedResult::FoundMaterial { code, criteria } => {
                assert_eq!(code, "12345");
                assert_eq!(criteria.quality.as_deref(), Some("SAE1006"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_failure_becomes_error() {
        let result = agent(Table::default()).process_request("Espessura: 0,6");
        match result {
            TaggedResult::Error { message } => {
                assert!(message.contains("Espessura e Largura são obrigatórios"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_assign_group_requires_name() {
        let agent = agent(Table::default());
        assert!(matches!(
            agent.assign_group("12345", "  "),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            agent.assign_group("99999", "G"),
            Err(ApiError::NotFound(_))
        ));
        agent.assign_group("12345", "G").unwrap();
    }

    #[test]
    fn test_find_material_from_fields() {
        let agent = agent(Table::default());

        let mut fields = IndexMap::new();
        fields.insert("Espessura".to_string(), "0,6mm".to_string());
        fields.insert("largura".to_string(), "1200".to_string());
        fields.insert("QUALIDADE".to_string(), "sae-1006".to_string());
        match agent.find_material(&fields) {
            TaggedResult::FoundMaterial { code, criteria } => {
                assert_eq!(code, "12345");
                assert_eq!(criteria.quality.as_deref(), Some("SAE1006"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // 宽度可缺省: 无精确匹配时按厚度给出替代品
        let mut fields = IndexMap::new();
        fields.insert("esp".to_string(), "0.8".to_string());
        assert_eq!(agent.find_material(&fields).status(), "alternatives");
    }

    #[test]
    fn test_find_material_requires_thickness() {
        let agent = agent(Table::default());
        let mut fields = IndexMap::new();
        fields.insert("Largura".to_string(), "1200".to_string());
        fields.insert("Espessura".to_string(), "abc".to_string());
        match agent.find_material(&fields) {
            TaggedResult::Error { message } => assert!(message.contains("Espessura")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
