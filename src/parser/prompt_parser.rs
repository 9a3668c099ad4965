// ==========================================
// 材料目录智能助手 - 自由文本解析器
// ==========================================
// 职责: 自由文本 → MaterialCriteria
// 必填: espessura（厚度）、largura（宽度）
// 纯函数，无副作用
// ==========================================

use crate::domain::{CriteriaField, MaterialCriteria};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::label_rules::{LabelRule, DEFAULT_RULES};
use regex::Regex;
use std::collections::HashMap;

/// 文本模式下必须出现的字段
const MANDATORY_FIELDS: [CriteriaField; 2] = [CriteriaField::Thickness, CriteriaField::Width];

struct CompiledRule {
    field: CriteriaField,
    regex: Regex,
}

pub struct PromptParser {
    rules: Vec<CompiledRule>,
}

impl PromptParser {
    /// 使用内置标签规则表
    pub fn new() -> ParseResult<Self> {
        Self::with_rules(DEFAULT_RULES)
    }

    /// 使用自定义标签规则表（同一字段的多条规则按顺序尝试）
    pub fn with_rules(rules: &[LabelRule]) -> ParseResult<Self> {
        let compiled = rules
            .iter()
            .map(|rule| {
                let source = rule.regex_source();
                Regex::new(&source)
                    .map(|regex| CompiledRule {
                        field: rule.field,
                        regex,
                    })
                    .map_err(|e| ParseError::InvalidRule {
                        label: rule.labels.join("|"),
                        message: e.to_string(),
                    })
            })
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Self { rules: compiled })
    }

    /// 抽取原始字段值（不做校验）
    pub fn extract(&self, prompt: &str) -> HashMap<CriteriaField, String> {
        let mut raw = HashMap::new();
        for rule in &self.rules {
            if raw.contains_key(&rule.field) {
                continue;
            }
            if let Some(value) = rule
                .regex
                .captures(prompt)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
            {
                raw.insert(rule.field, value);
            }
        }
        raw
    }

    /// 解析自由文本为查询条件
    ///
    /// # 示例
    /// "Setor: JIT, Tipo Produto: CHAPA, Qualidade: SAE-1006, Laminação: LF,
    ///  Espessura: 0.6, Largura: 1200, Comprimento: 3000"
    ///
    /// # 错误
    /// - MissingMandatory: 缺少 espessura 或 largura 标签
    /// - InvalidThickness: espessura 无法解析为数值
    pub fn parse(&self, prompt: &str) -> ParseResult<MaterialCriteria> {
        let raw = self.extract(prompt);

        let missing: Vec<&str> = MANDATORY_FIELDS
            .iter()
            .filter(|f| !raw.contains_key(*f))
            .map(|f| f.aliases()[0])
            .collect();
        if !missing.is_empty() {
            tracing::debug!("文本缺少必填标签: {:?}", missing);
            return Err(ParseError::MissingMandatory {
                missing: missing.join(", "),
            });
        }

        let criteria = MaterialCriteria::from_raw(&raw);
        if !criteria.has_thickness() {
            let value = raw
                .get(&CriteriaField::Thickness)
                .cloned()
                .unwrap_or_default();
            return Err(ParseError::InvalidThickness(value));
        }

        tracing::debug!("解析结果: {:?}", criteria);
        Ok(criteria)
    }
}
