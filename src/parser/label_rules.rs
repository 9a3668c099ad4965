// ==========================================
// 材料目录智能助手 - 标签规则表
// ==========================================
// 形态: "标签: 值"，大小写不敏感，每个字段取第一个命中
// 扩展字段/别名只需修改本表
// ==========================================

use crate::domain::CriteriaField;

/// 标签后的取值形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// 单个词
    Word,
    /// 词与空格
    Phrase,
    /// 词、空格与连字符（质量等级）
    Grade,
    /// 数字、点、逗号
    Decimal,
    /// 数字、点、逗号，可带 mm
    DecimalWithUnit,
}

impl ValueShape {
    pub fn pattern(&self) -> &'static str {
        match self {
            ValueShape::Word => r"(\w+)",
            ValueShape::Phrase => r"([\w\s]+)",
            ValueShape::Grade => r"([\w\s-]+)",
            ValueShape::Decimal => r"([\d.,]+)",
            ValueShape::DecimalWithUnit => r"([\d.,]+(?:mm)?)",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub field: CriteriaField,
    pub labels: &'static [&'static str],
    pub shape: ValueShape,
}

pub const DEFAULT_RULES: &[LabelRule] = &[
    LabelRule {
        field: CriteriaField::Sector,
        labels: &["setor", "sector"],
        shape: ValueShape::Word,
    },
    LabelRule {
        field: CriteriaField::ProductType,
        labels: &["tipo produto", "product type"],
        shape: ValueShape::Phrase,
    },
    LabelRule {
        field: CriteriaField::Quality,
        labels: &["qualidade", "quality"],
        shape: ValueShape::Grade,
    },
    LabelRule {
        field: CriteriaField::Lamination,
        labels: &["laminação", "laminacao", "lamination"],
        shape: ValueShape::Word,
    },
    LabelRule {
        field: CriteriaField::Thickness,
        labels: &["espessura", "thickness"],
        shape: ValueShape::DecimalWithUnit,
    },
    LabelRule {
        field: CriteriaField::Width,
        labels: &["largura", "width"],
        shape: ValueShape::Decimal,
    },
    LabelRule {
        field: CriteriaField::Length,
        labels: &["comprimento", "length"],
        shape: ValueShape::Decimal,
    },
    LabelRule {
        field: CriteriaField::UpperBase,
        labels: &["base maior", "upper base"],
        shape: ValueShape::Decimal,
    },
    LabelRule {
        field: CriteriaField::LowerBase,
        labels: &["base menor", "lower base"],
        shape: ValueShape::Decimal,
    },
];

impl LabelRule {
    /// 生成正则: (?i)(?:label1|label2):\s*<value>
    pub fn regex_source(&self) -> String {
        let labels: Vec<String> = self.labels.iter().map(|l| regex::escape(l)).collect();
        format!(r"(?i)(?:{}):\s*{}", labels.join("|"), self.shape.pattern())
    }
}
