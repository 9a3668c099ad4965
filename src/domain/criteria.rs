// ==========================================
// 材料目录智能助手 - 查询条件模型
// ==========================================
// 职责: 结构化查询条件 + 标准化规则
// 规则: 文本字段 TRIM/UPPER；质量去空白与连字符；
//       尺寸字段去尾部标点、逗号转点、去 mm 后缀后解析
// ==========================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// CriteriaField - 条件字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaField {
    Sector,
    ProductType,
    Quality,
    Lamination,
    Thickness,
    Width,
    Length,
    UpperBase,
    LowerBase,
}

impl CriteriaField {
    pub const ALL: [CriteriaField; 9] = [
        CriteriaField::Sector,
        CriteriaField::ProductType,
        CriteriaField::Quality,
        CriteriaField::Lamination,
        CriteriaField::Thickness,
        CriteriaField::Width,
        CriteriaField::Length,
        CriteriaField::UpperBase,
        CriteriaField::LowerBase,
    ];

    /// 结构化输入（菜单表单）接受的键名别名，按优先级排列
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CriteriaField::Sector => &["setor_atividade", "setor", "sector"],
            CriteriaField::ProductType => &["tipo_produto", "tipo", "product_type"],
            CriteriaField::Quality => &["qualidade", "quality"],
            CriteriaField::Lamination => {
                &["tipo_laminacao", "laminacao", "laminação", "lamination"]
            }
            CriteriaField::Thickness => &["espessura", "esp", "thickness"],
            CriteriaField::Width => &["largura", "larg", "width"],
            CriteriaField::Length => &["comprimento", "comp", "length"],
            CriteriaField::UpperBase => &["base_maior", "basemaior", "upper_base"],
            CriteriaField::LowerBase => &["base_menor", "basemenor", "lower_base"],
        }
    }
}

// ==========================================
// MaterialCriteria - 材料查询条件
// ==========================================
// 红线: 任何匹配操作前 thickness 必须存在
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialCriteria {
    pub sector: Option<String>,
    pub product_type: Option<String>,
    pub quality: Option<String>,
    pub lamination: Option<String>,
    pub thickness: Option<f64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub upper_base: Option<f64>, // 梯形件上底
    pub lower_base: Option<f64>, // 梯形件下底
}

impl MaterialCriteria {
    /// 由字段 → 原始文本构造，逐字段套用标准化规则
    pub fn from_raw(raw: &HashMap<CriteriaField, String>) -> Self {
        let text = |field: CriteriaField| raw.get(&field).map(String::as_str);
        let number = |field: CriteriaField| text(field).and_then(parse_decimal);

        Self {
            sector: text(CriteriaField::Sector).and_then(normalize_upper),
            product_type: text(CriteriaField::ProductType).and_then(normalize_upper),
            quality: text(CriteriaField::Quality).and_then(normalize_quality),
            lamination: text(CriteriaField::Lamination).and_then(normalize_upper),
            thickness: number(CriteriaField::Thickness),
            width: number(CriteriaField::Width),
            length: number(CriteriaField::Length),
            upper_base: number(CriteriaField::UpperBase),
            lower_base: number(CriteriaField::LowerBase),
        }
    }

    /// 由表单键值构造
    ///
    /// 键名去空白后大小写不敏感；按别名优先级、同一别名按调用方键顺序，
    /// 取第一个非空值
    pub fn from_fields(fields: &IndexMap<String, String>) -> Self {
        let lowered: Vec<(String, &str)> = fields
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.as_str()))
            .collect();

        let mut raw = HashMap::new();
        for field in CriteriaField::ALL {
            let value = field.aliases().iter().find_map(|alias| {
                lowered
                    .iter()
                    .find(|(key, v)| key == alias && !v.trim().is_empty())
                    .map(|(_, v)| *v)
            });
            if let Some(v) = value {
                raw.insert(field, v.to_string());
            }
        }
        Self::from_raw(&raw)
    }

    pub fn has_thickness(&self) -> bool {
        self.thickness.is_some()
    }
}

/// TRIM + UPPER；空串 → None
pub fn normalize_upper(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// 质量等级标准化: 去空白、去连字符、UPPER（"sae 1006" / "SAE-1006" → "SAE1006"）
pub fn normalize_quality(value: &str) -> Option<String> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_uppercase())
    }
}

/// 十进制解析: "0,6mm" → 0.6；"1200" → 1200.0；空或非法 → None
pub fn parse_decimal(value: &str) -> Option<f64> {
    let cleaned = value
        .trim()
        .trim_end_matches(['.', ','])
        .replace(',', ".")
        .to_lowercase()
        .replace("mm", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
