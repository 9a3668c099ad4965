// ==========================================
// 材料目录智能助手 - 表格数据模型
// ==========================================
// 职责: 单元格值 / 行 / 整表
// 约定: 列名在进入核心逻辑前已 TRIM + UPPER
// ==========================================

use crate::domain::criteria::parse_decimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// JSON 表示: 无标签标量，Empty ↔ null
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// 空单元格或纯空白文本
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数值视图（文本按十进制规则解析，支持逗号小数与 mm 后缀）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_finite() => Some(*f),
            CellValue::Text(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// 整数视图（仅当值为整数时）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) => float_to_i64(*f),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| parse_decimal(trimmed).and_then(float_to_i64))
            }
            _ => None,
        }
    }

    /// 从用户输入文本构造（空白 → Empty）
    pub fn from_input(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{}", i),
            // Excel 中的整数码以浮点存储，显示时去掉 ".0"
            CellValue::Float(v) => match float_to_i64(*v) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", v),
            },
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

/// 一行数据（列名 → 值，保持列顺序）
pub type Row = IndexMap<String, CellValue>;

/// 列名标准化（TRIM + UPPER）
pub fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

// ==========================================
// Table - 整表
// ==========================================
// revision: 数据源给出的版本令牌，回写时用于乐观锁校验
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            revision: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// 按别名列表解析实际列名（第一个存在的别名生效）
    pub fn resolve_column(&self, aliases: &[String]) -> Option<&str> {
        aliases
            .iter()
            .find_map(|alias| self.columns.iter().find(|c| *c == alias))
            .map(String::as_str)
    }

    /// 确保列存在；新增列时为已有行补 Empty
    pub fn ensure_column(&mut self, name: &str) {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.entry(name.to_string()).or_insert(CellValue::Empty);
        }
    }

    /// 追加一行；行中出现的新列会加入表头，缺失列补 Empty
    pub fn push_row(&mut self, row: Row) {
        for key in row.keys() {
            self.ensure_column(key);
        }
        let mut ordered = Row::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = row.get(column).cloned().unwrap_or_default();
            ordered.insert(column.clone(), value);
        }
        self.rows.push(ordered);
    }

    /// 标准化表头与行内键（数据源读取后调用）
    pub fn normalize_headers(&mut self) {
        self.columns = self.columns.iter().map(|c| normalize_header(c)).collect();
        for row in &mut self.rows {
            *row = std::mem::take(row)
                .into_iter()
                .map(|(k, v)| (normalize_header(&k), v))
                .collect();
        }
    }
}
