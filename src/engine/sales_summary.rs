// ==========================================
// 材料目录智能助手 - 销售历史汇总
// ==========================================
// 职责: 销售行 → 总重量 / 总金额 / 摘要文本
// 规则: 列缺失或单元格非数值按 0 计
// ==========================================

use crate::config::SalesColumns;
use crate::domain::{CellValue, Row};
use crate::i18n;

// ==========================================
// SalesSummary - 销售汇总
// ==========================================
// 红线: 纯计算，不访问数据源
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    pub total_weight: f64,
    pub total_value: f64,
    lines: Vec<SaleLine>,
}

#[derive(Debug, Clone, PartialEq)]
struct SaleLine {
    client: Option<String>,
    weight: Option<String>,
    date: Option<String>,
}

/// 取单元格显示文本（空单元格视为缺失）
fn cell_text(row: &Row, column: Option<&str>) -> Option<String> {
    column
        .and_then(|c| row.get(c))
        .filter(|v| !v.is_empty())
        .map(CellValue::to_string)
}

fn cell_number(row: &Row, column: Option<&str>) -> f64 {
    column
        .and_then(|c| row.get(c))
        .and_then(CellValue::as_f64)
        .unwrap_or(0.0)
}

impl SalesSummary {
    /// 汇总销售行
    ///
    /// # 参数
    /// - `rows`: 同一编码的销售行（保持数据源顺序）
    /// - `columns`: 销售表列名别名
    pub fn from_rows(rows: &[Row], columns: &SalesColumns) -> Self {
        let resolve = |aliases: &[String]| -> Option<String> {
            aliases
                .iter()
                .find(|a| rows.iter().any(|r| r.contains_key(a.as_str())))
                .cloned()
        };
        let weight_col = resolve(&columns.weight);
        let value_col = resolve(&columns.net_value);
        let client_col = resolve(&columns.client_desc);
        let date_col = resolve(&columns.invoice_date);

        let total_weight = rows
            .iter()
            .map(|r| cell_number(r, weight_col.as_deref()))
            .sum();
        let total_value = rows
            .iter()
            .map(|r| cell_number(r, value_col.as_deref()))
            .sum();

        let lines = rows
            .iter()
            .map(|r| SaleLine {
                client: cell_text(r, client_col.as_deref()),
                weight: cell_text(r, weight_col.as_deref()),
                date: cell_text(r, date_col.as_deref()),
            })
            .collect();

        Self {
            total_weight,
            total_value,
            lines,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 摘要文本: 标题行 + 每笔销售一行
    pub fn summary_text(&self, locale: &str) -> String {
        let weight = self.total_weight.to_string();
        let value = self.total_value.to_string();
        let mut text = i18n::t_with_args(
            locale,
            "agent.sales_header",
            &[("weight", &weight), ("value", &value)],
        );
        text.push('\n');

        let not_available = i18n::t(locale, "common.not_available");
        for line in &self.lines {
            let client = line.client.as_deref().unwrap_or(&not_available);
            let weight = line.weight.as_deref().unwrap_or("0");
            let date = line.date.as_deref().unwrap_or("");
            text.push_str(&i18n::t_with_args(
                locale,
                "agent.sales_line",
                &[("client", client), ("weight", weight), ("date", date)],
            ));
            text.push('\n');
        }
        text
    }
}
