// ==========================================
// 材料目录智能助手 - 表格目录仓储实现
// ==========================================
// 数据源: 材料目录表 + 销售历史表（均为 TableStore）
// 读写: 每次操作重新读取整表；修改操作整表回写（带版本令牌）
// ==========================================

use crate::config::{AppConfig, CatalogColumns, SalesColumns, DEFAULT_TOLERANCE};
use crate::domain::{normalize_header, parse_decimal, CellValue, MaterialCriteria, Row, Table};
use crate::repository::catalog_repo::MaterialCatalog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::store::{open_store, StoreResult, TableStore};
use indexmap::IndexMap;
use std::sync::Arc;

const MATERIALS: &str = "materiais";
const SALES: &str = "vendas";

/// 数值相等比较精度
const EPSILON: f64 = 1e-9;

pub struct TableCatalog {
    materials: Arc<dyn TableStore>,
    sales: Arc<dyn TableStore>,
    catalog_columns: CatalogColumns,
    sales_columns: SalesColumns,
    tolerance: f64,
}

impl TableCatalog {
    pub fn new(materials: Arc<dyn TableStore>, sales: Arc<dyn TableStore>) -> Self {
        Self {
            materials,
            sales,
            catalog_columns: CatalogColumns::default(),
            sales_columns: SalesColumns::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// 按配置打开数据源
    pub fn from_config(config: &AppConfig) -> StoreResult<Self> {
        let catalog = Self::new(
            open_store(&config.material_source, config.material_sheet.as_deref())?,
            open_store(&config.sales_source, config.sales_sheet.as_deref())?,
        )
        .with_columns(config.catalog_columns.clone(), config.sales_columns.clone())
        .with_tolerance(config.alternatives_tolerance);
        Ok(catalog)
    }

    pub fn with_columns(mut self, catalog: CatalogColumns, sales: SalesColumns) -> Self {
        self.catalog_columns = catalog;
        self.sales_columns = sales;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn load_materials(&self) -> RepositoryResult<Table> {
        self.materials
            .load()
            .map_err(|source| RepositoryError::LoadError {
                table: MATERIALS.to_string(),
                source,
            })
    }

    fn load_sales(&self) -> RepositoryResult<Table> {
        self.sales.load().map_err(|source| RepositoryError::LoadError {
            table: SALES.to_string(),
            source,
        })
    }

    fn persist_materials(&self, table: &Table) -> RepositoryResult<()> {
        self.materials
            .replace(table)
            .map_err(|e| RepositoryError::from_write(MATERIALS, e))
    }

    /// 表单字段名 → 目标列名（优先映射到目录表中该逻辑字段的实际列）
    fn target_column(&self, table: &Table, header: &str) -> (Option<&'static str>, String) {
        for (logical, aliases) in self.catalog_columns.logical_fields() {
            if aliases.iter().any(|a| a == header) {
                let column = table
                    .resolve_column(aliases)
                    .map(str::to_string)
                    .unwrap_or_else(|| header.to_string());
                return (Some(logical), column);
            }
        }
        (None, header.to_string())
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn require_column(table: &Table, aliases: &[String], table_name: &str) -> RepositoryResult<String> {
    table
        .resolve_column(aliases)
        .map(str::to_string)
        .ok_or_else(|| RepositoryError::MissingColumn {
            table: table_name.to_string(),
            column: aliases.first().cloned().unwrap_or_default(),
        })
}

fn require_thickness(criteria: &MaterialCriteria) -> RepositoryResult<f64> {
    criteria.thickness.ok_or_else(|| {
        RepositoryError::ValidationError("Espessura é obrigatória para a busca".to_string())
    })
}

fn numeric_eq(cell: Option<&CellValue>, target: f64) -> bool {
    cell.and_then(CellValue::as_f64)
        .map(|v| (v - target).abs() < EPSILON)
        .unwrap_or(false)
}

/// 大小写不敏感的包含匹配
fn text_contains(cell: Option<&CellValue>, needle: &str) -> bool {
    cell.map(|v| v.to_string().to_uppercase().contains(&needle.to_uppercase()))
        .unwrap_or(false)
}

fn code_text(row: &Row, column: &str) -> String {
    row.get(column)
        .map(|v| v.to_string().trim().to_string())
        .unwrap_or_default()
}

impl MaterialCatalog for TableCatalog {
    fn find_exact_code(&self, criteria: &MaterialCriteria) -> RepositoryResult<Option<String>> {
        let thickness = require_thickness(criteria)?;
        let table = self.load_materials()?;

        let cols = &self.catalog_columns;
        let code_col = require_column(&table, &cols.material_code, MATERIALS)?;
        let thickness_col = require_column(&table, &cols.thickness, MATERIALS)?;
        let width_col = require_column(&table, &cols.width, MATERIALS)?;
        let length_col = require_column(&table, &cols.length, MATERIALS)?;
        let lamination_col = require_column(&table, &cols.lamination_type, MATERIALS)?;
        let quality_col = require_column(&table, &cols.quality, MATERIALS)?;

        let mut candidates: Vec<&Row> = table
            .rows
            .iter()
            .filter(|r| numeric_eq(r.get(&thickness_col), thickness))
            .collect();
        tracing::debug!("厚度 {} 过滤后剩余 {} 行", thickness, candidates.len());

        if let Some(quality) = &criteria.quality {
            candidates.retain(|r| text_contains(r.get(&quality_col), quality));
            tracing::debug!("质量 {} 过滤后剩余 {} 行", quality, candidates.len());
        }
        if let Some(width) = criteria.width {
            candidates.retain(|r| numeric_eq(r.get(&width_col), width));
            tracing::debug!("宽度 {} 过滤后剩余 {} 行", width, candidates.len());
        }
        if let Some(length) = criteria.length {
            candidates.retain(|r| numeric_eq(r.get(&length_col), length));
            tracing::debug!("长度 {} 过滤后剩余 {} 行", length, candidates.len());
        }
        if let Some(lamination) = &criteria.lamination {
            candidates.retain(|r| text_contains(r.get(&lamination_col), lamination));
            tracing::debug!("轧制类型 {} 过滤后剩余 {} 行", lamination, candidates.len());
        }

        let code = candidates
            .first()
            .map(|r| code_text(r, &code_col))
            .filter(|c| !c.is_empty());
        tracing::info!("精确查找结果: {:?}", code);
        Ok(code)
    }

    fn find_alternatives(&self, criteria: &MaterialCriteria) -> RepositoryResult<Vec<Row>> {
        let thickness = require_thickness(criteria)?;
        let table = self.load_materials()?;
        let thickness_col = require_column(&table, &self.catalog_columns.thickness, MATERIALS)?;

        // 区间 [t - 容差, t + 容差)：下界含，上界不含
        let min = thickness - self.tolerance - EPSILON;
        let max = thickness + self.tolerance - EPSILON;

        let mut skipped = 0usize;
        let rows: Vec<Row> = table
            .rows
            .into_iter()
            .filter(|r| match r.get(&thickness_col).and_then(CellValue::as_f64) {
                Some(v) => v >= min && v < max,
                None => {
                    skipped += 1;
                    false
                }
            })
            .collect();

        if skipped > 0 {
            tracing::debug!("替代品查找: {} 行厚度为空或非数值，已跳过", skipped);
        }
        tracing::info!(
            "替代品查找: 厚度 {} ± {} → {} 行",
            thickness,
            self.tolerance,
            rows.len()
        );
        Ok(rows)
    }

    fn find_sales_by_code(&self, code: &str) -> RepositoryResult<Vec<Row>> {
        let table = self.load_sales()?;
        let code_col = require_column(&table, &self.sales_columns.material_code, SALES)?;

        let code = code.trim();
        let numeric = code.parse::<i64>().ok();
        let rows: Vec<Row> = table
            .rows
            .into_iter()
            .filter(|r| {
                let cell = r.get(&code_col);
                match numeric {
                    // 编码在表中可能存为数值或文本
                    Some(n) => cell.and_then(CellValue::as_i64) == Some(n),
                    None => cell.map(|v| v.to_string().trim() == code).unwrap_or(false),
                }
            })
            .collect();

        tracing::info!("销售历史查询: code={}, {} 行", code, rows.len());
        Ok(rows)
    }

    fn add_material(&self, fields: &IndexMap<String, String>) -> RepositoryResult<String> {
        let mut table = self.load_materials()?;

        let code_col = table
            .resolve_column(&self.catalog_columns.material_code)
            .map(str::to_string)
            .or_else(|| self.catalog_columns.material_code.first().cloned())
            .ok_or_else(|| RepositoryError::MissingColumn {
                table: MATERIALS.to_string(),
                column: "MATERIAL_CODE".to_string(),
            })?;

        let next_code = table
            .rows
            .iter()
            .filter_map(|r| r.get(&code_col).and_then(CellValue::as_i64))
            .max()
            .map(|max| max.saturating_add(1))
            .unwrap_or(1);

        let mut row = Row::new();
        row.insert(code_col.clone(), CellValue::Int(next_code));
        for (key, value) in fields {
            let header = normalize_header(key);
            if header.is_empty() {
                continue;
            }
            let (logical, column) = self.target_column(&table, &header);
            let cell = match logical {
                // 编码由系统分配，忽略调用方提供的值
                Some("MATERIAL_CODE") => continue,
                Some("THICKNESS") | Some("WIDTH") | Some("LENGTH") => parse_decimal(value)
                    .map(CellValue::Float)
                    .unwrap_or_else(|| CellValue::from_input(value)),
                _ => CellValue::from_input(value),
            };
            row.insert(column, cell);
        }

        table.push_row(row);
        self.persist_materials(&table)?;

        let code = next_code.to_string();
        tracing::info!("新增材料: code={}, 目录行数={}", code, table.len());
        Ok(code)
    }

    fn assign_group_many(&self, codes: &[String], group: &str) -> RepositoryResult<usize> {
        let wanted: Vec<String> = codes
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if wanted.is_empty() {
            return Err(RepositoryError::ValidationError(
                "Nenhum código de material informado".to_string(),
            ));
        }

        let mut table = self.load_materials()?;
        let code_col = require_column(&table, &self.catalog_columns.material_code, MATERIALS)?;

        // 先校验全部编码存在，再修改
        let missing: Vec<&str> = wanted
            .iter()
            .filter(|c| !table.rows.iter().any(|r| code_text(r, &code_col) == **c))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            tracing::warn!("归组失败，编码不存在: {:?}", missing);
            return Err(RepositoryError::CodeNotFound(missing.join(", ")));
        }

        let group_col = table
            .resolve_column(&self.catalog_columns.group)
            .map(str::to_string)
            .or_else(|| self.catalog_columns.group.first().cloned())
            .unwrap_or_else(|| "GROUP".to_string());
        table.ensure_column(&group_col);

        let mut updated = 0usize;
        for row in &mut table.rows {
            if wanted.contains(&code_text(row, &code_col)) {
                row.insert(group_col.clone(), CellValue::from(group));
                updated += 1;
            }
        }

        self.persist_materials(&table)?;
        tracing::info!("归组完成: group={}, 更新 {} 行", group, updated);
        Ok(updated)
    }
}
