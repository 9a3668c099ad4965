// ==========================================
// 材料目录智能助手 - 表格文件数据源
// ==========================================
// 读取: Excel (.xlsx/.xls) 经 calamine, CSV 经 csv
// 写入: Excel (.xlsx) 经 rust_xlsxwriter, CSV 经 csv
// 版本令牌: 文件长度 + 修改时间（读取前后各取一次）
// 回写: 同目录临时文件 + rename，失败时原文件不变
// ==========================================

use crate::domain::{CellValue, Row, Table};
use crate::store::error::{StoreError, StoreResult};
use crate::store::table_store::TableStore;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::Timelike;
use csv::{ReaderBuilder, Writer};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tempfile::NamedTempFile;

/// 空白表头的占位列名前缀（回写时还原为空白）
const UNNAMED_PREFIX: &str = "UNNAMED: ";

/// 读取期间文件被改写时的最大重读次数
const READ_ATTEMPTS: usize = 3;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    fn from_path(path: &Path) -> StoreResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xlsm" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            _ => Err(StoreError::UnsupportedFormat(ext)),
        }
    }
}

pub struct FileTableStore {
    path: PathBuf,
    sheet: Option<String>,
}

impl FileTableStore {
    /// 读取第一个工作表
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: None,
        }
    }

    /// 指定工作表名（仅 Excel；CSV 忽略）
    pub fn with_sheet(mut self, sheet: &str) -> Self {
        let sheet = sheet.trim();
        self.sheet = (!sheet.is_empty()).then(|| sheet.to_string());
        self
    }

    fn current_revision(&self) -> StoreResult<String> {
        let meta = std::fs::metadata(&self.path)?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Ok(format!("{}-{}", meta.len(), modified))
    }

    /// 读取前后版本令牌一致才接受结果，否则重读
    fn read_stable<F>(&self, mut read: F) -> StoreResult<Table>
    where
        F: FnMut() -> StoreResult<Table>,
    {
        for attempt in 1..=READ_ATTEMPTS {
            let before = self.current_revision()?;
            let mut table = read()?;
            let after = self.current_revision()?;
            if before == after {
                table.revision = Some(before);
                return Ok(table);
            }
            tracing::warn!(
                "读取期间文件被修改，重新读取: path={}, attempt={}",
                self.path.display(),
                attempt
            );
        }
        Err(StoreError::FileReadError(format!(
            "{} alterado durante a leitura",
            self.path.display()
        )))
    }

    /// 先写同目录临时文件，成功后整体替换目标文件
    fn write_atomically<F>(&self, write: F) -> StoreResult<()>
    where
        F: FnOnce(&mut File) -> StoreResult<()>,
    {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
        write(temp.as_file_mut())?;
        temp.as_file().sync_all().map_err(write_error)?;

        // 保留原文件权限
        if let Ok(meta) = std::fs::metadata(&self.path) {
            temp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_error)?;
        }
        temp.persist(&self.path)
            .map_err(|e| StoreError::WriteError(e.error.to_string()))?;
        Ok(())
    }

    // ==========================================
    // CSV 读写
    // ==========================================

    fn read_csv(&self) -> StoreResult<Table> {
        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers = column_names(reader.headers()?.iter());

        let mut table = Table::new(headers.clone());
        for result in reader.records() {
            let record = result?;
            let mut row = Row::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    // CSV 单元格保持文本，避免回写时改变 "00123" 之类的编码
                    row.insert(header.clone(), CellValue::from_input(value));
                }
            }
            push_non_blank(&mut table, row);
        }
        Ok(table)
    }

    fn write_csv(&self, table: &Table, file: &mut File) -> StoreResult<()> {
        let mut writer = Writer::from_writer(file);
        writer
            .write_record(table.columns.iter().map(|c| output_header(c)))
            .map_err(write_error)?;
        for row in &table.rows {
            let record: Vec<String> = table
                .columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            writer.write_record(&record).map_err(write_error)?;
        }
        writer.flush().map_err(write_error)?;
        Ok(())
    }

    // ==========================================
    // Excel 读写
    // ==========================================

    fn read_excel(&self) -> StoreResult<Table> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let sheet_name = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook.sheet_names().first().cloned().ok_or_else(|| {
                StoreError::ExcelParseError("Arquivo Excel sem planilhas".to_string())
            })?,
        };
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）；空表返回无列的空表
        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => column_names(header_row.iter().map(|cell| cell.to_string())),
            None => return Ok(Table::default()),
        };

        let mut table = Table::new(headers.clone());
        for data_row in rows {
            let mut row = Row::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), cell_from_excel(cell));
                }
            }
            push_non_blank(&mut table, row);
        }
        Ok(table)
    }

    /// 现有工作簿的全部工作表（按原顺序）；文件不存在或为空时返回空
    fn existing_sheets(&self) -> StoreResult<Vec<(String, Range<Data>)>> {
        let has_content = std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !has_content {
            return Ok(Vec::new());
        }

        let mut workbook = open_workbook_auto(&self.path)?;
        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            sheets.push((name, range));
        }
        Ok(sheets)
    }

    /// 重写目标工作表，其余工作表按单元格值原样保留
    fn write_xlsx(&self, table: &Table, file: &mut File) -> StoreResult<()> {
        let existing = self.existing_sheets()?;
        let target = self
            .sheet
            .clone()
            .or_else(|| existing.first().map(|(name, _)| name.clone()));

        let mut workbook = Workbook::new();
        let mut target_written = false;
        for (name, range) in &existing {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;
            if target.as_deref() == Some(name.as_str()) {
                write_table(worksheet, table)?;
                target_written = true;
            } else {
                copy_range(worksheet, range)?;
            }
        }
        if !target_written {
            let worksheet = workbook.add_worksheet();
            if let Some(name) = &target {
                worksheet.set_name(name)?;
            }
            write_table(worksheet, table)?;
        }

        let buffer = workbook.save_to_buffer()?;
        file.write_all(&buffer).map_err(write_error)?;
        Ok(())
    }
}

fn write_error(err: impl ToString) -> StoreError {
    StoreError::WriteError(err.to_string())
}

/// 表头去空白；空白表头按列序号生成占位名，保证该列数据不丢失
fn column_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let header = header.as_ref().trim();
            if header.is_empty() {
                format!("{}{}", UNNAMED_PREFIX, idx)
            } else {
                header.to_string()
            }
        })
        .collect()
}

/// 占位列名回写为空白表头
fn output_header(column: &str) -> &str {
    match column.strip_prefix(UNNAMED_PREFIX) {
        Some(idx) if !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()) => "",
        _ => column,
    }
}

/// 跳过完全空白的行
fn push_non_blank(table: &mut Table, row: Row) {
    if row.values().all(CellValue::is_empty) {
        return;
    }
    table.push_row(row);
}

fn cell_from_excel(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::from_input(s),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.hour() == 0 && ndt.minute() == 0 && ndt.second() == 0 => {
                CellValue::Text(ndt.format("%Y-%m-%d").to_string())
            }
            Some(ndt) => CellValue::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::Empty => CellValue::Empty,
        other => CellValue::from_input(&other.to_string()),
    }
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> StoreResult<()> {
    for (col, header) in table.columns.iter().enumerate() {
        let header = output_header(header);
        if !header.is_empty() {
            worksheet.write_string(0, col as u16, header)?;
        }
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        for (col_idx, column) in table.columns.iter().enumerate() {
            let c = col_idx as u16;
            match row.get(column) {
                Some(CellValue::Int(i)) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                Some(CellValue::Float(f)) => {
                    worksheet.write_number(r, c, *f)?;
                }
                Some(CellValue::Bool(b)) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Some(CellValue::Text(s)) => {
                    worksheet.write_string(r, c, s)?;
                }
                Some(CellValue::Empty) | None => {}
            }
        }
    }
    Ok(())
}

fn copy_range(worksheet: &mut Worksheet, range: &Range<Data>) -> StoreResult<()> {
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let (row0, col0) = range.start().unwrap_or((0, 0));

    for (r, c, cell) in range.used_cells() {
        let row = row0 + r as u32;
        let col = (col0 as usize + c) as u16;
        match cell {
            Data::Int(i) => {
                worksheet.write_number(row, col, *i as f64)?;
            }
            Data::Float(f) => {
                worksheet.write_number(row, col, *f)?;
            }
            Data::Bool(b) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            Data::String(s) => {
                worksheet.write_string(row, col, s)?;
            }
            Data::DateTime(dt) if dt.is_datetime() => {
                let serial = dt.as_f64();
                let format = if serial.fract() == 0.0 {
                    &date_format
                } else {
                    &datetime_format
                };
                let value = ExcelDateTime::from_serial_datetime(serial)?;
                worksheet.write_datetime_with_format(row, col, &value, format)?;
            }
            Data::DateTime(dt) => {
                worksheet.write_number(row, col, dt.as_f64())?;
            }
            Data::Empty => {}
            other => {
                worksheet.write_string(row, col, other.to_string())?;
            }
        }
    }
    Ok(())
}

impl TableStore for FileTableStore {
    fn load(&self) -> StoreResult<Table> {
        if !self.path.exists() {
            return Err(StoreError::FileNotFound(self.path.display().to_string()));
        }

        let format = FileFormat::from_path(&self.path)?;
        let mut table = self.read_stable(|| match format {
            FileFormat::Csv => self.read_csv(),
            FileFormat::Xlsx | FileFormat::Xls => self.read_excel(),
        })?;
        table.normalize_headers();

        tracing::debug!(
            "读取表格: path={}, 行数={}, 列={:?}",
            self.path.display(),
            table.len(),
            table.columns
        );
        Ok(table)
    }

    fn replace(&self, table: &Table) -> StoreResult<()> {
        let format = FileFormat::from_path(&self.path)?;
        if format == FileFormat::Xls {
            return Err(StoreError::UnsupportedFormat(
                "xls (somente leitura; use .xlsx)".to_string(),
            ));
        }

        if let (Some(expected), true) = (&table.revision, self.path.exists()) {
            let actual = self.current_revision()?;
            if *expected != actual {
                tracing::warn!(
                    "表格已被其他会话修改: path={}, expected={}, actual={}",
                    self.path.display(),
                    expected,
                    actual
                );
                return Err(StoreError::RevisionConflict {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        self.write_atomically(|file| match format {
            FileFormat::Csv => self.write_csv(table, file),
            FileFormat::Xlsx | FileFormat::Xls => self.write_xlsx(table, file),
        })?;

        tracing::info!(
            "表格已回写: path={}, 行数={}",
            self.path.display(),
            table.len()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("{}#{}", self.path.display(), sheet),
            None => self.path.display().to_string(),
        }
    }
}
