// ==========================================
// 材料目录智能助手 - 数据源层
// ==========================================
// 职责: 整表读取 / 整表覆盖写入
// 支持: Excel, CSV, 远程 API, 内存
// ==========================================

pub mod error;
pub mod file_store;
pub mod http_store;
pub mod memory_store;
pub mod table_store;

pub use error::{StoreError, StoreResult};
pub use file_store::FileTableStore;
pub use http_store::HttpTableStore;
pub use memory_store::MemoryTableStore;
pub use table_store::TableStore;

use std::sync::Arc;

/// 按位置选择数据源: http(s):// → HttpTableStore，其余视为表格文件
///
/// `sheet` 仅对 Excel 文件生效
pub fn open_store(location: &str, sheet: Option<&str>) -> StoreResult<Arc<dyn TableStore>> {
    let trimmed = location.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(Arc::new(HttpTableStore::new(trimmed)?));
    }
    let store = match sheet {
        Some(name) => FileTableStore::new(trimmed).with_sheet(name),
        None => FileTableStore::new(trimmed),
    };
    Ok(Arc::new(store))
}
