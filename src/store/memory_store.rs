// ==========================================
// 材料目录智能助手 - 内存数据源
// ==========================================
// 用途: 测试与嵌入式调用
// 版本令牌: 每次写入递增的计数器
// ==========================================

use crate::domain::Table;
use crate::store::error::{StoreError, StoreResult};
use crate::store::table_store::TableStore;
use std::sync::Mutex;

struct MemoryState {
    table: Table,
    revision: u64,
    fail_writes: bool,
}

pub struct MemoryTableStore {
    name: String,
    state: Mutex<MemoryState>,
}

impl MemoryTableStore {
    pub fn new(name: &str, mut table: Table) -> Self {
        table.normalize_headers();
        table.revision = None;
        Self {
            name: name.to_string(),
            state: Mutex::new(MemoryState {
                table,
                revision: 0,
                fail_writes: false,
            }),
        }
    }

    /// 当前内容快照
    pub fn snapshot(&self) -> StoreResult<Table> {
        self.load()
    }

    /// 当前版本号（写入次数）
    pub fn revision(&self) -> StoreResult<u64> {
        let state = self.lock()?;
        Ok(state.revision)
    }

    /// 模拟写入失败
    pub fn set_fail_writes(&self, fail: bool) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.fail_writes = fail;
        Ok(())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }
}

impl TableStore for MemoryTableStore {
    fn load(&self) -> StoreResult<Table> {
        let state = self.lock()?;
        let mut table = state.table.clone();
        table.revision = Some(state.revision.to_string());
        Ok(table)
    }

    fn replace(&self, table: &Table) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.fail_writes {
            return Err(StoreError::WriteError(format!(
                "{}: escrita desabilitada",
                self.name
            )));
        }

        let actual = state.revision.to_string();
        if let Some(expected) = &table.revision {
            if *expected != actual {
                return Err(StoreError::RevisionConflict {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let mut stored = table.clone();
        stored.revision = None;
        state.table = stored;
        state.revision += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}
