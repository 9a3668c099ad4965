// ==========================================
// 材料目录智能助手 - 表格数据源 Trait
// ==========================================
// 职责: 整表读取 / 整表覆盖写入（无增量接口）
// 实现者: FileTableStore（Excel/CSV）, HttpTableStore（远程 API）,
//         MemoryTableStore（测试）
// ==========================================

use crate::domain::Table;
use crate::store::error::StoreResult;

pub trait TableStore: Send + Sync {
    /// 读取整表
    ///
    /// # 返回
    /// - Ok(Table): 表头已 TRIM + UPPER，revision 为当前版本令牌（若数据源支持）
    /// - Err: 文件缺失、格式错误、远程调用失败
    fn load(&self) -> StoreResult<Table>;

    /// 用给定内容覆盖整表
    ///
    /// # 并发控制
    /// - table.revision 为 Some 时，与数据源当前版本比较，不一致返回 RevisionConflict
    /// - table.revision 为 None 时无条件覆盖
    fn replace(&self, table: &Table) -> StoreResult<()>;

    /// 数据源描述（用于日志）
    fn describe(&self) -> String;
}
