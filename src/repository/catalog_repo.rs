// ==========================================
// 材料目录智能助手 - 目录仓储 Trait
// ==========================================
// 职责: 定义目录/销售数据访问接口（不包含实现）
// 实现者: TableCatalog（任意 TableStore 组合: 表格文件 / 远程 API / 内存）
// 匹配引擎只依赖本接口
// ==========================================

use crate::domain::{MaterialCriteria, Row};
use crate::repository::error::RepositoryResult;
use indexmap::IndexMap;

pub trait MaterialCatalog: Send + Sync {
    /// 精确查找材料编码
    ///
    /// # 规则
    /// 1. 厚度相等（必需）
    /// 2. 依次收窄: 质量(包含) → 宽度(相等) → 长度(相等) → 轧制类型(包含)，仅当条件存在
    /// 3. 返回剩余第一行的编码
    ///
    /// # 错误
    /// - ValidationError: 条件缺少厚度
    /// - MissingColumn: 目录表缺少必需列
    fn find_exact_code(&self, criteria: &MaterialCriteria) -> RepositoryResult<Option<String>>;

    /// 查找替代品: 厚度落在 [t - 容差, t + 容差) 的全部行，忽略其他条件
    fn find_alternatives(&self, criteria: &MaterialCriteria) -> RepositoryResult<Vec<Row>>;

    /// 按编码查询销售历史（编码可解析为整数时按数值比较，否则按字符串比较）
    fn find_sales_by_code(&self, code: &str) -> RepositoryResult<Vec<Row>>;

    /// 新增材料，编码 = 现有最大数值编码 + 1（无数值编码时为 "1"）
    ///
    /// # 返回
    /// - Ok(String): 新编码
    fn add_material(&self, fields: &IndexMap<String, String>) -> RepositoryResult<String>;

    /// 将编码对应的所有行归入分组（分组列不存在时创建）
    ///
    /// # 返回
    /// - Ok(usize): 更新行数
    /// - Err(CodeNotFound): 无匹配行，表格不被修改
    fn assign_group(&self, code: &str, group: &str) -> RepositoryResult<usize> {
        self.assign_group_many(&[code.to_string()], group)
    }

    /// 批量归组: 所有编码都必须存在，否则不写入
    fn assign_group_many(&self, codes: &[String], group: &str) -> RepositoryResult<usize>;
}
