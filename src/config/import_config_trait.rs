// ==========================================
// 客户名单导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 JSON 键值文件读取）
pub trait ImportConfigReader: Send + Sync {
    /// 获取首选工作表名称（大小写不敏感匹配）
    ///
    /// # 默认值
    /// - "Clientes"
    fn get_preferred_sheet_name(&self) -> ImportResult<String>;

    /// 获取 CSV 候选分隔符（按优先级）
    ///
    /// # 默认值
    /// - `,` `\t` `|` `;`
    fn get_csv_delimiters(&self) -> ImportResult<Vec<u8>>;

    /// 获取分隔符探测的预览行数
    ///
    /// # 默认值
    /// - 10
    fn get_csv_preview_rows(&self) -> ImportResult<usize>;

    /// 获取界面语言
    ///
    /// # 默认值
    /// - "pt-BR"
    fn get_locale(&self) -> ImportResult<String>;
}
