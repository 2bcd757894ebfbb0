// ==========================================
// 客户名单导入 - 核心库
// ==========================================
// 职责: CSV/XLSX 客户名单 → 强类型、逐行校验的客户数据
// 边界: 不持久化、不渲染、不联网
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 解析结果与客户字段
pub mod domain;

// 导入层 - 解码、物化、归一化
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, ClientField, ClientImportColumnMapping, ClientPayload, FieldError, FileType,
    ImportDiagnostics, NormalizedClientRow, ParsedImportFile, ParsedImportSheet, RawImportRow,
};

// 导入器
pub use importer::{
    get_default_sheet_name, ClientImporter, ImportError, ImportResult, ImportSource,
    InMemorySource, LocalFileSource, RowNormalizer,
};

// 配置
pub use config::{ConfigManager, ImportConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "client-import";
