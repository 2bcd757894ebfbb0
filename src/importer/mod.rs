// ==========================================
// 客户名单导入 - 导入层
// ==========================================
// 职责: 外部表格文件 → 统一矩阵 → 工作表 → 归一化客户行
// 支持: CSV, Excel (.xlsx)
// ==========================================

// 模块声明
pub mod client_importer;
pub mod error;
pub mod file_parser;
pub mod file_type;
pub mod import_source;
pub mod row_normalizer;
pub mod sheet_materializer;
pub mod value_parsers;

// 重导出核心类型
pub use client_importer::{get_default_sheet_name, ClientImporter};
pub use error::{DecodeError, FieldParseError, ImportError, ImportResult};
pub use file_parser::{detect_delimiter, CsvParser, DecodedWorkbook, ExcelParser};
pub use file_type::detect_file_type;
pub use import_source::{ImportSource, InMemorySource, LocalFileSource};
pub use row_normalizer::RowNormalizer;
pub use sheet_materializer::{is_blank_row, materialize_sheet, normalize_headers};
pub use value_parsers::{
    normalize_account_number, parse_birthday, parse_boolean_sim_nao, parse_br_number,
    parse_percent_cdi, Birthday, BIRTHDAY_PLACEHOLDER_YEAR,
};
