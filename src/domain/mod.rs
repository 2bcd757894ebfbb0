// ==========================================
// 客户名单导入 - 领域模型层
// ==========================================
// 职责: 定义解析结果、客户字段、归一化结果
// 红线: 不含解码逻辑,不含持久化
// ==========================================

pub mod client;
pub mod import;

// 重导出核心类型
pub use client::{
    ClientField, ClientImportColumnMapping, ClientPayload, FieldError, FieldKind,
    ImportDiagnostics, NormalizedClientRow,
};
pub use import::{
    CellMatrix, CellValue, FileType, MatrixRow, NamedMatrix, ParsedImportFile, ParsedImportSheet,
    RawImportRow,
};
