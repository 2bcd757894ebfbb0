// ==========================================
// 客户名单导入 - 解析结果领域模型
// ==========================================
// 职责: 描述文件解码后的统一结构（单元格矩阵 → 工作表 → 文件）
// 红线: 解析结果创建后只读,管道内不持有其所有权
// ==========================================

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// FileType - 文件类型
// ==========================================
// 仅由扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Xlsx,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Xlsx => write!(f, "xlsx"),
        }
    }
}

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// CSV 只产生 Text; XLSX 可产生全部类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// 空值或仅含空白的文本视为空白
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 去除首尾空白后的字符串形式
    pub fn to_trimmed_string(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            // f64 的 Display 已是最短形式（1.0 → "1"）
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Date(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

// ==========================================
// MatrixRow / CellMatrix - 解码矩阵
// ==========================================
// 两种格式解码后收敛到同一形状,后续阶段与格式无关
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub line: usize,            // 源文件行号（1 起）
    pub cells: Vec<CellValue>,  // 单元格（按列位置）
}

impl MatrixRow {
    pub fn new(line: usize, cells: Vec<CellValue>) -> Self {
        Self { line, cells }
    }
}

pub type CellMatrix = Vec<MatrixRow>;

/// 带名称的矩阵（XLSX 每个工作表一个）
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMatrix {
    pub name: String,
    pub rows: CellMatrix,
}

// ==========================================
// RawImportRow - 原始数据行
// ==========================================
// 每个表头都有一个条目（可能为空）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImportRow {
    pub row_index: usize,                       // 源文件行号（1 起,与电子表格一致）
    pub values: BTreeMap<String, CellValue>,    // 表头 → 单元格值
}

impl RawImportRow {
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.values.get(header)
    }
}

// ==========================================
// ParsedImportSheet - 工作表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedImportSheet {
    pub name: String,
    pub headers: Vec<String>,       // 唯一且保持原列顺序
    pub rows: Vec<RawImportRow>,    // 已剔除全空白行
}

// ==========================================
// ParsedImportFile - 解析后的文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedImportFile {
    pub file_name: String,
    pub file_size: u64,
    pub file_type: FileType,
    pub sheets: Vec<ParsedImportSheet>,
}

impl ParsedImportFile {
    /// 按名称查找工作表（大小写不敏感）
    pub fn sheet(&self, name: &str) -> Option<&ParsedImportSheet> {
        self.sheets
            .iter()
            .find(|s| s.name.to_lowercase() == name.to_lowercase())
    }

    /// 全部工作表的数据行总数
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}
