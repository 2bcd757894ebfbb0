// ==========================================
// 客户名单导入 - 表头去重与工作表物化
// ==========================================
// 职责: 首行 → 唯一表头; 其余行 → 按表头键控的数据行
// 纯函数: 不依赖文件 I/O,不保留状态
// ==========================================

use crate::domain::import::{CellMatrix, CellValue, ParsedImportSheet, RawImportRow};
use std::collections::{BTreeMap, HashMap};

/// 表头去重
///
/// 基础标签为去空白后的字符串形式,空单元格使用 "Column N"（1 起）。
/// 同一基础标签第 K 次出现（K ≥ 2）输出为 "<base> (<K>)"。
/// 若带后缀的标签恰好与已有表头重名,继续递增 K 直至唯一。
pub fn normalize_headers(header_row: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut emitted: Vec<String> = Vec::with_capacity(header_row.len());

    for (idx, cell) in header_row.iter().enumerate() {
        let text = cell.to_trimmed_string();
        let base = if text.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            text
        };

        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;

        let mut header = if *count == 1 {
            base.clone()
        } else {
            format!("{} ({})", base, count)
        };
        while emitted.contains(&header) {
            *count += 1;
            header = format!("{} ({})", base, count);
        }

        emitted.push(header);
    }

    emitted
}

/// 行是否全部为空白（空值或去空白后为空的字符串）
pub fn is_blank_row<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    values.into_iter().all(CellValue::is_blank)
}

/// 矩阵 → 工作表
///
/// # 规则
/// - 空矩阵: 表头与数据行均为空（不是错误）
/// - 超出表头长度的列忽略,短行缺失的列视为空
/// - 全空白行丢弃
pub fn materialize_sheet(name: &str, matrix: CellMatrix) -> ParsedImportSheet {
    let mut rows_iter = matrix.into_iter();

    let header_row = match rows_iter.next() {
        Some(row) => row,
        None => {
            return ParsedImportSheet {
                name: name.to_string(),
                headers: Vec::new(),
                rows: Vec::new(),
            }
        }
    };

    let headers = normalize_headers(&header_row.cells);

    let rows = rows_iter
        .filter_map(|row| {
            let mut cells = row.cells.into_iter();
            let values: BTreeMap<String, CellValue> = headers
                .iter()
                .map(|header| (header.clone(), cells.next().unwrap_or(CellValue::Empty)))
                .collect();

            if is_blank_row(values.values()) {
                None
            } else {
                Some(RawImportRow {
                    row_index: row.line,
                    values,
                })
            }
        })
        .collect();

    ParsedImportSheet {
        name: name.to_string(),
        headers,
        rows,
    }
}
