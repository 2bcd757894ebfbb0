// ==========================================
// 客户名单导入 - 表格解码器实现
// ==========================================
// 职责: 原始文件内容 → 单元格矩阵（CSV 一个,XLSX 每个工作表一个）
// 支持: CSV (.csv) / Excel (.xlsx)
// ==========================================

use crate::domain::import::{CellMatrix, CellValue, MatrixRow, NamedMatrix};
use crate::importer::error::DecodeError;
use calamine::{Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::io::Cursor;

/// 默认候选分隔符（按优先级）
pub const DEFAULT_DELIMITERS: &[u8] = b",\t|;";

/// 分隔符探测的默认预览行数
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

// ==========================================
// DecodedWorkbook - 解码结果（按格式区分）
// ==========================================
// 两个分支收敛到同一矩阵形状,后续阶段不再区分格式
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedWorkbook {
    Csv(CellMatrix),
    Xlsx(Vec<NamedMatrix>),
}

impl DecodedWorkbook {
    /// 展开为命名矩阵列表（CSV 使用给定的工作表名）
    pub fn into_named_matrices(self, csv_sheet_name: &str) -> Vec<NamedMatrix> {
        match self {
            DecodedWorkbook::Csv(rows) => vec![NamedMatrix {
                name: csv_sheet_name.to_string(),
                rows,
            }],
            DecodedWorkbook::Xlsx(sheets) => sheets,
        }
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser {
    delimiters: Vec<u8>,
    preview_rows: usize,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITERS.to_vec(), DEFAULT_PREVIEW_ROWS)
    }
}

impl CsvParser {
    pub fn new(delimiters: Vec<u8>, preview_rows: usize) -> Self {
        Self {
            delimiters,
            preview_rows: preview_rows.max(1),
        }
    }

    /// 解码 UTF-8 文本为单元格矩阵
    ///
    /// # 规则
    /// - 自动探测分隔符
    /// - 全部字段为空白的记录直接丢弃（贪婪跳过空行）
    /// - 引号未闭合视为结构错误
    pub fn decode(&self, text: &str) -> Result<CellMatrix, DecodeError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let delimiter = detect_delimiter(text, &self.delimiters, self.preview_rows);

        if let Some(line) = find_unterminated_quote(text, delimiter) {
            return Err(DecodeError::Csv(format!(
                "campo entre aspas não terminado a partir da linha {}",
                line
            )));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let mut lines = LineTracker::new(text);
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;

            // 跳过完全空白的行
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let line = match record.position() {
                Some(pos) => lines.line_at(pos.byte() as usize),
                None => rows.len() + 1,
            };
            let cells = record
                .iter()
                .map(|field| CellValue::Text(field.to_string()))
                .collect();

            rows.push(MatrixRow::new(line, cells));
        }

        Ok(rows)
    }
}

/// 字节偏移 → 行号（增量计数,记录按顺序查询）
///
/// csv 记录的起始位置可能落在被跳过的空行之前,因此先越过换行符再计数。
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, byte: usize) -> usize {
        let mut target = byte.min(self.bytes.len()).max(self.offset);
        while target < self.bytes.len() && matches!(self.bytes[target], b'\n' | b'\r') {
            target += 1;
        }

        self.line += (self.offset..target)
            .filter(|&i| is_line_break(self.bytes, i))
            .count();
        self.offset = target;
        self.line
    }
}

/// 该字节是否结束一行: "\n"、"\r\n" 中的 "\n"、单独的 "\r"（旧版 Mac 导出）
fn is_line_break(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'\n' => true,
        b'\r' => bytes.get(i + 1) != Some(&b'\n'),
        _ => false,
    }
}

/// 探测 CSV 分隔符
///
/// 对每个候选分隔符解析前 N 条记录,平均字段数 ≤ 1.99 的候选淘汰;
/// 相邻记录字段数差值之和最小者胜出,平局取平均字段数更大者。
/// 无候选胜出时回退为逗号。
pub fn detect_delimiter(text: &str, candidates: &[u8], preview_rows: usize) -> u8 {
    let mut best: Option<(u8, usize, f64)> = None;

    for &delimiter in candidates {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let mut field_counts = Vec::new();
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(_) => break,
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            field_counts.push(record.len());
            if field_counts.len() >= preview_rows {
                break;
            }
        }

        if field_counts.is_empty() {
            continue;
        }

        let avg = field_counts.iter().sum::<usize>() as f64 / field_counts.len() as f64;
        if avg <= 1.99 {
            continue;
        }

        let delta: usize = field_counts
            .windows(2)
            .map(|pair| pair[0].abs_diff(pair[1]))
            .sum();

        let is_better = match best {
            None => true,
            Some((_, best_delta, best_avg)) => {
                delta < best_delta || (delta == best_delta && avg > best_avg)
            }
        };
        if is_better {
            best = Some((delimiter, delta, avg));
        }
    }

    best.map(|(delimiter, _, _)| delimiter).unwrap_or(b',')
}

/// 查找未闭合的引号字段,返回其起始行号（1 起）
fn find_unterminated_quote(text: &str, delimiter: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut line = 1;
    let mut quote_line = 0;
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_quotes {
            if b == b'"' {
                // "" 为转义引号
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                in_quotes = false;
            } else if is_line_break(bytes, i) {
                line += 1;
            }
        } else if b == b'\n' || b == b'\r' {
            if is_line_break(bytes, i) {
                line += 1;
            }
            at_field_start = true;
        } else if b == delimiter {
            at_field_start = true;
        } else if b == b'"' && at_field_start {
            in_quotes = true;
            quote_line = line;
            at_field_start = false;
        } else {
            at_field_start = false;
        }

        i += 1;
    }

    if in_quotes {
        Some(quote_line)
    } else {
        None
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 解码 XLSX 二进制内容,按工作簿顺序返回每个工作表的矩阵
    pub fn decode(&self, bytes: Vec<u8>) -> Result<Vec<NamedMatrix>, DecodeError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

        let sheet_names = workbook.sheet_names();
        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook.worksheet_range(&name)?;
            sheets.push(NamedMatrix {
                name,
                rows: range_to_matrix(&range),
            });
        }

        Ok(sheets)
    }
}

/// 工作表区域 → 矩阵
///
/// calamine 的区域从首个非空单元格开始,这里按起始列补齐空单元格,
/// 使列位置与 A 列起算一致;行号为工作表绝对行号。
fn range_to_matrix(range: &Range<Data>) -> CellMatrix {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    range
        .rows()
        .enumerate()
        .map(|(offset, row)| {
            let mut cells = vec![CellValue::Text(String::new()); first_col as usize];
            cells.extend(row.iter().map(convert_cell));
            MatrixRow::new(first_row as usize + offset + 1, cells)
        })
        .collect()
}

/// 单元格转换: 日期类单元格物化为日期,空单元格默认为空字符串
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Text(String::new()),
    }
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(row: &MatrixRow) -> Vec<String> {
        row.cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_csv_parser_comma() {
        let parser = CsvParser::default();
        let rows = parser.decode("Nome,Conta\nAna,123\nBia,456\n").unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(texts(&rows[0]), vec!["Nome", "Conta"]);
        assert_eq!(texts(&rows[2]), vec!["Bia", "456"]);
        assert_eq!(rows[2].line, 3);
    }

    #[test]
    fn test_csv_parser_detects_semicolon() {
        let parser = CsvParser::default();
        let rows = parser
            .decode("Nome;Patrimônio;% CDI\nAna;1.234,56;0,8083\nBia;10,00;1,674\n")
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(texts(&rows[1]), vec!["Ana", "1.234,56", "0,8083"]);
    }

    #[test]
    fn test_detect_delimiter_tab_and_fallback() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3\n", DEFAULT_DELIMITERS, 10), b'\t');
        assert_eq!(detect_delimiter("a|b\n1|2\n", DEFAULT_DELIMITERS, 10), b'|');
        // 单列文件: 无候选胜出,回退逗号
        assert_eq!(detect_delimiter("nome\nana\n", DEFAULT_DELIMITERS, 10), b',');
    }

    #[test]
    fn test_csv_parser_greedy_skips_blank_lines() {
        let parser = CsvParser::default();
        let rows = parser
            .decode("Nome,Conta\n\n   \nAna,123\n , \nBia,456\n")
            .unwrap();

        assert_eq!(rows.len(), 3);
        // 行号保持源文件行号
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[2].line, 6);
    }

    #[test]
    fn test_csv_parser_counts_cr_only_line_endings() {
        let parser = CsvParser::default();
        let rows = parser.decode("Nome,Conta\rAna,1\rBia,2\r").unwrap();

        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(texts(&rows[2]), vec!["Bia", "2"]);
    }

    #[test]
    fn test_csv_parser_mixed_line_endings() {
        let parser = CsvParser::default();
        let rows = parser
            .decode("Nome,Conta\r\nAna,1\r\rBia,2\nCarla,3\r\n")
            .unwrap();

        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_unterminated_quote_line_with_cr_endings() {
        let parser = CsvParser::default();
        let err = parser.decode("Nome,Conta\rAna,1\r\"Bia,2\r").unwrap_err();

        assert!(err.to_string().contains("linha 3"), "{}", err);
    }

    #[test]
    fn test_csv_parser_quoted_fields() {
        let parser = CsvParser::default();
        let rows = parser
            .decode("Nome,Obs\n\"Silva, Ana\",\"disse \"\"oi\"\"\nna linha\"\n")
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(texts(&rows[1]), vec!["Silva, Ana", "disse \"oi\"\nna linha"]);
    }

    #[test]
    fn test_csv_parser_unterminated_quote() {
        let parser = CsvParser::default();
        let err = parser.decode("Nome,Conta\nAna,123\n\"Bia,456\n").unwrap_err();

        assert!(err.to_string().contains("linha 3"), "{}", err);
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let parser = CsvParser::default();
        let rows = parser.decode("\u{feff}Nome,Conta\nAna,1\n").unwrap();

        assert_eq!(texts(&rows[0]), vec!["Nome", "Conta"]);
    }

    #[test]
    fn test_excel_parser_rejects_corrupt_archive() {
        let parser = ExcelParser;
        let result = parser.decode(b"definitely not a zip archive".to_vec());

        assert!(matches!(result, Err(DecodeError::Excel(_))));
    }

    #[test]
    fn test_decoded_workbook_csv_uses_given_name() {
        let decoded = DecodedWorkbook::Csv(vec![MatrixRow::new(1, vec![CellValue::from("a")])]);
        let sheets = decoded.into_named_matrices("clientes");

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "clientes");
    }
}
