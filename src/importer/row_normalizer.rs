// ==========================================
// 客户名单导入 - 行归一化器
// ==========================================
// 职责: 原始行 + 列映射 → 客户数据 + 字段级错误
// 红线: 单个字段失败不阻断整行,行总是返回
// ==========================================

use crate::domain::client::{
    ClientField, ClientImportColumnMapping, ClientPayload, FieldError, FieldKind,
    ImportDiagnostics, NormalizedClientRow,
};
use crate::domain::import::{CellValue, ParsedImportSheet, RawImportRow};
use crate::importer::error::FieldParseError;
use crate::importer::value_parsers::{
    excel_serial_to_date, normalize_account_number, parse_birthday, parse_boolean_sim_nao,
    parse_br_number, parse_percent_cdi, scale_percent, Birthday,
};
use tracing::{debug, warn};

pub struct RowNormalizer {
    mapping: ClientImportColumnMapping,
}

impl RowNormalizer {
    pub fn new(mapping: ClientImportColumnMapping) -> Self {
        Self { mapping }
    }

    /// 归一化单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - row_index: 源文件行号（1 起,用于错误定位）
    ///
    /// 未映射的表头忽略; 映射中存在但行中缺失的表头跳过。
    pub fn normalize_row(&self, row: &RawImportRow, row_index: usize) -> NormalizedClientRow {
        let mut payload = ClientPayload::default();
        let mut errors = Vec::new();

        for (header, field) in self.mapping.iter() {
            let value = match row.get(header) {
                Some(value) => value,
                None => {
                    debug!(row_index, header = %header, "映射表头不在行中,跳过");
                    continue;
                }
            };

            if let Err(e) = apply_field(&mut payload, *field, value) {
                warn!(row_index, field = %field, error = %e, "字段解析失败");
                errors.push(FieldError {
                    field: *field,
                    row_index,
                    message: e.to_string(),
                });
            }
        }

        NormalizedClientRow {
            row_index,
            payload,
            errors,
        }
    }

    /// 归一化整个工作表（行号取自源文件）
    pub fn normalize_sheet(&self, sheet: &ParsedImportSheet) -> Vec<NormalizedClientRow> {
        let rows: Vec<NormalizedClientRow> = sheet
            .rows
            .iter()
            .map(|row| self.normalize_row(row, row.row_index))
            .collect();

        debug!(
            sheet = %sheet.name,
            rows = rows.len(),
            failed = rows.iter().filter(|r| r.has_errors()).count(),
            "工作表归一化完成"
        );

        rows
    }

    /// 汇总诊断（按行、按字段）
    pub fn summarize(rows: &[NormalizedClientRow]) -> ImportDiagnostics {
        let mut diagnostics = ImportDiagnostics {
            total_rows: rows.len(),
            ..Default::default()
        };

        for row in rows.iter().filter(|r| r.has_errors()) {
            diagnostics.rows_with_errors += 1;
            for error in &row.errors {
                *diagnostics.errors_by_field.entry(error.field).or_insert(0) += 1;
                diagnostics
                    .errors_by_row
                    .entry(error.row_index)
                    .or_default()
                    .push(format!("{}: {}", error.field, error.message));
            }
        }

        diagnostics
    }
}

/// 按字段类型分派解析器; 空白值视为未填写
fn apply_field(
    payload: &mut ClientPayload,
    field: ClientField,
    value: &CellValue,
) -> Result<(), FieldParseError> {
    if value.is_blank() {
        return Ok(());
    }

    match field.kind() {
        FieldKind::Text => payload.set_text(field, Some(value.to_trimmed_string())),
        FieldKind::Account => {
            let digits = normalize_account_number(&value.to_string());
            payload.set_text(field, Some(digits).filter(|d| !d.is_empty()));
        }
        FieldKind::Number => payload.set_number(field, Some(cell_to_number(value)?)),
        FieldKind::PercentCdi => payload.set_number(field, Some(cell_to_percent(value)?)),
        FieldKind::Boolean => payload.set_bool(field, cell_to_bool(value)?),
        FieldKind::Birthday => match cell_to_birthday(value)? {
            Birthday::FullDate(date) => {
                payload.birth_date = Some(date);
                payload.birth_day = None;
                payload.birth_month = None;
            }
            Birthday::Anniversary { day, month } => {
                payload.birth_date = None;
                payload.birth_day = Some(day);
                payload.birth_month = Some(month);
            }
        },
    }

    Ok(())
}

fn cell_to_number(value: &CellValue) -> Result<f64, FieldParseError> {
    match value {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(s) => parse_br_number(s),
        other => Err(FieldParseError::NumberFormat {
            value: other.to_string(),
        }),
    }
}

fn cell_to_percent(value: &CellValue) -> Result<f64, FieldParseError> {
    match value {
        CellValue::Number(n) => scale_percent(*n),
        CellValue::Text(s) => parse_percent_cdi(s),
        other => Err(FieldParseError::NumberFormat {
            value: other.to_string(),
        }),
    }
}

fn cell_to_bool(value: &CellValue) -> Result<Option<bool>, FieldParseError> {
    match value {
        CellValue::Bool(b) => Ok(Some(*b)),
        CellValue::Date(_) => Err(FieldParseError::BooleanFormat {
            value: value.to_string(),
        }),
        other => Ok(parse_boolean_sim_nao(&other.to_string())),
    }
}

fn cell_to_birthday(value: &CellValue) -> Result<Birthday, FieldParseError> {
    match value {
        CellValue::Date(dt) => Ok(Birthday::from_date(dt.date())),
        CellValue::Text(s) => parse_birthday(s),
        CellValue::Number(n) => excel_serial_to_date(*n)
            .map(Birthday::from_date)
            .ok_or_else(|| FieldParseError::DateFormat {
                value: value.to_string(),
            }),
        other => Err(FieldParseError::DateFormat {
            value: other.to_string(),
        }),
    }
}
