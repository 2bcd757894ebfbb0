// ==========================================
// 客户名单导入 - 本地化值解析器
// ==========================================
// 职责: 账号 / 巴西数值 / CDI 百分比 / Sim-Não 布尔 / 生日
// 约定: 输入先去首尾空白; 失败返回 FieldParseError,由行归一化器降级
// ==========================================

use crate::importer::error::FieldParseError;
use chrono::{Datelike, Days, NaiveDate};

/// 生日占位年份阈值（含）
///
/// 业务规则: 年份 ≥ 2000 的日期只记录每年的纪念日（日/月）,年份无意义;
/// 年份 < 2000 才是真实出生日期。阈值按原样保留,不可配置。
pub const BIRTHDAY_PLACEHOLDER_YEAR: i32 = 2000;

/// CDI 百分比结果保留的小数位（去除二进制浮点噪声）
const PERCENT_DECIMALS: i32 = 10;

/// 账号: 仅保留 ASCII 数字（可能返回空字符串）
pub fn normalize_account_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 解析数值（巴西记法或普通记法）
///
/// 含逗号视为巴西记法: 去掉全部 '.',再把 ',' 换成 '.';
/// 否则按原样解析。清洗后必须是合法十进制字面量。
///
/// # 示例
/// - "1.234.567,89" → 1234567.89
/// - "1234567.89" → 1234567.89
pub fn parse_br_number(raw: &str) -> Result<f64, FieldParseError> {
    let trimmed = raw.trim();
    let cleaned = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    let invalid = || FieldParseError::NumberFormat {
        value: trimmed.to_string(),
    };

    if !is_decimal_literal(&cleaned) {
        return Err(invalid());
    }

    // 超出 f64 范围的字面量解析为 inf,同样视为非法
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(invalid)
}

/// 解析 CDI 百分比: 源数据为 CDI 的倍数（0.8083 即 80.83%）,结果 × 100,保留符号
pub fn parse_percent_cdi(raw: &str) -> Result<f64, FieldParseError> {
    parse_br_number(raw).and_then(scale_percent)
}

/// 倍数 → 百分比
///
/// 结果溢出为 inf 时返回 NumberFormat; 量级过大无法舍入时原样保留。
pub fn scale_percent(fraction: f64) -> Result<f64, FieldParseError> {
    let percent = fraction * 100.0;
    if !percent.is_finite() {
        return Err(FieldParseError::NumberFormat {
            value: fraction.to_string(),
        });
    }

    let factor = 10f64.powi(PERCENT_DECIMALS);
    let scaled = percent * factor;
    if scaled.is_finite() {
        Ok(scaled.round() / factor)
    } else {
        Ok(percent)
    }
}

/// 三态布尔: "sim" → true, "não"/"nao" → false, 其他 → None
///
/// 大小写与重音不敏感。
pub fn parse_boolean_sim_nao(raw: &str) -> Option<bool> {
    match fold_accents(raw.trim()).as_str() {
        "sim" => Some(true),
        "nao" => Some(false),
        _ => None,
    }
}

/// 去重音并转小写
pub fn fold_accents(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

// ==========================================
// 生日
// ==========================================

/// 生日解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Birthday {
    /// 真实出生日期（年份 < 2000）
    FullDate(NaiveDate),
    /// 仅纪念日（年份 ≥ 2000 为占位）
    Anniversary { day: u32, month: u32 },
}

impl Birthday {
    pub fn from_date(date: NaiveDate) -> Self {
        if date.year() >= BIRTHDAY_PLACEHOLDER_YEAR {
            Birthday::Anniversary {
                day: date.day(),
                month: date.month(),
            }
        } else {
            Birthday::FullDate(date)
        }
    }
}

/// 解析日/月/年字符串并套用生日规则
pub fn parse_birthday(raw: &str) -> Result<Birthday, FieldParseError> {
    parse_date_br(raw).map(Birthday::from_date)
}

/// 解析日期
///
/// # 支持格式
/// - DD/MM/AAAA、DD-MM-AAAA、DD.MM.AAAA（年份必须 4 位）
/// - AAAA-MM-DD（ISO）
/// - 末尾的时间部分（空格之后）忽略
pub fn parse_date_br(raw: &str) -> Result<NaiveDate, FieldParseError> {
    let trimmed = raw.trim();
    let invalid = || FieldParseError::DateFormat {
        value: trimmed.to_string(),
    };

    let token = trimmed.split_whitespace().next().ok_or_else(invalid)?;
    let parts: Vec<&str> = token
        .split(|c: char| c == '/' || c == '-' || c == '.')
        .collect();

    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else if parts[2].len() == 4 {
        (parts[2], parts[1], parts[0])
    } else {
        return Err(invalid());
    };

    if month.len() > 2 || day.len() > 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Excel 日期序列号（1900 日期系统）→ 日期
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

/// 合法十进制字面量: [+-]? (digits [. digits?] | . digits)
fn is_decimal_literal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) {
        return false;
    }

    match frac_part {
        Some(frac) => all_digits(frac) && !(int_part.is_empty() && frac.is_empty()),
        None => !int_part.is_empty(),
    }
}
