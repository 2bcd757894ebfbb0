// ==========================================
// 客户名单导入 - 文件类型识别
// ==========================================
// 规则: 仅按扩展名（大小写不敏感）识别 .csv / .xlsx
// 其他扩展名在解码前即拒绝
// ==========================================

use crate::domain::import::FileType;
use crate::importer::error::{ImportError, ImportResult};

/// 根据文件名识别类型
pub fn detect_file_type(file_name: &str) -> ImportResult<FileType> {
    let lower = file_name.trim().to_lowercase();

    if lower.ends_with(".csv") {
        Ok(FileType::Csv)
    } else if lower.ends_with(".xlsx") {
        Ok(FileType::Xlsx)
    } else {
        Err(ImportError::UnsupportedFormat {
            file: file_name.to_string(),
        })
    }
}

/// 去掉扩展名的文件名（CSV 工作表命名用）
pub fn file_stem(file_name: &str) -> &str {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    }
}
