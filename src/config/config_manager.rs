// ==========================================
// 客户名单导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、默认值回退
// 存储: JSON 对象文件（global 作用域的 key-value）
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 工作表选择
    pub const PREFERRED_SHEET_NAME: &str = "preferred_sheet_name";

    // CSV 解码
    pub const CSV_DELIMITERS: &str = "csv_delimiters";
    pub const CSV_PREVIEW_ROWS: &str = "csv_preview_rows";

    // 界面语言
    pub const LOCALE: &str = "locale";
}

// 默认值
const DEFAULT_PREFERRED_SHEET_NAME: &str = "Clientes";
const DEFAULT_CSV_DELIMITERS: &str = ",\t|;";
const DEFAULT_CSV_PREVIEW_ROWS: usize = 10;
const DEFAULT_LOCALE: &str = "pt-BR";

/// 默认配置文件路径: <系统配置目录>/client-import/config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("client-import").join("config.json"))
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 从 JSON 文件加载
    ///
    /// # 文件格式
    /// ```json
    /// { "preferred_sheet_name": "Clientes", "csv_preview_rows": 20 }
    /// ```
    /// 非字符串值按其 JSON 文本保存。
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::Config {
            key: source.clone(),
            message: e.to_string(),
        })?;

        let parsed: BTreeMap<String, Value> =
            serde_json::from_str(&raw).map_err(|e| ImportError::Config {
                key: source.clone(),
                message: e.to_string(),
            })?;

        let values = parsed
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect::<BTreeMap<_, _>>();

        info!(path = %source, keys = values.len(), "配置加载完成");
        Ok(Self { values })
    }

    /// 文件存在则加载,否则使用默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "配置文件不存在,使用默认配置");
            Ok(Self::default())
        }
    }

    /// 写入单个配置（覆盖）
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取 global 配置值
    pub fn get_global_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_global_config_value(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        serde_json::to_string(&self.values).map_err(|e| ImportError::Config {
            key: "snapshot".to_string(),
            message: e.to_string(),
        })
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_preferred_sheet_name(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(
            config_keys::PREFERRED_SHEET_NAME,
            DEFAULT_PREFERRED_SHEET_NAME,
        ))
    }

    fn get_csv_delimiters(&self) -> ImportResult<Vec<u8>> {
        // 分隔符可能是空白（制表符）,此处不做 trim
        let value = self
            .get_global_config_value(config_keys::CSV_DELIMITERS)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CSV_DELIMITERS);

        let invalid = value
            .chars()
            .any(|c| !c.is_ascii() || matches!(c, '"' | '\n' | '\r'));
        if invalid {
            return Err(ImportError::Config {
                key: config_keys::CSV_DELIMITERS.to_string(),
                message: format!("delimitadores inválidos: {:?}", value),
            });
        }

        Ok(value.bytes().collect())
    }

    fn get_csv_preview_rows(&self) -> ImportResult<usize> {
        let value = self.get_config_or_default(
            config_keys::CSV_PREVIEW_ROWS,
            &DEFAULT_CSV_PREVIEW_ROWS.to_string(),
        );

        match value.parse::<usize>() {
            Ok(rows) if rows > 0 => Ok(rows),
            _ => Err(ImportError::Config {
                key: config_keys::CSV_PREVIEW_ROWS.to_string(),
                message: format!("esperado inteiro positivo, obtido {:?}", value),
            }),
        }
    }

    fn get_locale(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE))
    }
}
