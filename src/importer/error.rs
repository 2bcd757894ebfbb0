// ==========================================
// 客户名单导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: ImportError 为文件级致命错误; FieldParseError 为字段级,可恢复
// ==========================================

use thiserror::Error;

/// 文件级错误（中止整个解析,不返回部分结果）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Formato de arquivo não suportado: {file} (apenas .csv e .xlsx)")]
    UnsupportedFormat { file: String },

    #[error("Não foi possível ler o arquivo {file}: {message}")]
    FileRead { file: String, message: String },

    #[error("Não foi possível decodificar o arquivo {file}: {message}")]
    Decode { file: String, message: String },

    // ===== 配置错误 =====
    #[error("Configuração inválida (chave: {key}): {message}")]
    Config { key: String, message: String },
}

impl ImportError {
    pub fn decode(file: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::Decode {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn file_read(file: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::FileRead {
            file: file.into(),
            message: message.into(),
        }
    }

    /// 错误所指向的文件名（配置错误无文件）
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ImportError::UnsupportedFormat { file }
            | ImportError::FileRead { file, .. }
            | ImportError::Decode { file, .. } => Some(file),
            ImportError::Config { .. } => None,
        }
    }
}

/// 字段级错误（降级为 FieldError 附在行上）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    #[error("Número inválido: '{value}'")]
    NumberFormat { value: String },

    #[error("Valor booleano inválido: '{value}'")]
    BooleanFormat { value: String },

    #[error("Data inválida: '{value}' (esperado DD/MM/AAAA)")]
    DateFormat { value: String },
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 解码器内部错误（尚未绑定文件名）
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Csv(String),

    #[error("{0}")]
    Excel(String),

    #[error("conteúdo não é UTF-8 válido: {0}")]
    Utf8(String),
}

impl DecodeError {
    /// 绑定文件名,提升为 ImportError
    pub fn for_file(self, file: &str) -> ImportError {
        ImportError::decode(file, self.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for DecodeError {
    fn from(err: csv::Error) -> Self {
        DecodeError::Csv(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for DecodeError {
    fn from(err: calamine::XlsxError) -> Self {
        DecodeError::Excel(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for DecodeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DecodeError::Utf8(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_name_the_file() {
        let err = ImportError::UnsupportedFormat {
            file: "clientes.pdf".to_string(),
        };
        assert!(err.to_string().contains("clientes.pdf"));
        assert_eq!(err.file_name(), Some("clientes.pdf"));

        let err = DecodeError::Csv("bad quote".to_string()).for_file("base.csv");
        assert!(err.to_string().contains("base.csv"));
        assert!(err.to_string().contains("bad quote"));
    }

    #[test]
    fn test_field_error_messages() {
        let err = FieldParseError::NumberFormat {
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Número inválido: 'abc'");
    }
}
