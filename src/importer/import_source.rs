// ==========================================
// 客户名单导入 - 宿主文件接口
// ==========================================
// 用途: 屏蔽文件来源（文件选择器、拖拽、磁盘等）
// 唯一挂起点: 读取文件内容
// ==========================================

use crate::importer::error::{DecodeError, ImportError, ImportResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// ImportSource Trait
// ==========================================
// 实现者: LocalFileSource, InMemorySource
#[async_trait]
pub trait ImportSource: Send + Sync {
    /// 文件名（含扩展名,用于类型识别与错误提示）
    fn name(&self) -> &str;

    /// 文件字节数
    fn size(&self) -> u64;

    /// 以 UTF-8 文本读取（CSV）
    async fn read_text(&self) -> ImportResult<String> {
        let bytes = self.read_bytes().await?;
        String::from_utf8(bytes).map_err(|e| DecodeError::from(e).for_file(self.name()))
    }

    /// 以二进制读取（XLSX）
    async fn read_bytes(&self) -> ImportResult<Vec<u8>>;
}

// ==========================================
// LocalFileSource - 本地文件
// ==========================================
pub struct LocalFileSource {
    path: PathBuf,
    name: String,
    size: u64,
}

impl LocalFileSource {
    /// 打开本地文件（读取元数据,内容延迟读取）
    pub async fn open<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ImportError::file_read(&name, e.to_string()))?;

        Ok(Self {
            path,
            name,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ImportSource for LocalFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_bytes(&self) -> ImportResult<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| ImportError::file_read(&self.name, e.to_string()))
    }
}

// ==========================================
// InMemorySource - 内存内容（宿主已读取的文件）
// ==========================================
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl ImportSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read_bytes(&self) -> ImportResult<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
