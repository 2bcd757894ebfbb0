// ==========================================
// 客户名单导入 - 导入编排器
// ==========================================
// 职责: 整合解析流程,从宿主文件到 ParsedImportFile
// 流程: 类型识别 → 读取 → 解码 → 表头去重/行物化（逐工作表）
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{FileType, ParsedImportFile};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{CsvParser, DecodedWorkbook, ExcelParser};
use crate::importer::file_type::{detect_file_type, file_stem};
use crate::importer::import_source::ImportSource;
use crate::importer::sheet_materializer::materialize_sheet;
use futures::future::join_all;
use tracing::{debug, error, info, instrument};

// ==========================================
// ClientImporter - 客户文件导入器
// ==========================================
pub struct ClientImporter<C>
where
    C: ImportConfigReader,
{
    config: C,
    excel_parser: ExcelParser,
}

impl<C> ClientImporter<C>
where
    C: ImportConfigReader,
{
    pub fn new(config: C) -> Self {
        Self {
            config,
            excel_parser: ExcelParser,
        }
    }

    /// 解析单个文件
    ///
    /// # 返回
    /// - Ok(ParsedImportFile): 按源顺序排列的工作表与数据行
    /// - Err: 格式不支持 / 读取失败 / 解码失败（整体失败,无部分结果）
    #[instrument(skip(self, source), fields(file = %source.name()))]
    pub async fn parse_import_file<S>(&self, source: &S) -> ImportResult<ParsedImportFile>
    where
        S: ImportSource + ?Sized,
    {
        let file_name = source.name().to_string();

        // === 步骤 1: 类型识别（解码前拒绝未知扩展名） ===
        let file_type = detect_file_type(&file_name)?;
        info!(file_type = %file_type, size = source.size(), "开始解析导入文件");

        // === 步骤 2: 读取并解码 ===
        let decoded = match file_type {
            FileType::Csv => {
                let parser = CsvParser::new(
                    self.config.get_csv_delimiters()?,
                    self.config.get_csv_preview_rows()?,
                );
                let text = source.read_text().await?;
                let rows = parser.decode(&text).map_err(|e| e.for_file(&file_name))?;
                DecodedWorkbook::Csv(rows)
            }
            FileType::Xlsx => {
                let bytes = source.read_bytes().await?;
                let sheets = self
                    .excel_parser
                    .decode(bytes)
                    .map_err(|e| e.for_file(&file_name))?;
                DecodedWorkbook::Xlsx(sheets)
            }
        };
        debug!("解码完成");

        // === 步骤 3: 逐工作表物化 ===
        let sheets: Vec<_> = decoded
            .into_named_matrices(file_stem(&file_name))
            .into_iter()
            .map(|matrix| materialize_sheet(&matrix.name, matrix.rows))
            .collect();

        let parsed = ParsedImportFile {
            file_name,
            file_size: source.size(),
            file_type,
            sheets,
        };

        info!(
            sheets = parsed.sheets.len(),
            rows = parsed.total_rows(),
            "导入文件解析完成"
        );

        Ok(parsed)
    }

    /// 批量解析多个文件（并发执行）
    ///
    /// 每个文件独立,单个失败不影响其他文件; 结果顺序与输入一致。
    pub async fn parse_many(
        &self,
        sources: &[Box<dyn ImportSource>],
    ) -> Vec<Result<ParsedImportFile, String>> {
        info!(count = sources.len(), "开始批量解析文件");

        let tasks = sources.iter().map(|source| async move {
            self.parse_import_file(source.as_ref()).await.map_err(|e| {
                error!(file = %source.name(), error = %e, "文件解析失败");
                e.to_string()
            })
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量解析完成"
        );

        results
    }

    /// 默认工作表名（使用配置的首选名称）
    pub fn default_sheet_name(&self, parsed: &ParsedImportFile) -> ImportResult<String> {
        let preferred = self.config.get_preferred_sheet_name()?;
        Ok(get_default_sheet_name(parsed, &preferred))
    }
}

/// 默认工作表名
///
/// 名称与首选名称大小写不敏感相等的工作表优先,否则取第一个工作表,无工作表返回空字符串。
pub fn get_default_sheet_name(parsed: &ParsedImportFile, preferred: &str) -> String {
    parsed
        .sheet(preferred)
        .or_else(|| parsed.sheets.first())
        .map(|sheet| sheet.name.clone())
        .unwrap_or_default()
}
