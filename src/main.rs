// ==========================================
// 客户名单导入 - 命令行入口
// ==========================================
// 用法:
//   client-import <arquivo> [mapeamento.json] [--sheet <nome>] [--config <config.json>] [--locale <pt-BR|en>]
//
// 无映射文件: 输出 ParsedImportFile (JSON)
// 有映射文件: 输出所选工作表的归一化结果与诊断 (JSON)
// 日志与摘要写入 stderr, stdout 只输出 JSON
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use client_import::config::{default_config_path, ConfigManager, ImportConfigReader};
use client_import::i18n::{self, t, t_with_args};
use client_import::{
    logging, ClientImportColumnMapping, ClientImporter, LocalFileSource, RowNormalizer,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct CliArgs {
    file: PathBuf,
    mapping: Option<PathBuf>,
    sheet: Option<String>,
    config: Option<PathBuf>,
    locale: Option<String>,
    json_logs: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sheet" => cli.sheet = Some(args.next().context("--sheet exige um valor")?),
            "--config" => {
                cli.config = Some(PathBuf::from(
                    args.next().context("--config exige um valor")?,
                ))
            }
            "--locale" => cli.locale = Some(args.next().context("--locale exige um valor")?),
            "--json-logs" => cli.json_logs = true,
            "-h" | "--help" => {
                eprintln!("{}", t("cli.usage"));
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("opção desconhecida: {}", other),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    cli.file = positional
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!(t("cli.usage")))?;
    cli.mapping = positional.next().map(PathBuf::from);

    if let Some(extra) = positional.next() {
        bail!("argumento inesperado: {}\n{}", extra, t("cli.usage"));
    }

    Ok(cli)
}

fn load_config(cli: &CliArgs) -> Result<ConfigManager> {
    let config = match (&cli.config, default_config_path()) {
        (Some(path), _) => ConfigManager::load(path)?,
        (None, Some(path)) => ConfigManager::load_or_default(path)?,
        (None, None) => ConfigManager::default(),
    };
    Ok(config)
}

fn load_mapping(path: &Path) -> Result<ClientImportColumnMapping> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("falha ao ler o mapeamento {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("mapeamento inválido em {}", path.display()))
}

async fn run(cli: CliArgs) -> Result<()> {
    let config = load_config(&cli)?;
    debug!(config = %config.get_config_snapshot()?, "生效配置");

    let locale = match &cli.locale {
        Some(locale) => locale.clone(),
        None => config.get_locale()?,
    };
    i18n::set_locale(&locale);

    // 映射文件先于导入文件校验,避免白白解析
    let mapping = cli.mapping.as_deref().map(load_mapping).transpose()?;

    if !cli.file.exists() {
        bail!(t_with_args(
            "import.file_not_found",
            &[("path", cli.file.display().to_string().as_str())],
        ));
    }

    let importer = ClientImporter::new(config);
    let source = LocalFileSource::open(&cli.file).await?;
    let parsed = importer.parse_import_file(&source).await?;

    eprintln!(
        "{}",
        t_with_args(
            "import.parsed",
            &[
                ("file", parsed.file_name.as_str()),
                ("sheets", parsed.sheets.len().to_string().as_str()),
                ("rows", parsed.total_rows().to_string().as_str()),
            ],
        )
    );

    let Some(mapping) = mapping else {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    };

    let sheet_name = match &cli.sheet {
        Some(name) => name.clone(),
        None => importer.default_sheet_name(&parsed)?,
    };
    let sheet = parsed.sheet(&sheet_name).ok_or_else(|| {
        anyhow!(t_with_args(
            "import.sheet_not_found",
            &[("sheet", sheet_name.as_str()), ("file", parsed.file_name.as_str())],
        ))
    })?;

    let normalizer = RowNormalizer::new(mapping);
    let rows = normalizer.normalize_sheet(sheet);
    let diagnostics = RowNormalizer::summarize(&rows);

    info!(
        sheet = %sheet.name,
        rows = diagnostics.total_rows,
        failed = diagnostics.rows_with_errors,
        "归一化完成"
    );
    eprintln!(
        "{}",
        t_with_args(
            "import.normalized",
            &[
                ("sheet", sheet.name.as_str()),
                ("rows", diagnostics.total_rows.to_string().as_str()),
                ("failed", diagnostics.rows_with_errors.to_string().as_str()),
            ],
        )
    );

    let output = json!({
        "sheet": sheet.name,
        "rows": rows,
        "diagnostics": diagnostics,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "导入失败");
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
