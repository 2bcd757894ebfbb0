// ==========================================
// 导入流程集成测试（CSV）
// ==========================================
// 测试目标: 本地文件 → ParsedImportFile → 归一化客户行 → 诊断
// ==========================================


use chrono::NaiveDate;
use client_import::config::{config_keys, ConfigManager};
use client_import::importer::{materialize_sheet, CsvParser, DecodeError};
use client_import::{
    logging, CellValue, ClientField, ClientImporter, FileType, ImportError, ImportSource,
    InMemorySource, LocalFileSource, RowNormalizer,
};
use test_helpers::{standard_mapping, write_temp_file};

const ROSTER_CSV: &str = "\u{feff}Nome;Conta;Patrimônio;CDI;Qualificado;Nascimento;Nome\n\
Ana Souza;12.345-6;1.234.567,89;0,8083;Sim;15/04/1988;Ana\n\
\n\
Bruno Lima;0099;abc;1,1;NÃO;09/07/2023;\n\
;;;;;;\n\
Carla Dias;777;;;talvez;31/02/1990;\n";

#[tokio::test]
async fn test_parse_local_csv_file() {
    logging::init_test();

    let (_dir, path) = write_temp_file("clientes.csv", ROSTER_CSV.as_bytes()).unwrap();
    let importer = ClientImporter::new(ConfigManager::default());
    let source = LocalFileSource::open(&path).await.unwrap();

    let parsed = importer.parse_import_file(&source).await.unwrap();

    assert_eq!(parsed.file_name, "clientes.csv");
    assert_eq!(parsed.file_type, FileType::Csv);
    assert_eq!(parsed.file_size, ROSTER_CSV.len() as u64);
    assert_eq!(parsed.sheets.len(), 1);

    let sheet = &parsed.sheets[0];
    assert_eq!(sheet.name, "clientes");
    assert_eq!(
        sheet.headers,
        vec![
            "Nome",
            "Conta",
            "Patrimônio",
            "CDI",
            "Qualificado",
            "Nascimento",
            "Nome (2)"
        ]
    );

    // 空行与全空白行被丢弃,行号保持源文件行号
    let indexes: Vec<usize> = sheet.rows.iter().map(|r| r.row_index).collect();
    assert_eq!(indexes, vec![2, 4, 6]);
    assert_eq!(
        sheet.rows[0].get("Nome (2)"),
        Some(&CellValue::Text("Ana".to_string()))
    );
}

#[tokio::test]
async fn test_normalize_csv_roster_with_diagnostics() {
    logging::init_test();

    let importer = ClientImporter::new(ConfigManager::default());
    let source = InMemorySource::new("clientes.csv", ROSTER_CSV);
    let parsed = importer.parse_import_file(&source).await.unwrap();

    let sheet_name = importer.default_sheet_name(&parsed).unwrap();
    let sheet = parsed.sheet(&sheet_name).unwrap();

    let normalizer = RowNormalizer::new(standard_mapping());
    let rows = normalizer.normalize_sheet(sheet);
    assert_eq!(rows.len(), 3);

    // 第 1 行: 全部字段合法
    let ana = &rows[0];
    assert!(!ana.has_errors());
    assert_eq!(ana.payload.name.as_deref(), Some("Ana Souza"));
    assert_eq!(ana.payload.account_number.as_deref(), Some("123456"));
    assert_eq!(ana.payload.net_worth, Some(1234567.89));
    assert_eq!(ana.payload.cdi_percent, Some(80.83));
    assert_eq!(ana.payload.qualified_investor, Some(true));
    assert_eq!(
        ana.payload.birth_date,
        Some(NaiveDate::from_ymd_opt(1988, 4, 15).unwrap())
    );
    assert_eq!(ana.payload.birth_day, None);

    // 第 2 行: 数值错误不影响其他字段
    let bruno = &rows[1];
    assert_eq!(bruno.row_index, 4);
    assert_eq!(bruno.payload.account_number.as_deref(), Some("0099"));
    assert_eq!(bruno.payload.net_worth, None);
    assert_eq!(bruno.payload.cdi_percent, Some(110.0));
    assert_eq!(bruno.payload.qualified_investor, Some(false));
    assert_eq!(bruno.payload.birth_date, None);
    assert_eq!(bruno.payload.birth_day, Some(9));
    assert_eq!(bruno.payload.birth_month, Some(7));
    assert_eq!(bruno.errors.len(), 1);
    assert_eq!(bruno.errors[0].field, ClientField::NetWorth);
    assert_eq!(bruno.errors[0].row_index, 4);

    // 第 3 行: 无法识别的布尔值为 None,非法日历日期报错
    let carla = &rows[2];
    assert_eq!(carla.payload.qualified_investor, None);
    assert_eq!(carla.payload.net_worth, None);
    assert_eq!(carla.errors.len(), 1);
    assert_eq!(carla.errors[0].field, ClientField::Birthday);

    let diagnostics = RowNormalizer::summarize(&rows);
    assert_eq!(diagnostics.total_rows, 3);
    assert_eq!(diagnostics.rows_with_errors, 2);
    assert_eq!(diagnostics.errors_by_field.get(&ClientField::NetWorth), Some(&1));
    assert_eq!(diagnostics.errors_by_field.get(&ClientField::Birthday), Some(&1));
    assert_eq!(
        diagnostics.errors_by_row.keys().copied().collect::<Vec<_>>(),
        vec![4, 6]
    );
}

#[tokio::test]
async fn test_parse_is_deterministic() {
    let importer = ClientImporter::new(ConfigManager::default());
    let source = InMemorySource::new("clientes.csv", ROSTER_CSV);

    let first = importer.parse_import_file(&source).await.unwrap();
    let second = importer.parse_import_file(&source).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_configured_delimiters_restrict_detection() {
    let mut config = ConfigManager::default();
    config.set(config_keys::CSV_DELIMITERS, ",");
    let importer = ClientImporter::new(config);
    let source = InMemorySource::new("base.csv", "a;b;c\n1;2;3\n");

    let parsed = importer.parse_import_file(&source).await.unwrap();

    // 仅允许逗号时,分号行整体作为单列
    assert_eq!(parsed.sheets[0].headers, vec!["a;b;c"]);
    assert_eq!(parsed.sheets[0].name, "base");
}

#[tokio::test]
async fn test_invalid_config_surfaces_config_error() {
    let mut config = ConfigManager::default();
    config.set(config_keys::CSV_PREVIEW_ROWS, "zero");
    let importer = ClientImporter::new(config);
    let source = InMemorySource::new("base.csv", "a,b\n1,2\n");

    let err = importer.parse_import_file(&source).await.unwrap_err();

    assert!(matches!(err, ImportError::Config { .. }));
}

#[tokio::test]
async fn test_decode_failures_name_the_file() {
    let importer = ClientImporter::new(ConfigManager::default());

    let source = InMemorySource::new("quebrado.csv", "Nome,Obs\nAna,\"sem fim\n");
    let err = importer.parse_import_file(&source).await.unwrap_err();
    assert!(matches!(err, ImportError::Decode { .. }));
    assert!(err.to_string().contains("quebrado.csv"));

    let source = InMemorySource::new("latin1.csv", vec![b'N', b'o', 0xe9, b'\n']);
    let err = importer.parse_import_file(&source).await.unwrap_err();
    assert!(err.to_string().contains("latin1.csv"));

    let decode_error = DecodeError::Csv("x".to_string());
    assert!(decode_error
        .for_file("outro.csv")
        .to_string()
        .contains("outro.csv"));
}

#[tokio::test]
async fn test_missing_local_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LocalFileSource::open(dir.path().join("nao_existe.csv"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ImportError::FileRead { .. }));
    assert!(err.to_string().contains("nao_existe.csv"));
}

#[tokio::test]
async fn test_parse_many_keeps_input_order() {
    let importer = ClientImporter::new(ConfigManager::default());
    let sources: Vec<Box<dyn ImportSource>> = vec![
        Box::new(InMemorySource::new("primeiro.csv", "Nome\nAna\n")),
        Box::new(InMemorySource::new("notas.txt", "x")),
        Box::new(InMemorySource::new("segundo.csv", "Nome\nBruno\nCarla\n")),
    ];

    let results = importer.parse_many(&sources).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().sheets[0].name, "primeiro");
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().total_rows(), 2);
}

#[test]
fn test_csv_written_from_matrix_decodes_to_same_structure() {
    let matrix: Vec<Vec<&str>> = vec![
        vec!["Nome", "Obs", "Nome", "Valor"],
        vec!["Silva, Ana", "tem ; ponto e vírgula", "Ana", "1.234,56"],
        vec!["Bruno \"Bé\"", "a|b\tc", "Bruno", "10"],
        vec!["Carla", "linha\nquebrada", "Carla", "0,5"],
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in &matrix {
        writer.write_record(record).unwrap();
    }
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    // 解码矩阵与原矩阵逐格一致
    let decoded = CsvParser::default().decode(&text).unwrap();
    let cells: Vec<Vec<String>> = decoded
        .iter()
        .map(|row| row.cells.iter().map(|c| c.to_string()).collect())
        .collect();
    assert_eq!(cells, matrix);

    // 物化后仅重复表头带后缀
    let sheet = materialize_sheet("clientes", decoded);
    assert_eq!(sheet.headers, vec!["Nome", "Obs", "Nome (2)", "Valor"]);
    assert_eq!(sheet.rows.len(), matrix.len() - 1);

    for (row, expected) in sheet.rows.iter().zip(&matrix[1..]) {
        for (header, value) in sheet.headers.iter().zip(expected) {
            assert_eq!(row.get(header), Some(&CellValue::from(*value)));
        }
    }

    // 引号内换行不打乱后续行号
    let indexes: Vec<usize> = sheet.rows.iter().map(|r| r.row_index).collect();
    assert_eq!(indexes, vec![2, 3, 4]);
}

#[tokio::test]
async fn test_cr_only_csv_keeps_distinct_row_indexes() {
    let importer = ClientImporter::new(ConfigManager::default());
    let source = InMemorySource::new("mac.csv", "Nome,Patrimônio\rAna,abc\rBia,xyz\r");
    let parsed = importer.parse_import_file(&source).await.unwrap();

    let sheet = &parsed.sheets[0];
    let indexes: Vec<usize> = sheet.rows.iter().map(|r| r.row_index).collect();
    assert_eq!(indexes, vec![2, 3]);

    let mapping = client_import::ClientImportColumnMapping::new()
        .with("Patrimônio", ClientField::NetWorth);
    let rows = RowNormalizer::new(mapping).normalize_sheet(sheet);
    let diagnostics = RowNormalizer::summarize(&rows);
    assert_eq!(
        diagnostics.errors_by_row.keys().copied().collect::<Vec<_>>(),
        vec![2, 3]
    );
}
