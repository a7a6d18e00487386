// ==========================================
// Excel 导入引擎 - .xlsx 端到端测试
// ==========================================
// 覆盖: calamine 读取 → 导入流程；文件/输入流入口；合并单元格；公式；JSON 配置
// ==========================================


use sheet_binder::config::ImportOptions;
use sheet_binder::logging;
use sheet_binder::workbook::load_first_sheet;
use sheet_binder::{CellValue, ExcelImporter, FieldDescriptor, ImportError, ImportSchema, SheetSource, TemplateError};
use std::io::Write;
use tempfile::NamedTempFile;
use test_helpers::{datetime, person_schema, serial, t, XlsxBuilder, XlsxCell, PERSON_HEADER};

fn header() -> Vec<XlsxCell> {
    PERSON_HEADER.iter().map(|h| t(h)).collect()
}

fn person_workbook() -> Vec<u8> {
    XlsxBuilder::new("人员信息表")
        .row(header())
        .row(vec![
            t("D1990001"),
            XlsxCell::Number(34.0),
            XlsxCell::Date(serial(1990, 5, 17)),
            t("13800138000"),
        ])
        .row(vec![
            t("D1985002"),
            XlsxCell::Number(39.0),
            XlsxCell::Date(serial(1985, 1, 2)),
            XlsxCell::Number(13900139000.0),
        ])
        .build()
}

#[test]
fn test_import_xlsx_bytes() {
    logging::init_test();

    let batch = ExcelImporter::new(person_schema())
        .import_bytes(&person_workbook())
        .unwrap();

    assert_eq!(batch.sheet_name(), "人员信息表");
    assert_eq!(batch.len(), 2);

    let first = &batch.records()[0];
    assert_eq!(first.no.as_deref(), Some("D1990001"));
    assert_eq!(first.age, Some(34));
    assert_eq!(first.birth, Some(datetime(1990, 5, 17)));

    // 数值单元格按常规格式读取，不带千分位与科学计数法
    assert_eq!(batch.records()[1].phone.as_deref(), Some("13900139000"));
}

#[test]
fn test_import_file_and_reader() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&person_workbook()).unwrap();
    file.flush().unwrap();

    let importer = ExcelImporter::new(person_schema());
    let from_file = importer.import_file(file.path()).unwrap();
    assert_eq!(from_file.len(), 2);

    let from_reader = importer.import_reader(std::fs::File::open(file.path()).unwrap()).unwrap();
    assert_eq!(from_reader.records(), from_file.records());
}

#[test]
fn test_missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = ExcelImporter::new(person_schema())
        .import_file(dir.path().join("不存在.xlsx"))
        .unwrap_err();
    assert!(matches!(err, ImportError::Template(TemplateError::UnreadableWorkbook(_))));
}

#[test]
fn test_xlsx_violations_are_aggregated() {
    let bytes = XlsxBuilder::new("人员信息表")
        .row(header())
        .row(vec![
            t("X1"),
            XlsxCell::Number(34.0),
            XlsxCell::Date(serial(1990, 5, 17)),
            t("13800138000"),
        ])
        .row(vec![
            t("D1990002"),
            XlsxCell::Empty,
            t("1990-05-17"),
            t("138"),
        ])
        .build();

    let err = ExcelImporter::new(person_schema()).import_bytes(&bytes).unwrap_err();
    let failure = err.validation().unwrap();
    assert_eq!(
        failure.messages().to_vec(),
        vec![
            "第2行【编号】列格式错误，未以字母D开头".to_string(),
            "第3行【年龄】列为空！".to_string(),
            "第3行【出生年月日】列日期格式错误".to_string(),
            "第3行【手机号码】列手机号码格式不正确".to_string(),
            "第3行数据缺失".to_string(),
        ]
    );
}

#[test]
fn test_xlsx_merged_cells_formulas_and_errors() {
    #[derive(Debug, Default)]
    struct Line {
        group: Option<String>,
        expr: Option<String>,
        flag: Option<String>,
        status: Option<String>,
    }

    let bytes = XlsxBuilder::new("明细")
        .row(vec![t("分组"), t("公式"), t("标记"), t("状态")])
        .row(vec![
            t("A组"),
            XlsxCell::Formula("SUM(1,2)".to_string(), 3.0),
            XlsxCell::Bool(true),
            XlsxCell::Error("#DIV/0!".to_string()),
        ])
        .row(vec![XlsxCell::Empty, XlsxCell::Number(2.5), XlsxCell::Bool(false), t("正常")])
        .row(vec![XlsxCell::Empty, XlsxCell::Number(1.0), XlsxCell::Bool(false), t("正常")])
        .merge("A2:A4")
        .build();

    let sheet = load_first_sheet(&bytes).unwrap().unwrap();
    assert_eq!(sheet.name(), "明细");
    assert_eq!(sheet.last_row_index(), Some(3));
    assert_eq!(sheet.merged_regions().len(), 1);
    assert_eq!(sheet.cell(1, 1), Some(&CellValue::Formula("SUM(1,2)".to_string())));

    let schema = ImportSchema::new("明细")
        .field(FieldDescriptor::text("分组", |l: &mut Line, v| l.group = v))
        .field(FieldDescriptor::text("公式", |l: &mut Line, v| l.expr = v))
        .field(FieldDescriptor::text("标记", |l: &mut Line, v| l.flag = v))
        .field(FieldDescriptor::text("状态", |l: &mut Line, v| l.status = v));
    let batch = ExcelImporter::new(schema).import_sheet(&sheet).unwrap();

    let groups: Vec<_> = batch.records().iter().map(|l| l.group.as_deref()).collect();
    assert_eq!(groups, vec![Some("A组"), Some("A组"), Some("A组")]);

    let first = &batch.records()[0];
    assert_eq!(first.expr.as_deref(), Some("SUM(1,2)"));
    assert_eq!(first.flag.as_deref(), Some("true"));
    assert_eq!(first.status.as_deref(), Some("非法字符"));
    assert_eq!(batch.records()[1].expr.as_deref(), Some("2.5"));
}

#[test]
fn test_header_only_workbook_is_empty() {
    let bytes = XlsxBuilder::new("人员信息表").row(header()).build();
    let batch = ExcelImporter::new(person_schema()).import_bytes(&bytes).unwrap();
    assert!(batch.is_empty());
}

#[test]
fn test_options_loaded_from_json_file() {
    let mut config = NamedTempFile::new().unwrap();
    write!(
        config,
        r#"{{"header_rows": 2, "default_date_format": "%Y/%m/%d", "line_separator": "\n"}}"#
    )
    .unwrap();
    config.flush().unwrap();
    let options = ImportOptions::from_json_file(config.path()).unwrap();

    #[derive(Debug, Default)]
    struct Entry {
        day: Option<chrono::NaiveDateTime>,
    }

    let bytes = XlsxBuilder::new("日报")
        .row(vec![t("2024 年 3 月日报")])
        .row(vec![t("日期")])
        .row(vec![XlsxCell::Date(serial(2024, 3, 5))])
        .build();
    let schema = ImportSchema::new("日报").field(FieldDescriptor::date("日期", |e: &mut Entry, v| e.day = v));

    let batch = ExcelImporter::new(schema).with_options(options).import_bytes(&bytes).unwrap();
    assert_eq!(batch.records()[0].day, Some(datetime(2024, 3, 5)));
}
