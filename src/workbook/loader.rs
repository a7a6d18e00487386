// ==========================================
// Excel 导入引擎 - 工作簿加载
// ==========================================
// 支持: Excel (.xlsx / .xls)，按内容自动识别
// 职责: 读取第一个工作表的单元格值、公式文本与合并区域
// ==========================================

use crate::importer::error::TemplateError;
use crate::workbook::cell::{datetime_to_serial, CellValue};
use crate::workbook::sheet::{MergedRegion, Sheet};
use calamine::{open_workbook_auto_from_rs, Data, Dimensions, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{Read, Seek};
use tracing::{debug, warn};

/// 工作簿容器格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// BIFF8 (.xls)
    Xls,
    /// Office Open XML (.xlsx)
    Xlsx,
}

/// 读取工作簿的第一个工作表
///
/// # 返回
/// - Ok(Some(Sheet)): 第一个工作表
/// - Ok(None): 工作簿中没有工作表
/// - Err(TemplateError): 文件损坏或格式不支持
pub fn load_first_sheet(bytes: &[u8]) -> Result<Option<Sheet>, TemplateError> {
    let mut workbook = open_workbook_auto_from_rs(std::io::Cursor::new(bytes))
        .map_err(|e| TemplateError::UnreadableWorkbook(e.to_string()))?;

    let format = match &workbook {
        Sheets::Xls(_) => SourceFormat::Xls,
        Sheets::Xlsx(_) => SourceFormat::Xlsx,
        Sheets::Xlsb(_) => return Err(TemplateError::UnsupportedFormat("xlsb".to_string())),
        Sheets::Ods(_) => return Err(TemplateError::UnsupportedFormat("ods".to_string())),
    };

    let sheet_names = workbook.sheet_names();
    let Some(sheet_name) = sheet_names.first().cloned() else {
        warn!("工作簿中没有工作表");
        return Ok(None);
    };

    let values = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TemplateError::UnreadableWorkbook(e.to_string()))?;

    let mut sheet = Sheet::new(sheet_name.clone());
    fill_values(&mut sheet, &values);

    // 公式读取失败不影响取值，按无公式处理
    match workbook.worksheet_formula(&sheet_name) {
        Ok(formulas) => fill_formulas(&mut sheet, &formulas),
        Err(e) => warn!(sheet = %sheet_name, error = %e, "公式读取失败，按单元格值处理"),
    }

    for region in read_merged_regions(&mut workbook, &sheet_name)? {
        sheet.add_merged_region(region);
    }

    debug!(
        sheet = %sheet_name,
        format = ?format,
        rows = sheet.row_count(),
        "工作表加载完成"
    );

    Ok(Some(sheet))
}

fn read_merged_regions<RS>(
    workbook: &mut Sheets<RS>,
    sheet_name: &str,
) -> Result<Vec<MergedRegion>, TemplateError>
where
    RS: Read + Seek,
{
    let dimensions: Vec<Dimensions> = match workbook {
        Sheets::Xlsx(xlsx) => {
            xlsx.load_merged_regions()
                .map_err(|e| TemplateError::UnreadableWorkbook(e.to_string()))?;
            xlsx.worksheet_merge_cells(sheet_name)
                .unwrap_or(Ok(Vec::new()))
                .map_err(|e| TemplateError::UnreadableWorkbook(e.to_string()))?
        }
        Sheets::Xls(xls) => xls.worksheet_merge_cells(sheet_name).unwrap_or_default(),
        _ => Vec::new(),
    };

    Ok(dimensions.iter().map(to_region).collect())
}

fn to_region(dims: &Dimensions) -> MergedRegion {
    MergedRegion::new(
        dims.start.0 as usize,
        dims.start.1 as usize,
        dims.end.0 as usize,
        dims.end.1 as usize,
    )
}

fn offset<T>(range: &Range<T>) -> (usize, usize)
where
    T: calamine::CellType,
{
    range
        .start()
        .map_or((0, 0), |(row, column)| (row as usize, column as usize))
}

fn fill_values(sheet: &mut Sheet, range: &Range<Data>) {
    let (row_offset, column_offset) = offset(range);
    for (row, column, data) in range.cells() {
        if let Some(value) = convert_data(data) {
            sheet.set_cell(row + row_offset, column + column_offset, value);
        }
    }
}

fn fill_formulas(sheet: &mut Sheet, range: &Range<String>) {
    let (row_offset, column_offset) = offset(range);
    for (row, column, formula) in range.cells() {
        if !formula.is_empty() {
            sheet.set_cell(
                row + row_offset,
                column + column_offset,
                CellValue::Formula(formula.clone()),
            );
        }
    }
}

/// calamine 单元格 → CellValue，空单元格返回 None
fn convert_data(data: &Data) -> Option<CellValue> {
    let value = match data {
        Data::Empty => return None,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::number(*i as f64),
        Data::Float(f) => CellValue::number(*f),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => CellValue::Numeric {
            value: dt.as_f64(),
            date_formatted: !dt.is_duration(),
            format: None,
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s).and_then(datetime_to_serial) {
            Some(serial) => CellValue::date_serial(serial),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    };
    Some(value)
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let result = load_first_sheet(b"definitely not a workbook");
        assert!(matches!(result, Err(TemplateError::UnreadableWorkbook(_))));
    }

    #[test]
    fn test_convert_data() {
        assert_eq!(convert_data(&Data::Empty), None);
        assert_eq!(
            convert_data(&Data::String("张三".to_string())),
            Some(CellValue::text("张三"))
        );
        assert_eq!(convert_data(&Data::Int(7)), Some(CellValue::number(7.0)));
        assert_eq!(convert_data(&Data::Bool(false)), Some(CellValue::Boolean(false)));
        assert_eq!(
            convert_data(&Data::DateTimeIso("2024-01-01".to_string())),
            Some(CellValue::date_serial(45292.0))
        );
        assert_eq!(
            convert_data(&Data::DateTimeIso("not a date".to_string())),
            Some(CellValue::text("not a date"))
        );
    }

    #[test]
    fn test_datetime_and_duration_cells() {
        let date = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(convert_data(&date), Some(CellValue::date_serial(45292.0)));

        let duration = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(
            convert_data(&duration),
            Some(CellValue::Numeric {
                value: 1.5,
                date_formatted: false,
                format: None,
            })
        );
    }

    #[test]
    fn test_merge_dimensions_to_region() {
        // A2:B4
        let region = to_region(&Dimensions::new((1, 0), (3, 1)));
        assert_eq!(region, MergedRegion::new(1, 0, 3, 1));
    }
}
