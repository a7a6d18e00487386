// ==========================================
// Excel 导入引擎 - 单元格读取
// ==========================================
// 职责: 按单元格类型转换为显示字符串（与目标字段类型无关）
// 规则: 文本原样 / 日期按格式输出 / 数值按存储格式 / 公式文本 / 布尔 / 空 / 错误
// ==========================================

use crate::workbook::{serial_to_datetime, CellValue};
use std::fmt::Write;

/// ERROR 类型单元格的读取结果
pub const ILLEGAL_CHARACTER: &str = "非法字符";

/// 常规格式数值的最大小数位数
const GENERAL_MAX_FRACTION_DIGITS: usize = 9;

/// 读取单元格显示字符串
///
/// # 参数
/// - cell: 单元格，None 表示行或单元格不存在
/// - date_pattern: 日期格式单元格使用的格式（chrono strftime）
///
/// # 返回
/// - None: 单元格不存在
/// - Some(String): 显示字符串
pub fn read_cell(cell: Option<&CellValue>, date_pattern: &str) -> Option<String> {
    let value = match cell? {
        CellValue::Text(s) => s.clone(),
        CellValue::Numeric {
            value,
            date_formatted,
            format,
        } => {
            let formatted_date = if *date_formatted {
                format_date(*value, date_pattern)
            } else {
                None
            };
            formatted_date.unwrap_or_else(|| format_numeric(*value, format.as_deref()))
        }
        CellValue::Formula(formula) => formula.clone(),
        CellValue::Boolean(b) => b.to_string(),
        CellValue::Blank => String::new(),
        CellValue::Error(_) => ILLEGAL_CHARACTER.to_string(),
    };
    Some(value)
}

/// 日期类型字段的前置检查：只接受日期格式的数值单元格（空单元格放行）
pub fn is_date_cell(cell: Option<&CellValue>) -> bool {
    match cell {
        None | Some(CellValue::Blank) => true,
        Some(c) => c.is_date_formatted(),
    }
}

/// 单元格是否为空（不存在、BLANK 或空白文本）
pub fn is_blank_cell(cell: Option<&CellValue>) -> bool {
    match cell {
        None | Some(CellValue::Blank) => true,
        Some(CellValue::Text(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn format_date(serial: f64, pattern: &str) -> Option<String> {
    let datetime = serial_to_datetime(serial)?;
    let mut out = String::new();
    // 格式串非法时 write! 返回错误而不是 panic
    write!(out, "{}", datetime.format(pattern)).ok()?;
    Some(out)
}

/// 数值格式化
///
/// 常规格式：无千分位，最多 9 位小数；
/// 其他格式：按格式串第一节的小数位数与千分位输出，"%" 结尾时按百分比输出。
pub fn format_numeric(value: f64, format: Option<&str>) -> String {
    let section = format
        .map(|f| f.split(';').next().unwrap_or_default().trim())
        .unwrap_or_default();
    if section.is_empty() || section.eq_ignore_ascii_case("general") || section == "@" {
        return format_decimal(value, 0, GENERAL_MAX_FRACTION_DIGITS, false);
    }

    let percent = section.contains('%');
    let grouping = section.contains(',');
    let (min_fraction, max_fraction) = match section.split_once('.') {
        Some((_, fraction)) => {
            let zeros = fraction.chars().take_while(|c| matches!(c, '0' | '#')).filter(|c| *c == '0').count();
            let total = fraction.chars().take_while(|c| matches!(c, '0' | '#')).count();
            (zeros, total)
        }
        None => (0, 0),
    };

    if percent {
        let mut text = format_decimal(value * 100.0, min_fraction, max_fraction, grouping);
        text.push('%');
        text
    } else {
        format_decimal(value, min_fraction, max_fraction, grouping)
    }
}

fn format_decimal(value: f64, min_fraction: usize, max_fraction: usize, grouping: bool) -> String {
    let mut text = format!("{:.*}", max_fraction, value);
    if let Some(dot) = text.find('.') {
        let keep = dot + 1 + min_fraction;
        while text.len() > keep && text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text = text.trim_start_matches('-').to_string();
    }
    if grouping {
        text = group_thousands(&text);
    }
    text
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
