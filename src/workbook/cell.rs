// ==========================================
// Excel 导入引擎 - 单元格模型
// ==========================================
// 职责: 与文件格式无关的单元格类型标签
// 类型: STRING / NUMERIC / FORMULA / BOOLEAN / BLANK / ERROR
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// 单元格内容（带类型标签）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// 文本
    Text(String),
    /// 数值；日期单元格同样是数值（Excel 序列日期）
    Numeric {
        value: f64,
        // 单元格格式是否为日期格式
        date_formatted: bool,
        // 单元格存储的数字格式，None 表示"常规"
        format: Option<String>,
    },
    /// 公式文本（不含前导 '='）
    Formula(String),
    Boolean(bool),
    Blank,
    /// 错误值（#DIV/0! 等）
    Error(String),
}

impl CellValue {
    /// 常规格式数值
    pub fn number(value: f64) -> Self {
        CellValue::Numeric {
            value,
            date_formatted: false,
            format: None,
        }
    }

    /// 带显式数字格式的数值
    pub fn formatted_number(value: f64, format: impl Into<String>) -> Self {
        CellValue::Numeric {
            value,
            date_formatted: false,
            format: Some(format.into()),
        }
    }

    /// 日期格式数值（Excel 序列日期）
    pub fn date_serial(serial: f64) -> Self {
        CellValue::Numeric {
            value: serial,
            date_formatted: true,
            format: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// 是否为日期格式的数值单元格
    pub fn is_date_formatted(&self) -> bool {
        matches!(
            self,
            CellValue::Numeric {
                date_formatted: true,
                ..
            }
        )
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// 物理读取位置（0 基行列号）
///
/// 请求的位置落在合并区域的首列时，会被重定向到区域的锚点单元格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

impl CellPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

// ==========================================
// Excel 序列日期换算（1900 日期系统）
// ==========================================
// 序列 60 为不存在的 1900-02-29，61 起以 1899-12-30 为基准

/// 序列日期 → 日期时间，负数或越界返回 None
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let total_seconds = (serial * SECONDS_PER_DAY as f64).round() as i64;
    let days = total_seconds.div_euclid(SECONDS_PER_DAY);
    let seconds = total_seconds.rem_euclid(SECONDS_PER_DAY);

    let base = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// 日期时间 → 序列日期
pub fn datetime_to_serial(value: NaiveDateTime) -> Option<f64> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let elapsed = value.signed_duration_since(base);
    let mut days = elapsed.num_days();
    if days <= 60 {
        days -= 1;
    }
    let seconds = elapsed.num_seconds() - elapsed.num_days() * SECONDS_PER_DAY;
    Some(days as f64 + seconds as f64 / SECONDS_PER_DAY as f64)
}
