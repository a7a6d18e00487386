// ==========================================
// Excel 导入引擎 - 类型转换
// ==========================================
// 职责: 校验通过的字符串 → 字段目标类型
// 规则: 空白 → None；整数/浮点去千分位；Decimal 直接按十进制解析；日期按字段格式
// ==========================================

use crate::schema::{FieldKind, FieldValue};
use chrono::format::{parse, Item, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// 类型转换错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// 字段类型没有转换程序（模板缺陷）
    #[error("不支持的字段类型: {0}")]
    Unsupported(String),

    /// 值无法解析为目标类型
    #[error("类型转换失败 (类型 {type_name}): 值 {value:?}, {message}")]
    Parse {
        type_name: String,
        value: String,
        message: String,
    },
}

/// 按目标类型转换
///
/// # 参数
/// - raw: 校验通过的字符串
/// - kind: 字段目标类型
/// - date_pattern: 日期字段使用的格式
pub fn coerce(raw: &str, kind: &FieldKind, date_pattern: &str) -> Result<Option<FieldValue>, CoercionError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let value = match kind {
        FieldKind::Text => FieldValue::Text(raw.to_string()),
        FieldKind::Integer => FieldValue::Integer(parse_number(raw, kind)?),
        FieldKind::Long => FieldValue::Long(parse_number(raw, kind)?),
        FieldKind::Short => FieldValue::Short(parse_number(raw, kind)?),
        FieldKind::Float => FieldValue::Float(parse_number(raw, kind)?),
        FieldKind::Double => FieldValue::Double(parse_number(raw, kind)?),
        FieldKind::Decimal => FieldValue::Decimal(parse_decimal(raw, kind)?),
        FieldKind::Date => FieldValue::Date(parse_date(raw, date_pattern, kind)?),
        FieldKind::Unsupported(name) => return Err(CoercionError::Unsupported(name.clone())),
    };
    Ok(Some(value))
}

/// 去掉千分位分隔符
fn strip_grouping(raw: &str) -> String {
    raw.trim().replace(',', "")
}

fn parse_error(raw: &str, kind: &FieldKind, message: impl ToString) -> CoercionError {
    CoercionError::Parse {
        type_name: kind.type_name().to_string(),
        value: raw.to_string(),
        message: message.to_string(),
    }
}

fn parse_number<N>(raw: &str, kind: &FieldKind) -> Result<N, CoercionError>
where
    N: FromStr,
    N::Err: ToString,
{
    strip_grouping(raw)
        .parse::<N>()
        .map_err(|e| parse_error(raw, kind, e))
}

fn parse_decimal(raw: &str, kind: &FieldKind) -> Result<Decimal, CoercionError> {
    let cleaned = strip_grouping(raw);
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|e| parse_error(raw, kind, e))
}

/// 日期格式串能否被 chrono 识别
pub fn is_valid_date_pattern(pattern: &str) -> bool {
    !pattern.trim().is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// 按格式解析日期；格式中缺少的部分取默认值
///
/// 缺年 → 1970，缺月/日 → 1，缺时间 → 00:00:00，
/// 因此 "%Y年%m月"、"%H:%M" 这类格式同样可以解析。
fn parse_date(raw: &str, pattern: &str, kind: &FieldKind) -> Result<NaiveDateTime, CoercionError> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, raw.trim(), StrftimeItems::new(pattern)).map_err(|e| parse_error(raw, kind, e))?;

    let date = parsed
        .to_naive_date()
        .or_else(|_| with_defaults(&parsed, false).to_naive_date())
        .or_else(|_| with_defaults(&parsed, true).to_naive_date())
        .map_err(|e| parse_error(raw, kind, e))?;

    // 只有小时没有分钟时分钟取 0
    let time = parsed
        .to_naive_time()
        .or_else(|_| {
            let mut filled = parsed.clone();
            let _ = filled.set_minute(0);
            filled.to_naive_time()
        })
        .unwrap_or(NaiveTime::MIN);

    Ok(date.and_time(time))
}

// 已解析的字段保持不变（set_* 遇到不一致的值会拒绝覆盖）
fn with_defaults(parsed: &Parsed, fill_year: bool) -> Parsed {
    let mut filled = parsed.clone();
    if fill_year {
        let _ = filled.set_year(1970);
    }
    let _ = filled.set_month(1);
    let _ = filled.set_day(1);
    filled
}
