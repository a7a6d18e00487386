// ==========================================
// Excel 导入引擎 - 字段描述
// ==========================================
// 职责: 静态声明的字段配置（列名、关键字段、日期格式、非空、正则、自定义校验）
// 说明: 每种目标类型一个构造函数，setter 接收已转换的 Option<目标类型>
// ==========================================

use crate::schema::validator::{CustomCheck, ValidationOutcome};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// 字段目标类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Long,
    Short,
    Float,
    Double,
    Decimal,
    Date,
    Text,
    /// 没有转换程序的类型，导入时报模板错误
    Unsupported(String),
}

impl FieldKind {
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Integer => "i32",
            FieldKind::Long => "i64",
            FieldKind::Short => "i16",
            FieldKind::Float => "f32",
            FieldKind::Double => "f64",
            FieldKind::Decimal => "Decimal",
            FieldKind::Date => "NaiveDateTime",
            FieldKind::Text => "String",
            FieldKind::Unsupported(name) => name,
        }
    }
}

/// 转换后的字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i32),
    Long(i64),
    Short(i16),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Date(NaiveDateTime),
    Text(String),
}

impl FieldValue {
    /// 空白文本视为空值（关键字段判定）
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    fn into_integer(self) -> Option<i32> {
        match self {
            FieldValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    fn into_long(self) -> Option<i64> {
        match self {
            FieldValue::Long(v) => Some(v),
            _ => None,
        }
    }

    fn into_short(self) -> Option<i16> {
        match self {
            FieldValue::Short(v) => Some(v),
            _ => None,
        }
    }

    fn into_float(self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(v),
            _ => None,
        }
    }

    fn into_double(self) -> Option<f64> {
        match self {
            FieldValue::Double(v) => Some(v),
            _ => None,
        }
    }

    fn into_decimal(self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(v) => Some(v),
            _ => None,
        }
    }

    fn into_date(self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(v) => Some(v),
            _ => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

type Setter<T> = Arc<dyn Fn(&mut T, Option<FieldValue>) + Send + Sync>;

// ==========================================
// FieldDescriptor - 字段描述
// ==========================================
pub struct FieldDescriptor<T> {
    label: String,
    kind: FieldKind,
    is_key: bool,
    date_format: String,
    requires_non_empty: bool,
    regex: Option<String>,
    regex_tip: Option<String>,
    validator_identity: Option<String>,
    custom: Option<CustomCheck>,
    setter: Setter<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    fn with_setter<F>(label: impl Into<String>, kind: FieldKind, setter: F) -> Self
    where
        F: Fn(&mut T, Option<FieldValue>) + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            kind,
            is_key: false,
            date_format: String::new(),
            requires_non_empty: false,
            regex: None,
            regex_tip: None,
            validator_identity: None,
            custom: None,
            setter: Arc::new(setter),
        }
    }

    pub fn text<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<String>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Text, move |r, v| {
            set(r, v.and_then(FieldValue::into_text))
        })
    }

    pub fn integer<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<i32>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Integer, move |r, v| {
            set(r, v.and_then(FieldValue::into_integer))
        })
    }

    pub fn long<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<i64>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Long, move |r, v| {
            set(r, v.and_then(FieldValue::into_long))
        })
    }

    pub fn short<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<i16>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Short, move |r, v| {
            set(r, v.and_then(FieldValue::into_short))
        })
    }

    pub fn float<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<f32>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Float, move |r, v| {
            set(r, v.and_then(FieldValue::into_float))
        })
    }

    pub fn double<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<f64>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Double, move |r, v| {
            set(r, v.and_then(FieldValue::into_double))
        })
    }

    pub fn decimal<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<Decimal>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Decimal, move |r, v| {
            set(r, v.and_then(FieldValue::into_decimal))
        })
    }

    pub fn date<F>(label: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Option<NaiveDateTime>) + Send + Sync + 'static,
    {
        Self::with_setter(label, FieldKind::Date, move |r, v| {
            set(r, v.and_then(FieldValue::into_date))
        })
    }

    /// 声明一个没有转换程序的字段类型
    pub fn unsupported(label: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_setter(label, FieldKind::Unsupported(type_name.into()), |_, _| {})
    }
}

impl<T> FieldDescriptor<T> {
    /// 标记为关键字段：为空时整行不导入
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// 日期格式（chrono strftime 格式，如 "%Y/%-m/%-d"）
    pub fn date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    /// 非空校验
    pub fn not_empty(mut self) -> Self {
        self.requires_non_empty = true;
        self
    }

    /// 正则校验（整值匹配）
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// 正则校验失败提示
    pub fn regex_tip(mut self, tip: impl Into<String>) -> Self {
        self.regex_tip = Some(tip.into());
        self
    }

    /// 指定字段级校验器（已在 ImportSchema 中注册的标识）
    pub fn validator(mut self, identity: impl Into<String>) -> Self {
        self.validator_identity = Some(identity.into());
        self
    }

    /// 指定具名校验函数
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.custom = Some(CustomCheck::Named(name.into()));
        self
    }

    /// 直接提供校验函数
    pub fn validate_with<F>(mut self, check: F) -> Self
    where
        F: Fn(&str, &str) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.custom = Some(CustomCheck::Inline(Arc::new(check)));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn date_format_pattern(&self) -> &str {
        &self.date_format
    }

    pub fn requires_non_empty(&self) -> bool {
        self.requires_non_empty
    }

    pub fn regex_pattern(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    pub fn regex_error_tip(&self) -> Option<&str> {
        self.regex_tip.as_deref()
    }

    pub fn validator_identity(&self) -> Option<&str> {
        self.validator_identity.as_deref()
    }

    pub fn custom_check(&self) -> Option<&CustomCheck> {
        self.custom.as_ref()
    }

    /// 写入转换后的值
    pub fn assign(&self, record: &mut T, value: Option<FieldValue>) {
        (self.setter)(record, value)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("is_key", &self.is_key)
            .field("date_format", &self.date_format)
            .field("requires_non_empty", &self.requires_non_empty)
            .field("regex", &self.regex)
            .field("validator_identity", &self.validator_identity)
            .field("custom", &self.custom)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Row {
        name: Option<String>,
        age: Option<i32>,
    }

    #[test]
    fn test_typed_setter_receives_matching_value() {
        let name = FieldDescriptor::text("姓名", |r: &mut Row, v| r.name = v);
        let age = FieldDescriptor::integer("年龄", |r: &mut Row, v| r.age = v);

        let mut row = Row::default();
        name.assign(&mut row, Some(FieldValue::Text("张三".to_string())));
        age.assign(&mut row, Some(FieldValue::Integer(30)));

        assert_eq!(row.name.as_deref(), Some("张三"));
        assert_eq!(row.age, Some(30));

        age.assign(&mut row, None);
        assert_eq!(row.age, None);
    }

    #[test]
    fn test_builder_flags() {
        let field = FieldDescriptor::text("编号", |r: &mut Row, v| r.name = v)
            .key()
            .not_empty()
            .regex("^D\\d+$")
            .regex_tip("编号格式错误")
            .validator("no-validator")
            .function("validate");

        assert!(field.is_key());
        assert!(field.requires_non_empty());
        assert_eq!(field.regex_pattern(), Some("^D\\d+$"));
        assert_eq!(field.regex_error_tip(), Some("编号格式错误"));
        assert_eq!(field.validator_identity(), Some("no-validator"));
        assert!(matches!(field.custom_check(), Some(CustomCheck::Named(n)) if n == "validate"));
        assert_eq!(field.kind().type_name(), "String");
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(FieldValue::Text("  ".to_string()).is_empty());
        assert!(!FieldValue::Text("a".to_string()).is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
    }
}
