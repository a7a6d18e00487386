// ==========================================
// Excel 导入引擎 - 表头解析
// ==========================================
// 职责: 按字段标签匹配表头行，生成 列号 → 字段 的绑定表
// 规则: 去空格后精确匹配，首个匹配生效；缺列立即报模板错误
// ==========================================

use crate::importer::cell_reader::read_cell;
use crate::importer::error::TemplateError;
use crate::importer::type_coercion::is_valid_date_pattern;
use crate::schema::{FieldDescriptor, FieldKind};
use crate::workbook::SheetSource;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, error};

// ==========================================
// FieldBinding - 列与字段的绑定
// ==========================================
// 每次导入构建一次，构建后不再修改
#[derive(Debug)]
pub struct FieldBinding<'s, T> {
    pub column: usize,
    pub descriptor: &'s FieldDescriptor<T>,
    /// 实际使用的日期格式（字段未配置时取默认格式）
    pub date_pattern: String,
    /// 已编译的整值匹配正则
    pub regex: Option<Regex>,
}

impl<T> FieldBinding<'_, T> {
    pub fn label(&self) -> &str {
        self.descriptor.label()
    }

    pub fn kind(&self) -> &FieldKind {
        self.descriptor.kind()
    }
}

/// 按列号排序的绑定表
#[derive(Debug)]
pub struct BindingTable<'s, T> {
    bindings: BTreeMap<usize, FieldBinding<'s, T>>,
}

impl<'s, T> BindingTable<'s, T> {
    /// 按列号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding<'s, T>> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&FieldBinding<'s, T>> {
        self.bindings.get(&column)
    }
}

/// 读取表头行标签
///
/// 空白标签保留为空字符串，保证下标与列号一致。
pub fn read_header_labels<S: SheetSource>(sheet: &S, header_row: usize, date_pattern: &str) -> Vec<String> {
    (0..sheet.row_width(header_row))
        .map(|column| {
            read_cell(sheet.cell(header_row, column), date_pattern)
                .map(|label| label.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// 构建绑定表
///
/// # 参数
/// - labels: 表头标签（已去空格）
/// - fields: 模板字段列表
/// - default_date_format: 字段未配置日期格式时使用的格式
///
/// # 返回
/// - Err(TemplateError::MissingColumn): 表头中找不到某个字段标签
/// - Err(TemplateError::InvalidPattern): 字段正则无法编译
pub fn resolve_bindings<'s, T>(
    labels: &[String],
    fields: &'s [FieldDescriptor<T>],
    default_date_format: &str,
) -> Result<BindingTable<'s, T>, TemplateError> {
    let mut bindings = BTreeMap::new();

    for descriptor in fields {
        let label = descriptor.label().trim();
        if label.is_empty() {
            continue;
        }

        let column = labels.iter().position(|l| l == label).ok_or_else(|| {
            error!(column = %label, "表头中找不到列");
            TemplateError::MissingColumn(label.to_string())
        })?;

        let regex = descriptor
            .regex_pattern()
            .filter(|p| !p.trim().is_empty())
            .map(|pattern| {
                Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| TemplateError::InvalidPattern {
                    label: label.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let date_pattern = match descriptor.date_format_pattern().trim() {
            "" => default_date_format.to_string(),
            pattern => pattern.to_string(),
        };
        if !is_valid_date_pattern(&date_pattern) {
            error!(field = %label, pattern = %date_pattern, "日期格式无效");
            return Err(TemplateError::InvalidPattern {
                label: label.to_string(),
                message: format!("日期格式无效: {}", date_pattern),
            });
        }

        debug!(column, field = %label, "列绑定");
        bindings.insert(
            column,
            FieldBinding {
                column,
                descriptor,
                date_pattern,
                regex,
            },
        );
    }

    Ok(BindingTable { bindings })
}
