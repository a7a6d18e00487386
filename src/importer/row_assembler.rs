// ==========================================
// Excel 导入引擎 - 行组装与错误汇总
// ==========================================
// 职责: 逐行逐列（列号升序）读取 → 校验 → 转换 → 写入记录
// 状态: NoRecord → Building → {Committed | KeySuppressed}
// 汇总: 校验信息全表累积，扫描结束后统一决定成功或失败
// 说明: 模板错误（不支持的类型、内部故障）立即中止
// ==========================================

use crate::config::ImportOptions;
use crate::importer::cell_reader::{is_blank_cell, is_date_cell, read_cell};
use crate::importer::diagnostics::{Diagnostic, DiagnosticKind};
use crate::importer::error::TemplateError;
use crate::importer::header_resolver::BindingTable;
use crate::importer::merge_resolver::MergeAnchors;
use crate::importer::type_coercion::{coerce, CoercionError};
use crate::importer::validation_chain::{field_context, validate_cell, validate_row};
use crate::importer::validator_registry::ValidatorRegistry;
use crate::schema::{ClassBinding, FieldKind, FieldValue, ValidationOutcome};
use crate::workbook::SheetSource;
use tracing::{debug, error, warn};

/// 单行状态
enum RowState<T> {
    NoRecord,
    Building(T),
    KeySuppressed,
}

/// 全表扫描结果
#[derive(Debug)]
pub struct ScanOutcome<T> {
    pub records: Vec<T>,
    /// 按发现顺序排列的校验信息
    pub messages: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub rows_scanned: usize,
}

// ==========================================
// RowAssembler - 行组装器（每次导入一个实例）
// ==========================================
pub struct RowAssembler<'s, 'b, T> {
    bindings: &'b BindingTable<'s, T>,
    anchors: &'b MergeAnchors,
    class: &'s ClassBinding<T>,
    registry: ValidatorRegistry<'s, T>,
    options: &'b ImportOptions,
    records: Vec<T>,
    messages: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    rows_scanned: usize,
}

impl<'s, 'b, T: Default> RowAssembler<'s, 'b, T> {
    pub fn new(
        bindings: &'b BindingTable<'s, T>,
        anchors: &'b MergeAnchors,
        class: &'s ClassBinding<T>,
        registry: ValidatorRegistry<'s, T>,
        options: &'b ImportOptions,
    ) -> Self {
        Self {
            bindings,
            anchors,
            class,
            registry,
            options,
            records: Vec::new(),
            messages: Vec::new(),
            diagnostics: Vec::new(),
            rows_scanned: 0,
        }
    }

    /// 扫描 [first_row, last_row] 全部数据行
    pub fn scan<S: SheetSource>(
        mut self,
        sheet: &S,
        first_row: usize,
        last_row: usize,
    ) -> Result<ScanOutcome<T>, TemplateError> {
        for row in first_row..=last_row {
            self.assemble_row(sheet, row)?;
        }
        Ok(self.finish())
    }

    /// 组装单行
    pub fn assemble_row<S: SheetSource>(&mut self, sheet: &S, row: usize) -> Result<(), TemplateError> {
        self.rows_scanned += 1;

        if self.options.skip_blank_rows && self.is_blank_row(sheet, row) {
            debug!(row = row + 1, "跳过空行");
            self.diagnostics.push(
                Diagnostic::new(DiagnosticKind::BlankRowSkipped, format!("第{}行为空行，已跳过", row + 1))
                    .at_row(row),
            );
            return Ok(());
        }

        let row_start = self.messages.len();
        let mut state = RowState::NoRecord;
        let bindings = self.bindings;

        for binding in bindings.iter() {
            let descriptor = binding.descriptor;
            let position = self.anchors.resolve(row, binding.column);
            let cell = sheet.cell(position.row, position.column);

            if matches!(state, RowState::NoRecord) {
                state = RowState::Building(T::default());
            }
            let RowState::Building(record) = &mut state else {
                break;
            };

            // 日期前置检查失败只记录信息，不做关键字段判定，继续处理后续列
            if *binding.kind() == FieldKind::Date && !is_date_cell(cell) {
                self.messages
                    .push(format!("{}日期格式错误", field_context(row, binding.label())));
                continue;
            }

            let mut assigned: Option<FieldValue> = None;
            let raw = read_cell(cell, &binding.date_pattern).unwrap_or_default();
            match validate_cell(&raw, binding, row, &mut self.registry, &mut self.diagnostics) {
                ValidationOutcome::Accepted(value) => {
                    let converted = coerce(&value, binding.kind(), &binding.date_pattern)
                        .map_err(|e| coercion_fault(row, binding.label(), e))?;
                    descriptor.assign(record, converted.clone());
                    assigned = converted;
                }
                ValidationOutcome::Rejected(message) => self.messages.push(message),
            }

            if descriptor.is_key() && assigned.as_ref().map_or(true, FieldValue::is_empty) {
                warn!(row = row + 1, field = %binding.label(), "关键字段为空，整行不导入");
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::KeyFieldEmpty,
                        format!("第{}行关键字段【{}】为空，整行不导入", row + 1, binding.label().trim()),
                    )
                    .at_row(row)
                    .for_field(binding.label()),
                );
                if self.options.discard_suppressed_row_messages {
                    self.messages.truncate(row_start);
                }
                state = RowState::KeySuppressed;
                break;
            }
        }

        if let RowState::Building(record) = state {
            let outcome = validate_row(&record, self.class, row, &mut self.registry, &mut self.diagnostics);
            if let Some(ValidationOutcome::Rejected(message)) = outcome {
                self.messages.push(message);
            }
            // 行校验失败不排除记录，只记录错误
            self.records.push(record);
        }
        Ok(())
    }

    fn is_blank_row<S: SheetSource>(&self, sheet: &S, row: usize) -> bool {
        self.bindings.iter().all(|binding| {
            let position = self.anchors.resolve(row, binding.column);
            is_blank_cell(sheet.cell(position.row, position.column))
        })
    }

    pub fn finish(self) -> ScanOutcome<T> {
        ScanOutcome {
            records: self.records,
            messages: self.messages,
            diagnostics: self.diagnostics,
            rows_scanned: self.rows_scanned,
        }
    }
}

fn coercion_fault(row: usize, label: &str, err: CoercionError) -> TemplateError {
    match err {
        CoercionError::Unsupported(type_name) => {
            error!(row = row + 1, field = %label, type_name = %type_name, "字段类型没有转换程序");
            TemplateError::UnsupportedFieldType(type_name)
        }
        CoercionError::Parse { .. } => {
            error!(row = row + 1, field = %label, error = %err, "类型转换失败");
            TemplateError::Internal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::header_resolver::{read_header_labels, resolve_bindings};
    use crate::schema::{FieldDescriptor, ImportSchema};
    use crate::workbook::{CellValue, Sheet};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Item {
        code: Option<String>,
        qty: Option<i32>,
    }

    fn schema() -> ImportSchema<Item> {
        ImportSchema::new("物料")
            .field(FieldDescriptor::text("编码", |r: &mut Item, v| r.code = v).key())
            .field(FieldDescriptor::integer("数量", |r: &mut Item, v| r.qty = v).not_empty())
    }

    fn scan(schema: &ImportSchema<Item>, sheet: &Sheet, options: &ImportOptions) -> Result<ScanOutcome<Item>, TemplateError> {
        let labels = read_header_labels(sheet, 0, &options.default_date_format);
        let bindings = resolve_bindings(&labels, schema.fields(), &options.default_date_format)?;
        let anchors = MergeAnchors::from_regions(sheet.merged_regions());
        let registry = ValidatorRegistry::new(schema);
        let last = sheet.last_row_index().unwrap_or(0);
        RowAssembler::new(&bindings, &anchors, schema.class(), registry, options).scan(sheet, 1, last)
    }

    #[test]
    fn test_rows_assembled_in_order() {
        let sheet = Sheet::builder("物料")
            .row(["编码", "数量"])
            .row([CellValue::text("A1"), CellValue::number(3.0)])
            .row([CellValue::text("A2"), CellValue::text("1,234")])
            .build();
        let outcome = scan(&schema(), &sheet, &ImportOptions::default()).unwrap();

        assert!(outcome.messages.is_empty());
        assert_eq!(outcome.rows_scanned, 2);
        assert_eq!(
            outcome.records,
            vec![
                Item { code: Some("A1".into()), qty: Some(3) },
                Item { code: Some("A2".into()), qty: Some(1234) },
            ]
        );
    }

    #[test]
    fn test_key_field_suppresses_row() {
        let sheet = Sheet::builder("物料")
            .row(["编码", "数量"])
            .row([CellValue::Blank, CellValue::Blank])
            .build();
        let outcome = scan(&schema(), &sheet, &ImportOptions::default()).unwrap();

        assert!(outcome.records.is_empty());
        // 关键字段在首列，后续列不再处理
        assert!(outcome.messages.is_empty());
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::KeyFieldEmpty);
    }

    #[test]
    fn test_messages_of_suppressed_row() {
        let schema = ImportSchema::new("物料")
            .field(FieldDescriptor::integer("数量", |r: &mut Item, v| r.qty = v).not_empty())
            .field(FieldDescriptor::text("编码", |r: &mut Item, v| r.code = v).key());
        let sheet = Sheet::builder("物料")
            .row(["数量", "编码"])
            .row([CellValue::Blank, CellValue::Blank])
            .build();

        let kept = scan(&schema, &sheet, &ImportOptions::default()).unwrap();
        assert_eq!(kept.messages, vec!["第2行【数量】列为空！".to_string()]);
        assert!(kept.records.is_empty());

        let options = ImportOptions::default().with_discard_suppressed_row_messages(true);
        let discarded = scan(&schema, &sheet, &options).unwrap();
        assert!(discarded.messages.is_empty());
    }

    #[test]
    fn test_date_key_failing_precondition_keeps_checking_row() {
        #[derive(Debug, Default)]
        struct Entry {
            day: Option<chrono::NaiveDateTime>,
            code: Option<String>,
        }
        let schema = ImportSchema::new("台账")
            .field(FieldDescriptor::date("日期", |e: &mut Entry, v| e.day = v).key())
            .field(FieldDescriptor::text("编码", |e: &mut Entry, v| e.code = v).not_empty());
        let sheet = Sheet::builder("台账")
            .row(["日期", "编码"])
            .row([CellValue::text("2024-01-01"), CellValue::Blank])
            .build();

        let options = ImportOptions::default();
        let labels = read_header_labels(&sheet, 0, &options.default_date_format);
        let bindings = resolve_bindings(&labels, schema.fields(), &options.default_date_format).unwrap();
        let anchors = MergeAnchors::from_regions(sheet.merged_regions());
        let outcome = RowAssembler::new(&bindings, &anchors, schema.class(), ValidatorRegistry::new(&schema), &options)
            .scan(&sheet, 1, 1)
            .unwrap();

        assert_eq!(
            outcome.messages,
            vec!["第2行【日期】列日期格式错误".to_string(), "第2行【编码】列为空！".to_string()]
        );
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_unparseable_accepted_value_is_internal_fault() {
        let sheet = Sheet::builder("物料")
            .row(["编码", "数量"])
            .row([CellValue::text("A1"), CellValue::text("abc")])
            .build();
        let err = scan(&schema(), &sheet, &ImportOptions::default()).unwrap_err();
        assert_eq!(err, TemplateError::Internal);
    }

    #[test]
    fn test_blank_rows_skipped_when_enabled() {
        let sheet = Sheet::builder("物料")
            .row(["编码", "数量"])
            .missing_row()
            .row([CellValue::text("A1"), CellValue::number(1.0)])
            .build();

        let options = ImportOptions::default().with_skip_blank_rows(true);
        let outcome = scan(&schema(), &sheet, &options).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::BlankRowSkipped);
        assert_eq!(outcome.diagnostics[0].row, Some(1));
    }
}
