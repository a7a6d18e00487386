// ==========================================
// Excel 导入引擎 - 校验链
// ==========================================
// 职责: 单元格校验（默认 → 非空 → 正则 → 自定义）与行校验
// 规则: 后一级覆盖前一级结果；自定义校验完全替代前三级
// 说明: 校验器解析/调用失败统一视为拒绝，不向外抛出
// ==========================================

use crate::importer::diagnostics::{Diagnostic, DiagnosticKind};
use crate::importer::header_resolver::FieldBinding;
use crate::importer::validator_registry::ValidatorRegistry;
use crate::schema::{ClassBinding, CustomCheck, ValidationOutcome};
use tracing::warn;

/// 字段上下文前缀，如 "第3行【年龄】列"
pub fn field_context(row: usize, label: &str) -> String {
    format!("第{}行【{}】列", row + 1, label.trim())
}

/// 行上下文前缀，如 "第3行"
pub fn row_context(row: usize) -> String {
    format!("第{}行", row + 1)
}

fn method_error(context: &str) -> ValidationOutcome {
    ValidationOutcome::rejected(format!("{}方法校验错误！", context))
}

/// 校验单元格原始值
///
/// # 参数
/// - raw: 单元格显示值（缺失单元格为空字符串）
/// - binding: 列绑定
/// - row: 行号（0 基）
pub fn validate_cell<T>(
    raw: &str,
    binding: &FieldBinding<'_, T>,
    row: usize,
    registry: &mut ValidatorRegistry<'_, T>,
    diagnostics: &mut Vec<Diagnostic>,
) -> ValidationOutcome {
    let descriptor = binding.descriptor;
    let context = field_context(row, descriptor.label());
    let blank = raw.trim().is_empty();

    // 1. 默认
    let mut outcome = if blank {
        ValidationOutcome::accepted("")
    } else {
        ValidationOutcome::accepted(raw)
    };

    // 2. 非空
    if descriptor.requires_non_empty() && blank {
        outcome = ValidationOutcome::rejected(format!("{}为空！", context));
    }

    // 3. 正则
    if let Some(regex) = binding.regex.as_ref() {
        if !blank && !regex.is_match(raw.trim()) {
            let tip = descriptor
                .regex_error_tip()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or("数据格式错误");
            outcome = ValidationOutcome::rejected(format!("{}{}", context, tip));
        }
    }

    // 4. 自定义
    match descriptor.custom_check() {
        Some(CustomCheck::Inline(check)) => check(raw, &context),
        Some(CustomCheck::Named(function)) if !function.trim().is_empty() => {
            let Some(validator) = registry.field_validator(descriptor, diagnostics) else {
                return method_error(&context);
            };
            match validator.check_field(function, raw, &context) {
                Some(result) => result,
                None => {
                    warn!(field = %descriptor.label(), function = %function, "校验方法不存在");
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::ValidatorFunctionMissing,
                            format!("校验方法不存在: {}", function),
                        )
                        .at_row(row)
                        .for_field(descriptor.label()),
                    );
                    method_error(&context)
                }
            }
        }
        _ => outcome,
    }
}

/// 行级校验
///
/// # 返回
/// - None: 未配置行校验
/// - Some(outcome): 校验结果
pub fn validate_row<T>(
    record: &T,
    class: &ClassBinding<T>,
    row: usize,
    registry: &mut ValidatorRegistry<'_, T>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ValidationOutcome> {
    if !class.has_row_check() {
        return None;
    }
    let context = row_context(row);

    if let Some(check) = class.inline_check() {
        return Some(check(record, &context));
    }

    let function = class.function()?;
    let Some(validator) = registry.row_validator(diagnostics) else {
        return Some(method_error(&context));
    };

    let outcome = validator.check_row(function, record, &context).unwrap_or_else(|| {
        warn!(class = %class.label(), function = %function, "行校验方法不存在");
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::ValidatorFunctionMissing,
                format!("行校验方法不存在: {}", function),
            )
            .at_row(row),
        );
        method_error(&context)
    });
    Some(outcome)
}
