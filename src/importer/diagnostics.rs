// ==========================================
// Excel 导入引擎 - 诊断事件
// ==========================================
// 职责: 可恢复故障（校验器不可用、关键字段为空等）的结构化记录
// 说明: 诊断随导入结果返回，同时写入 tracing 日志
// ==========================================

use serde::{Deserialize, Serialize};

/// 诊断类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    /// 关键字段为空，整行被排除
    KeyFieldEmpty,
    /// 校验器实例无法创建或未配置
    ValidatorUnavailable,
    /// 校验器中不存在指定的校验方法
    ValidatorFunctionMissing,
    /// 整行为空被跳过（skip_blank_rows）
    BlankRowSkipped,
}

/// 诊断事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 行号（0 基），与行无关时为 None
    pub row: Option<usize>,
    /// 字段标签
    pub field: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            row: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}
