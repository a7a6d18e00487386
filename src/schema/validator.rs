// ==========================================
// Excel 导入引擎 - 校验器接口
// ==========================================
// 职责: 校验结果类型、单元格/行校验函数、可插拔校验器对象
// 兼容: 以 ACCEPT_MARKER 结尾的字符串协议（from_marked / to_marked）
// ==========================================

use std::fmt;
use std::sync::Arc;

/// 校验通过标记：返回值中包含该标记表示通过
pub const ACCEPT_MARKER: &str = "%c";

/// 校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// 通过，携带最终写入的值（可以是对输入的转换）
    Accepted(String),
    /// 拒绝，携带校验信息
    Rejected(String),
}

impl ValidationOutcome {
    pub fn accepted(value: impl Into<String>) -> Self {
        ValidationOutcome::Accepted(value.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        ValidationOutcome::Rejected(message.into())
    }

    /// 按标记协议解析校验函数的字符串返回值
    ///
    /// 包含 ACCEPT_MARKER 视为通过，去掉所有标记后的内容为最终值；
    /// 否则整个字符串即为校验信息。
    pub fn from_marked(raw: &str) -> Self {
        if raw.contains(ACCEPT_MARKER) {
            ValidationOutcome::Accepted(raw.replace(ACCEPT_MARKER, ""))
        } else {
            ValidationOutcome::Rejected(raw.to_string())
        }
    }

    /// 转换为标记协议字符串
    pub fn to_marked(&self) -> String {
        match self {
            ValidationOutcome::Accepted(value) => format!("{}{}", value, ACCEPT_MARKER),
            ValidationOutcome::Rejected(message) => message.clone(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }
}

/// 单元格校验函数: (原始值, 上下文信息) → 校验结果
pub type FieldCheck = Arc<dyn Fn(&str, &str) -> ValidationOutcome + Send + Sync>;

/// 行校验函数: (行记录, 上下文信息) → 校验结果
pub type RowCheck<T> = Arc<dyn Fn(&T, &str) -> ValidationOutcome + Send + Sync>;

// ==========================================
// ValidatorProvider Trait
// ==========================================
// 用途: 一组具名校验函数（一个校验器对象）
// 实现者: 调用方；记录类型本身也可以实现（自校验实体）
pub trait ValidatorProvider<T>: Send + Sync {
    /// 执行具名单元格校验
    ///
    /// # 返回
    /// - Some(outcome): 校验结果
    /// - None: 不存在该校验函数
    fn check_field(&self, function: &str, value: &str, context: &str) -> Option<ValidationOutcome> {
        let _ = (function, value, context);
        None
    }

    /// 执行具名行校验，返回值语义同 check_field
    fn check_row(&self, function: &str, record: &T, context: &str) -> Option<ValidationOutcome> {
        let _ = (function, record, context);
        None
    }
}

/// 校验器工厂：每次导入按需创建实例，创建失败时该字段无可用校验器
pub type ValidatorFactory<T> =
    Arc<dyn Fn() -> anyhow::Result<Arc<dyn ValidatorProvider<T>>> + Send + Sync>;

/// 字段上的自定义校验配置
#[derive(Clone)]
pub enum CustomCheck {
    /// 直接提供的校验函数
    Inline(FieldCheck),
    /// 由校验器对象提供的具名函数
    Named(String),
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomCheck::Inline(_) => f.write_str("Inline(..)"),
            CustomCheck::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}
