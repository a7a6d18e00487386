// ==========================================
// Excel 导入引擎 - 导入错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 模板错误（结构性，立即中止）/ 校验错误（数据质量，全表汇总）
// ==========================================

use crate::importer::diagnostics::Diagnostic;
use std::fmt;
use thiserror::Error;

/// 校验信息默认分隔符
pub const DEFAULT_LINE_SEPARATOR: &str = "\r\n";

/// 导入错误
#[derive(Error, Debug)]
pub enum ImportError {
    /// 模板（结构）错误：需要修正文件结构或导入配置
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// 数据校验错误：需要修正文件中的数据
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

impl ImportError {
    pub fn is_template(&self) -> bool {
        matches!(self, ImportError::Template(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ImportError::Validation(_))
    }

    /// 校验失败详情（模板错误时为 None）
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            ImportError::Validation(failure) => Some(failure),
            ImportError::Template(_) => None,
        }
    }
}

/// 模板错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("文件模板错误，缺少列：{0}")]
    MissingColumn(String),

    #[error("文件读取失败: {0}")]
    UnreadableWorkbook(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls）")]
    UnsupportedFormat(String),

    #[error("导入模板的属性类型【{0}】没有对应的转换程序，请添加！")]
    UnsupportedFieldType(String),

    #[error("正则表达式配置错误 (字段 {label}): {message}")]
    InvalidPattern { label: String, message: String },

    #[error("导入配置错误 (key: {key}): {message}")]
    InvalidOptions { key: String, message: String },

    // 内部故障只对外暴露通用信息，详情写入日志
    #[error("文件模板错误")]
    Internal,
}

/// 数据校验失败：全表扫描完成后汇总的全部校验信息
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    messages: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    line_separator: String,
}

impl ValidationFailure {
    pub fn new(messages: Vec<String>, diagnostics: Vec<Diagnostic>, line_separator: impl Into<String>) -> Self {
        Self {
            messages,
            diagnostics,
            line_separator: line_separator.into(),
        }
    }

    /// 按发现顺序排列的校验信息
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 以分隔符连接的完整信息
    pub fn message(&self) -> String {
        self.messages.join(&self.line_separator)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationFailure {}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
