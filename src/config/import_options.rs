// ==========================================
// Excel 导入引擎 - 导入配置
// ==========================================
// 职责: 导入配置项定义、JSON 加载与合法性校验
// 红线: 不包含业务逻辑
// ==========================================

use crate::importer::error::{TemplateError, DEFAULT_LINE_SEPARATOR};
use crate::importer::type_coercion::is_valid_date_pattern;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// 配置键（与 JSON 字段名一致）
pub mod config_keys {
    pub const HEADER_ROWS: &str = "header_rows";
    pub const DEFAULT_DATE_FORMAT: &str = "default_date_format";
    pub const LINE_SEPARATOR: &str = "line_separator";
    pub const SKIP_BLANK_ROWS: &str = "skip_blank_rows";
    pub const DISCARD_SUPPRESSED_ROW_MESSAGES: &str = "discard_suppressed_row_messages";
}

// ==========================================
// ImportOptions - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// 表头行数：最后一行表头（第 header_rows 行）用于列名绑定，其后为数据行
    ///
    /// # 默认值
    /// - 1
    pub header_rows: usize,

    /// 字段未配置日期格式时使用的格式（chrono strftime）
    ///
    /// # 默认值
    /// - "%Y-%m-%d"
    pub default_date_format: String,

    /// 汇总校验信息的分隔符
    ///
    /// # 默认值
    /// - "\r\n"
    pub line_separator: String,

    /// 跳过所有绑定列均为空的数据行
    ///
    /// # 默认值
    /// - false
    pub skip_blank_rows: bool,

    /// 关键字段为空的行被排除时，一并移除该行已产生的校验信息
    ///
    /// # 默认值
    /// - false（保留）
    pub discard_suppressed_row_messages: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_rows: 1,
            default_date_format: "%Y-%m-%d".to_string(),
            line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
            skip_blank_rows: false,
            discard_suppressed_row_messages: false,
        }
    }
}

impl ImportOptions {
    /// 从 JSON 字符串加载，缺省项取默认值
    pub fn from_json_str(json: &str) -> Result<Self, Box<dyn Error>> {
        let options: ImportOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn with_default_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.default_date_format = pattern.into();
        self
    }

    pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    pub fn with_skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }

    pub fn with_discard_suppressed_row_messages(mut self, discard: bool) -> Self {
        self.discard_suppressed_row_messages = discard;
        self
    }

    /// 配置合法性校验
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.header_rows == 0 {
            return Err(TemplateError::InvalidOptions {
                key: config_keys::HEADER_ROWS.to_string(),
                message: "表头行数必须大于 0".to_string(),
            });
        }

        if !is_valid_date_pattern(&self.default_date_format) {
            return Err(TemplateError::InvalidOptions {
                key: config_keys::DEFAULT_DATE_FORMAT.to_string(),
                message: format!("日期格式无效: {}", self.default_date_format),
            });
        }

        Ok(())
    }

    /// 表头行号（0 基）
    pub fn header_row_index(&self) -> usize {
        self.header_rows.saturating_sub(1)
    }

    /// 第一行数据的行号（0 基）
    pub fn first_data_row(&self) -> usize {
        self.header_rows
    }
}
