// ==========================================
// Excel 导入引擎 - 核心库
// ==========================================
// 职责: 按静态声明的导入模板把工作表数据行绑定为类型化记录
// 技术栈: calamine（工作簿读取）+ regex + chrono + rust_decimal
// 错误策略: 模板错误立即中止；数据校验错误全表汇总后一次性返回
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 配置层 - 导入选项
pub mod config;

// 导入层 - 导入引擎
pub mod importer;

// 日志系统
pub mod logging;

// 模板层 - 字段/记录类型声明与校验器接口
pub mod schema;

// 工作簿层 - 单元格模型与 calamine 适配
pub mod workbook;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::ImportOptions;

pub use importer::{
    Diagnostic, DiagnosticKind, ExcelImporter, ImportBatch, ImportError, ImportResult,
    TemplateError, ValidationFailure,
};

pub use schema::{
    ClassBinding, FieldDescriptor, FieldKind, FieldValue, ImportSchema, ValidationOutcome,
    ValidatorProvider, ACCEPT_MARKER,
};

pub use workbook::{CellPosition, CellValue, MergedRegion, Sheet, SheetSource};

// ==========================================
// 常量定义
// ==========================================

// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
