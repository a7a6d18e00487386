// ==========================================
// Excel 导入引擎 - 导入层
// ==========================================
// 职责: 工作表 → 类型化记录（表头绑定、合并单元格、校验链、类型转换、错误汇总）
// 流程: header_resolver / merge_resolver 每次调用执行一次，
//       之后逐行调用 cell_reader → validation_chain → type_coercion → row_assembler
// ==========================================

// 模块声明
pub mod cell_reader;
pub mod diagnostics;
pub mod error;
pub mod excel_importer;
pub mod header_resolver;
pub mod merge_resolver;
pub mod row_assembler;
pub mod type_coercion;
pub mod validation_chain;
pub mod validator_registry;

// 重导出核心类型
pub use cell_reader::{format_numeric, read_cell, ILLEGAL_CHARACTER};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{ImportError, ImportResult, TemplateError, ValidationFailure, DEFAULT_LINE_SEPARATOR};
pub use excel_importer::{ExcelImporter, ImportBatch};
pub use header_resolver::{BindingTable, FieldBinding};
pub use merge_resolver::MergeAnchors;
pub use type_coercion::{coerce, CoercionError};
pub use validation_chain::{field_context, row_context};
pub use validator_registry::ValidatorRegistry;
