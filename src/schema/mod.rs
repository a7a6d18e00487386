// ==========================================
// Excel 导入引擎 - 导入模板层
// ==========================================
// 职责: 静态声明记录类型与字段的导入配置
// 包含: 字段描述 / 记录类型级配置 / 校验器接口
// ==========================================

pub mod field;
pub mod import_schema;
pub mod validator;

pub use field::{FieldDescriptor, FieldKind, FieldValue};
pub use import_schema::{ClassBinding, ImportSchema};
pub use validator::{
    CustomCheck, FieldCheck, RowCheck, ValidationOutcome, ValidatorFactory, ValidatorProvider,
    ACCEPT_MARKER,
};
