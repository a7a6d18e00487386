// ==========================================
// Excel 导入引擎 - 配置层
// ==========================================
// 职责: 导入行为配置（表头行数、默认日期格式、分隔符等）
// 存储: JSON（serde），缺省项取默认值
// ==========================================

pub mod import_options;

pub use import_options::{config_keys, ImportOptions};
