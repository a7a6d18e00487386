// ==========================================
// Excel 导入引擎 - 工作簿访问层
// ==========================================
// 职责: 单元格/合并区域/工作表的内存表示，以及基于 calamine 的加载
// 说明: 导入引擎只依赖 SheetSource，不直接接触文件格式
// ==========================================

pub mod cell;
pub mod loader;
pub mod sheet;

pub use cell::{datetime_to_serial, serial_to_datetime, CellPosition, CellValue};
pub use loader::{load_first_sheet, SourceFormat};
pub use sheet::{MergedRegion, Sheet, SheetBuilder, SheetSource};
