// ==========================================
// Excel 导入引擎 - 工作表抽象
// ==========================================
// 职责: 定义导入引擎读取工作表的接口（SheetSource）
// 实现: Sheet（内存表示，calamine 加载结果与测试数据共用）
// ==========================================

use crate::workbook::cell::CellValue;
use serde::{Deserialize, Serialize};

// ==========================================
// MergedRegion - 合并区域
// ==========================================
// 坐标均为 0 基、闭区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRegion {
    pub first_row: usize,
    pub first_column: usize,
    pub last_row: usize,
    pub last_column: usize,
}

impl MergedRegion {
    pub fn new(first_row: usize, first_column: usize, last_row: usize, last_column: usize) -> Self {
        Self {
            first_row,
            first_column,
            last_row,
            last_column,
        }
    }
}

// ==========================================
// SheetSource Trait
// ==========================================
// 用途: 导入引擎的只读数据源
// 实现者: Sheet
pub trait SheetSource {
    /// 工作表名称
    fn name(&self) -> &str;

    /// 读取单元格，行或单元格不存在时返回 None
    fn cell(&self, row: usize, column: usize) -> Option<&CellValue>;

    /// 最后一行的行号（0 基），空表返回 None
    fn last_row_index(&self) -> Option<usize>;

    /// 指定行的单元格数量（不存在的行为 0）
    fn row_width(&self, row: usize) -> usize;

    /// 合并区域列表
    fn merged_regions(&self) -> &[MergedRegion];
}

// ==========================================
// Sheet - 内存工作表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Option<CellValue>>>,
    merged_regions: Vec<MergedRegion>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn builder(name: impl Into<String>) -> SheetBuilder {
        SheetBuilder {
            sheet: Sheet::new(name),
        }
    }

    /// 写入单元格，按需扩展行列
    pub fn set_cell(&mut self, row: usize, column: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, None);
        }
        cells[column] = Some(value);
    }

    pub fn add_merged_region(&mut self, region: MergedRegion) {
        self.merged_regions.push(region);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl SheetSource for Sheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    fn last_row_index(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    fn row_width(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }
}

// ==========================================
// SheetBuilder - 按行构造工作表
// ==========================================
pub struct SheetBuilder {
    sheet: Sheet,
}

impl SheetBuilder {
    /// 追加一行
    pub fn row<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row = self.sheet.rows.len();
        self.sheet.rows.push(Vec::new());
        for (column, value) in cells.into_iter().enumerate() {
            self.sheet.set_cell(row, column, value.into());
        }
        self
    }

    /// 追加一个不存在的行（读取时所有单元格为 None）
    pub fn missing_row(mut self) -> Self {
        self.sheet.rows.push(Vec::new());
        self
    }

    /// 写入单个单元格
    pub fn cell(mut self, row: usize, column: usize, value: impl Into<CellValue>) -> Self {
        self.sheet.set_cell(row, column, value.into());
        self
    }

    pub fn merge(mut self, first_row: usize, first_column: usize, last_row: usize, last_column: usize) -> Self {
        self.sheet
            .add_merged_region(MergedRegion::new(first_row, first_column, last_row, last_column));
        self
    }

    pub fn build(self) -> Sheet {
        self.sheet
    }
}
