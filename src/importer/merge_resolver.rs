// ==========================================
// Excel 导入引擎 - 合并单元格解析
// ==========================================
// 职责: 预计算合并区域内每一行首列对应的锚点单元格
// 限制: 只重定向合并区域首列的读取；区域内其他列不受影响
// ==========================================

use crate::workbook::{CellPosition, MergedRegion};
use std::collections::HashMap;

/// 行 → (列 → 锚点位置)
#[derive(Debug, Clone, Default)]
pub struct MergeAnchors {
    anchors: HashMap<usize, HashMap<usize, CellPosition>>,
}

impl MergeAnchors {
    /// 根据工作表的合并区域列表构建锚点表
    ///
    /// 多个区域覆盖同一位置时，后出现的区域生效。
    pub fn from_regions(regions: &[MergedRegion]) -> Self {
        let mut anchors: HashMap<usize, HashMap<usize, CellPosition>> = HashMap::new();
        for region in regions {
            let anchor = CellPosition::new(region.first_row, region.first_column);
            for row in region.first_row..=region.last_row {
                anchors
                    .entry(row)
                    .or_default()
                    .insert(region.first_column, anchor);
            }
        }
        Self { anchors }
    }

    /// 解析实际读取位置
    pub fn resolve(&self, row: usize, column: usize) -> CellPosition {
        self.anchors
            .get(&row)
            .and_then(|columns| columns.get(&column))
            .copied()
            .unwrap_or(CellPosition::new(row, column))
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
