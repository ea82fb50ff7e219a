// ==========================================
// 酒店入住率预测看板 - 表头定位器
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 3. 表头定位
// 职责: 在网格中定位数据体起始行
// 红线: 签名不命中 → 整个文件拒绝,不做任何转换尝试
// ==========================================

use crate::domain::forecast::RawGrid;
use crate::importer::error::{ImportError, ImportResult};
use tracing::debug;

/// 表头签名: (列下标, 不区分大小写的子串)
/// 对应 Totals 列组的三个表头单元格
const HEADER_SIGNATURE: [(usize, &str); 3] = [(3, "current"), (4, "pickup"), (5, "var")];

// ==========================================
// HeaderLocator
// ==========================================
pub struct HeaderLocator;

impl HeaderLocator {
    /// 定位数据体起始行下标
    ///
    /// 从头扫描每一行,列 3 含 "current"、列 4 含 "pickup"、
    /// 列 5 含 "var"（不区分大小写子串）即认定为表头行,
    /// 数据体从表头行的下一行开始
    pub fn locate_body_start(&self, grid: &RawGrid) -> ImportResult<usize> {
        for (row_index, row) in grid.iter().enumerate() {
            if Self::is_header_row(row) {
                debug!(header_row = row_index, "表头行命中");
                return Ok(row_index + 1);
            }
        }

        Err(ImportError::LayoutError(format!(
            "未找到表头签名行（Current / Pickup / Var,共扫描 {} 行）",
            grid.len()
        )))
    }

    fn is_header_row(row: &[crate::domain::forecast::CellValue]) -> bool {
        HEADER_SIGNATURE.iter().all(|(col, needle)| {
            row.get(*col)
                .map(|cell| cell.as_text().to_lowercase().contains(needle))
                .unwrap_or(false)
        })
    }
}
