// ==========================================
// 酒店入住率预测看板 - 行转换器
// ==========================================
// 依据: Field_Mapping_Amadeus_v0.2.md - 列组映射表
// 职责: 数据体行 → 每细分市场一条 ForecastRecord
// 红线: 单行失败只跳过该行,绝不中断整个文件
// ==========================================

use crate::domain::forecast::{ForecastRecord, RawGrid, ReportMetadata};
use crate::domain::types::MarketSegment;
use crate::importer::cell_parser::{
    horizon_from_days_out, parse_cell_date, parse_cell_number, round2,
};
use tracing::{debug, warn};

/// 预测日期所在列
const FORECAST_DATE_COL: usize = 2;

/// 行有效所需的最小列数（Other 列组末列下标 17 + 1）
const MIN_ROW_WIDTH: usize = 18;

/// 细分市场列组: (细分, 起始列),每组 3 列为 (当前入住率, 周提升, STLY 差异)
const SEGMENT_COLUMNS: [(MarketSegment, usize); 5] = [
    (MarketSegment::Totals, 3),
    (MarketSegment::Transient, 6),
    (MarketSegment::GroupSold, 9),
    (MarketSegment::UnsoldBlock, 12),
    (MarketSegment::Other, 15),
];

// ==========================================
// TransformOutcome - 转换结果
// ==========================================
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub records: Vec<ForecastRecord>,
    pub body_rows: usize,               // 数据体行数（含被跳过的行）
    pub skipped_rows: usize,            // 预测日期不可解析被跳过的行数
    pub skipped_row_indices: Vec<usize>, // 被跳过行的网格行号（未封顶,呈现层截样）
}

// ==========================================
// RowTransformer
// ==========================================
pub struct RowTransformer;

impl RowTransformer {
    /// 转换数据体
    ///
    /// # 规则（逐行）
    /// - 行宽不足 18 列或预测日期单元格为空: 结构性跳过,不计入警告
    /// - 预测日期不可解析: 跳过并记日志（RowSkip 策略,非致命）
    /// - days_out = 预测日期 - 快照日期 的整天数（两端都是日历日,无时钟参与）
    /// - 每行按固定列组发出 5 条记录,顺序 Totals → Transient →
    ///   Group_Sold → Unsold_Block → Other
    /// - 入住率源列为 0..1 小数,×100 后保留 2 位;其余两列直接保留 2 位
    ///
    /// 空结果在本层不是错误,是否放行由校验器裁决
    pub fn transform(
        &self,
        grid: &RawGrid,
        body_start: usize,
        metadata: &ReportMetadata,
    ) -> TransformOutcome {
        let mut records = Vec::new();
        let mut skipped_row_indices = Vec::new();
        let mut body_rows = 0usize;

        for (row_index, row) in grid.iter().enumerate().skip(body_start) {
            body_rows += 1;

            if row.len() < MIN_ROW_WIDTH {
                debug!(row = row_index, width = row.len(), "行宽不足,跳过");
                continue;
            }
            if row[FORECAST_DATE_COL].is_blank() {
                debug!(row = row_index, "预测日期单元格为空,跳过");
                continue;
            }

            let forecast_date = match parse_cell_date(&row[FORECAST_DATE_COL]) {
                Some(date) => date,
                None => {
                    warn!(
                        row = row_index,
                        cell = %row[FORECAST_DATE_COL].as_text(),
                        "预测日期不可解析,跳过该行"
                    );
                    skipped_row_indices.push(row_index);
                    continue;
                }
            };

            let days_out = (forecast_date - metadata.as_of_date).num_days();
            let forecast_horizon = horizon_from_days_out(days_out);

            for (segment, base_col) in SEGMENT_COLUMNS {
                records.push(ForecastRecord {
                    as_of_date: metadata.as_of_date,
                    report_id: metadata.report_id.clone(),
                    city: metadata.city.clone(),
                    forecast_date,
                    market_segment: segment,
                    current_occupancy: round2(parse_cell_number(&row[base_col]) * 100.0),
                    weekly_pickup: round2(parse_cell_number(&row[base_col + 1])),
                    stly_variance: round2(parse_cell_number(&row[base_col + 2])),
                    days_out,
                    forecast_horizon,
                });
            }
        }

        TransformOutcome {
            records,
            body_rows,
            skipped_rows: skipped_row_indices.len(),
            skipped_row_indices,
        }
    }
}
