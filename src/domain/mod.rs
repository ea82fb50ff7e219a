// ==========================================
// 酒店入住率预测看板 - 领域模型层
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART B 数据与状态体系
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod forecast;
pub mod types;

// 重导出核心类型
pub use forecast::{
    CellValue, DqLevel, DqViolation, ForecastRecord, ImportOutcome, RawGrid, ReportMetadata,
    UploadBatch,
};
pub use types::{ForecastHorizon, MarketSegment, UploadPhase, UploadStatus};
