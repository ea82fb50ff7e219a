// ==========================================
// 酒店入住率预测看板 - 预测领域模型
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART B 数据与状态体系
// 依据: Field_Mapping_Amadeus_v0.2.md - 字段映射规范
// 依据: data_dictionary_v0.1.md - 数据字典
// ==========================================

use crate::domain::types::{ForecastHorizon, MarketSegment, UploadStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// 用途: 文件解析层输出,导入管道唯一输入
// 说明: Excel 单元格是异构的（空/数值/文本/布尔/日期）,
//       日期解析必须拿到数值本体才能走序列号纪元换算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// 单元格是否视为空（Empty 或纯空白文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 文本视图（数值/布尔/日期按展示格式转为字符串）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => format!("{}", b),
            CellValue::Date(dt) => dt.date().format("%Y-%m-%d").to_string(),
        }
    }
}

/// 原始二维网格（逐行逐列,行长不齐是常态）
pub type RawGrid = Vec<Vec<CellValue>>;

// ==========================================
// ReportMetadata - 报表元信息
// ==========================================
// 来源: 文件名分解,文件头部标签扫描兜底
// 红线: as_of_date 与 city 缺一即提取失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub file_name: String,     // 源文件名（含扩展名）
    pub report_id: String,     // 报表 ID（文件名去扩展名,整次上传的去重键）
    pub as_of_date: NaiveDate, // 报表快照日期
    pub city: String,          // 城市（Comp Set）
}

// ==========================================
// ForecastRecord - 预测记录（存储单元）
// ==========================================
// 对齐: schema forecast_report 表
// 不变量: 同一次上传内 (forecast_date, market_segment) 唯一
// 不变量: forecast_horizon 恒等于 horizon_from_days_out(days_out)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub as_of_date: NaiveDate,           // 报表快照日期
    pub report_id: String,               // 报表 ID（去重键）
    pub city: String,                    // 城市
    pub forecast_date: NaiveDate,        // 被预测的日期
    pub market_segment: MarketSegment,   // 细分市场
    pub current_occupancy: f64,          // 当前入住率（百分比点,源为 0..1 小数 ×100,保留2位）
    pub weekly_pickup: f64,              // 周提升间夜数（有符号,保留2位）
    pub stly_variance: f64,              // STLY 差异百分比（有符号,保留2位）
    pub days_out: i64,                   // forecast_date - as_of_date 的整天数,可为负
    pub forecast_horizon: ForecastHorizon, // 预测区间（由 days_out 派生）
}

// ==========================================
// DqLevel - 数据质量等级
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Info,    // 提示,不影响上传
    Warning, // 软违规,计入熔断计数
    Error,   // 硬阻断
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Info => write!(f, "INFO"),
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// DqViolation - 数据质量违规明细
// ==========================================
// 用途: 校验器输出,上传放行时作为警告返回给前端
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub record_index: usize,              // 记录下标（转换后列表内）
    pub forecast_date: Option<NaiveDate>, // 关联预测日期（便于前端定位）
    pub level: DqLevel,                   // 违规等级
    pub field: String,                    // 违规字段
    pub message: String,                  // 违规说明
}

// ==========================================
// UploadBatch - 上传批次审计记录
// ==========================================
// 用途: 每次上传尝试（含取消/失败）写一行,用于追溯
// 对齐: schema upload_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadBatch {
    pub batch_id: String,              // 批次 ID（UUID）
    pub report_id: String,             // 报表 ID
    pub file_name: String,             // 源文件名
    pub city: String,                  // 城市
    pub as_of_date: NaiveDate,         // 报表快照日期
    pub total_rows: i64,               // 数据体总行数
    pub record_count: i64,             // 转换产出记录数
    pub uploaded_rows: i64,            // 实际写入记录数
    pub skipped_rows: i64,             // 跳过行数（预测日期不可解析等）
    pub warning_count: i64,            // DQ 警告数
    pub status: UploadStatus,          // 批次终态
    pub imported_at: DateTime<Utc>,    // 上传时间
    pub elapsed_ms: i64,               // 耗时（毫秒）
}

// ==========================================
// ImportOutcome - 一次导入的完整结果
// ==========================================
// 说明: 管道各阶段无共享可变状态,结果整体返回给调用方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch: UploadBatch,               // 批次审计记录（已落库）
    pub status: UploadStatus,             // 终态（与 batch.status 一致）
    pub violations: Vec<DqViolation>,     // 放行时的警告明细
    pub skipped_row_samples: Vec<usize>,  // 被跳过行号样本（封顶,用于提示）
}

impl ImportOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == UploadStatus::Completed
    }
}
