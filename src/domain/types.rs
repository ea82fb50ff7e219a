// ==========================================
// 酒店入住率预测看板 - 领域类型定义
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART B 数据与状态体系
// 依据: Amadeus_Ingest_Spec_v0.4.md - 0.2 细分市场与预测区间
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 细分市场 (Market Segment)
// ==========================================
// 红线: 封闭枚举,与 Amadeus 报表列组一一对应
// 存储格式: 与 forecast_report 表 market_segment 列一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketSegment {
    Totals,      // 全部细分汇总
    Transient,   // 散客
    #[serde(rename = "Group_Sold")]
    GroupSold,   // 已售团体
    #[serde(rename = "Unsold_Block")]
    UnsoldBlock, // 未售团体保留房
    Other,       // 其他
}

impl MarketSegment {
    /// 报表列组顺序（每组 3 列: 当前入住率 / 周提升 / STLY 差异）
    pub const ALL: [MarketSegment; 5] = [
        MarketSegment::Totals,
        MarketSegment::Transient,
        MarketSegment::GroupSold,
        MarketSegment::UnsoldBlock,
        MarketSegment::Other,
    ];

    /// 存储标签（数据库 market_segment 列取值）
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSegment::Totals => "Totals",
            MarketSegment::Transient => "Transient",
            MarketSegment::GroupSold => "Group_Sold",
            MarketSegment::UnsoldBlock => "Unsold_Block",
            MarketSegment::Other => "Other",
        }
    }

    /// 从存储标签解析
    pub fn from_label(label: &str) -> Option<MarketSegment> {
        match label {
            "Totals" => Some(MarketSegment::Totals),
            "Transient" => Some(MarketSegment::Transient),
            "Group_Sold" => Some(MarketSegment::GroupSold),
            "Unsold_Block" => Some(MarketSegment::UnsoldBlock),
            "Other" => Some(MarketSegment::Other),
            _ => None,
        }
    }
}

impl fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 预测区间 (Forecast Horizon)
// ==========================================
// 红线: 由 days_out 纯函数派生,禁止独立赋值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastHorizon {
    Historical,  // 历史（已过去的日期）
    #[serde(rename = "Near_Term")]
    NearTerm,    // 近期 0-30 天
    #[serde(rename = "Medium_Term")]
    MediumTerm,  // 中期 31-90 天
    #[serde(rename = "Long_Term")]
    LongTerm,    // 远期 >= 91 天
}

impl ForecastHorizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastHorizon::Historical => "Historical",
            ForecastHorizon::NearTerm => "Near_Term",
            ForecastHorizon::MediumTerm => "Medium_Term",
            ForecastHorizon::LongTerm => "Long_Term",
        }
    }

    pub fn from_label(label: &str) -> Option<ForecastHorizon> {
        match label {
            "Historical" => Some(ForecastHorizon::Historical),
            "Near_Term" => Some(ForecastHorizon::NearTerm),
            "Medium_Term" => Some(ForecastHorizon::MediumTerm),
            "Long_Term" => Some(ForecastHorizon::LongTerm),
            _ => None,
        }
    }
}

impl fmt::Display for ForecastHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 上传结果状态 (Upload Status)
// ==========================================
// 说明: 用户拒绝覆盖 = CANCELLED,不是失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Completed, // 全部批次写入成功
    Cancelled, // 用户拒绝覆盖,未发生任何写入
    Failed,    // 某一批次写入失败（先前批次保持已写入状态）
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Completed => write!(f, "COMPLETED"),
            UploadStatus::Cancelled => write!(f, "CANCELLED"),
            UploadStatus::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// 上传阶段 (Upload Phase)
// ==========================================
// 依据: Upload_Pipeline_Spec_v0.3.md - 上传状态机
// Idle → CheckingDuplicate → (AwaitingOverwriteConfirmation)
//      → Deleting(可选) → Uploading(分批) → Done | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadPhase {
    Idle,
    CheckingDuplicate,
    AwaitingOverwriteConfirmation,
    Deleting,
    Uploading,
    Done,
    Failed,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPhase::Idle => write!(f, "IDLE"),
            UploadPhase::CheckingDuplicate => write!(f, "CHECKING_DUPLICATE"),
            UploadPhase::AwaitingOverwriteConfirmation => {
                write!(f, "AWAITING_OVERWRITE_CONFIRMATION")
            }
            UploadPhase::Deleting => write!(f, "DELETING"),
            UploadPhase::Uploading => write!(f, "UPLOADING"),
            UploadPhase::Done => write!(f, "DONE"),
            UploadPhase::Failed => write!(f, "FAILED"),
        }
    }
}
