// ==========================================
// 酒店入住率预测看板 - 配置管理器
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 0.3 配置项全集
// 职责: 提供导入管道的配置常量（外部供给,进程内只读）
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::cell_parser::{MEDIUM_TERM_MAX_DAYS, NEAR_TERM_MAX_DAYS};
use async_trait::async_trait;
use std::error::Error;

/// 默认最大文件字节数（50MB）
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// 默认分批大小（每次后端写入的记录条数）
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 1000;

/// 默认整批拒绝阈值（违规数严格大于该值时整批拒绝）
pub const DEFAULT_VIOLATION_REJECT_THRESHOLD: usize = 10;

/// 默认软违规抽样条数
pub const DEFAULT_DQ_SAMPLE_SIZE: usize = 50;

/// 默认元信息标签扫描窗口（行）
pub const DEFAULT_METADATA_SCAN_ROWS: usize = 20;

/// 默认跳过行号样本封顶
pub const DEFAULT_SKIPPED_ROW_SAMPLE_CAP: usize = 5;

// ==========================================
// ConfigManager - 静态配置实现
// ==========================================
// 说明: 上传分批大小等均为部署期常量,不在导入流程内重新推导;
//       测试可用字段覆写构造非默认配置
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub max_file_size_bytes: u64,
    pub insert_batch_size: usize,
    pub required_fields: Vec<String>,
    pub valid_market_segments: Vec<String>,
    pub violation_reject_threshold: usize,
    pub dq_sample_size: usize,
    pub metadata_scan_rows: usize,
    pub skipped_row_sample_cap: usize,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
            required_fields: [
                "as_of_date",
                "city",
                "forecast_date",
                "market_segment",
                "current_occupancy",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            valid_market_segments: ["Totals", "Transient", "Group_Sold", "Unsold_Block", "Other"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            violation_reject_threshold: DEFAULT_VIOLATION_REJECT_THRESHOLD,
            dq_sample_size: DEFAULT_DQ_SAMPLE_SIZE,
            metadata_scan_rows: DEFAULT_METADATA_SCAN_ROWS,
            skipped_row_sample_cap: DEFAULT_SKIPPED_ROW_SAMPLE_CAP,
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error>> {
        Ok(self.max_file_size_bytes)
    }

    async fn get_insert_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.insert_batch_size)
    }

    async fn get_required_fields(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.required_fields.clone())
    }

    async fn get_valid_market_segments(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.valid_market_segments.clone())
    }

    async fn get_violation_reject_threshold(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.violation_reject_threshold)
    }

    async fn get_dq_sample_size(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.dq_sample_size)
    }

    async fn get_metadata_scan_rows(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.metadata_scan_rows)
    }

    async fn get_skipped_row_sample_cap(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.skipped_row_sample_cap)
    }

    // 区间边界与 cell_parser 的派生常量共用同一来源,避免两处漂移
    async fn get_near_term_max_days(&self) -> Result<i64, Box<dyn Error>> {
        Ok(NEAR_TERM_MAX_DAYS)
    }

    async fn get_medium_term_max_days(&self) -> Result<i64, Box<dyn Error>> {
        Ok(MEDIUM_TERM_MAX_DAYS)
    }
}
