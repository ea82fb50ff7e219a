// ==========================================
// 酒店入住率预测看板 - 预测数据 Repository Trait
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART D 工程结构
// 职责: 定义后端数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则,只做数据 CRUD
// ==========================================
// 说明: 托管后端被当作不透明的批量写入/查询汇,
//       核心层只经由本接口触达,便于替换与脱离后端测试
// ==========================================

use crate::domain::forecast::{ForecastRecord, UploadBatch};
use crate::domain::types::MarketSegment;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// ForecastQuery - 记录查询条件
// ==========================================
// 等值过滤 + 预测日期范围过滤,结果恒按 forecast_date 升序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub city: Option<String>,
    pub as_of_date: Option<NaiveDate>,
    pub market_segment: Option<MarketSegment>,
    pub forecast_date_from: Option<NaiveDate>, // 含
    pub forecast_date_to: Option<NaiveDate>,   // 含
}

// ==========================================
// ReportSnapshot - 报表快照组合
// ==========================================
// 用途: 前端筛选下拉的数据源（城市 × 快照日期,按日期倒序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub city: String,
    pub as_of_date: NaiveDate,
    pub report_id: String,
    pub record_count: i64,
}

// ==========================================
// ForecastRepository Trait
// ==========================================
// 用途: 预测数据与上传审计的数据访问
// 实现者: ForecastRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    // ===== 去重与覆盖 =====

    /// 存在性探测: 是否已有同 report_id 的记录（LIMIT 1）
    ///
    /// 红线: 探测结果必须被观察后才允许发出删除/写入,
    ///       不做任何投机并发写
    async fn report_exists(&self, report_id: &str) -> Result<bool, Box<dyn Error>>;

    /// 删除指定 report_id 的全部记录
    ///
    /// # 返回
    /// - Ok(usize): 删除的行数
    async fn delete_report(&self, report_id: &str) -> Result<usize, Box<dyn Error>>;

    // ===== 批量写入 =====

    /// 写入一个批次的记录（单次后端调用,事务化）
    ///
    /// # 返回
    /// - Ok(usize): 成功写入的记录数
    /// - Err: 整个批次回滚;先前批次的成败不受影响
    async fn insert_records(&self, records: &[ForecastRecord]) -> Result<usize, Box<dyn Error>>;

    // ===== 上传审计 =====

    /// 写入上传批次审计记录（含取消/失败的尝试）
    async fn insert_upload_batch(&self, batch: &UploadBatch) -> Result<(), Box<dyn Error>>;

    /// 按上传时间倒序列出最近的批次审计记录
    async fn list_upload_batches(&self, limit: usize) -> Result<Vec<UploadBatch>, Box<dyn Error>>;

    // ===== 看板查询 =====

    /// 条件查询记录,恒按 forecast_date 升序
    async fn query_records(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<ForecastRecord>, Box<dyn Error>>;

    /// 列出去重后的 (城市, 快照日期) 组合,按快照日期倒序
    async fn list_report_snapshots(&self) -> Result<Vec<ReportSnapshot>, Box<dyn Error>>;

    /// 记录总数
    async fn count_records(&self) -> Result<i64, Box<dyn Error>>;
}
