// ==========================================
// 酒店入住率预测看板 - 看板查询 API
// ==========================================
// 职责: 封装看板读侧查询（趋势/提升节奏/差异矩阵/快照列表）
// 说明: 只返回结构化数据,渲染/主题/DOM 一概不碰
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{ForecastHorizon, MarketSegment};
use crate::repository::{ForecastQuery, ForecastRepository, ForecastRepositoryImpl, ReportSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ==========================================
// 查询请求/响应 DTO
// ==========================================

/// 趋势查询请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRequest {
    pub city: String,
    pub as_of_date: NaiveDate,
    pub market_segment: MarketSegment,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// 趋势曲线点（按 forecast_date 升序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub forecast_date: NaiveDate,
    pub days_out: i64,
    pub current_occupancy: f64,
    pub forecast_horizon: ForecastHorizon,
}

/// 提升节奏柱状点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupPoint {
    pub forecast_date: NaiveDate,
    pub market_segment: MarketSegment,
    pub weekly_pickup: f64,
}

/// 差异热力矩阵单元（细分市场 × 预测区间）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceCell {
    pub market_segment: MarketSegment,
    pub forecast_horizon: ForecastHorizon,
    pub avg_stly_variance: f64,
    pub sample_count: usize,
}

// ==========================================
// DashboardApi - 看板查询 API
// ==========================================
pub struct DashboardApi {
    repo: Arc<dyn ForecastRepository>,
}

impl DashboardApi {
    pub fn new(repo: Arc<dyn ForecastRepository>) -> Self {
        Self { repo }
    }

    pub fn from_db_path(db_path: &str) -> ApiResult<Self> {
        let repo = ForecastRepositoryImpl::new(db_path)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Self::new(Arc::new(repo)))
    }

    /// 入住率趋势曲线（单城市/单快照/单细分,按预测日期升序）
    pub async fn get_occupancy_trend(&self, request: TrendRequest) -> ApiResult<Vec<TrendPoint>> {
        if request.city.trim().is_empty() {
            return Err(ApiError::InvalidInput("城市不能为空".to_string()));
        }

        let query = ForecastQuery {
            city: Some(request.city),
            as_of_date: Some(request.as_of_date),
            market_segment: Some(request.market_segment),
            forecast_date_from: request.date_from,
            forecast_date_to: request.date_to,
        };

        let records = self
            .repo
            .query_records(&query)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| TrendPoint {
                forecast_date: r.forecast_date,
                days_out: r.days_out,
                current_occupancy: r.current_occupancy,
                forecast_horizon: r.forecast_horizon,
            })
            .collect())
    }

    /// 提升节奏（单城市/单快照,可选限定细分）
    pub async fn get_pickup_pace(
        &self,
        city: &str,
        as_of_date: NaiveDate,
        market_segment: Option<MarketSegment>,
    ) -> ApiResult<Vec<PickupPoint>> {
        if city.trim().is_empty() {
            return Err(ApiError::InvalidInput("城市不能为空".to_string()));
        }

        let query = ForecastQuery {
            city: Some(city.to_string()),
            as_of_date: Some(as_of_date),
            market_segment,
            ..Default::default()
        };

        let records = self
            .repo
            .query_records(&query)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| PickupPoint {
                forecast_date: r.forecast_date,
                market_segment: r.market_segment,
                weekly_pickup: r.weekly_pickup,
            })
            .collect())
    }

    /// 差异热力矩阵: 细分市场 × 预测区间 的 STLY 差异均值
    pub async fn get_variance_matrix(
        &self,
        city: &str,
        as_of_date: NaiveDate,
    ) -> ApiResult<Vec<VarianceCell>> {
        if city.trim().is_empty() {
            return Err(ApiError::InvalidInput("城市不能为空".to_string()));
        }

        let query = ForecastQuery {
            city: Some(city.to_string()),
            as_of_date: Some(as_of_date),
            ..Default::default()
        };

        let records = self
            .repo
            .query_records(&query)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if records.is_empty() {
            return Err(ApiError::NotFound(format!(
                "无该城市/快照的预测记录: {} @ {}",
                city, as_of_date
            )));
        }

        // (细分, 区间) → (差异和, 条数);BTreeMap 保证输出顺序稳定
        let mut cells: BTreeMap<(&'static str, &'static str), (f64, usize)> = BTreeMap::new();
        for record in &records {
            let key = (
                record.market_segment.as_str(),
                record.forecast_horizon.as_str(),
            );
            let entry = cells.entry(key).or_insert((0.0, 0));
            entry.0 += record.stly_variance;
            entry.1 += 1;
        }

        Ok(cells
            .into_iter()
            .map(|((segment, horizon), (sum, count))| VarianceCell {
                // 标签来自枚举自身,两次转换不会失败
                market_segment: MarketSegment::from_label(segment)
                    .unwrap_or(MarketSegment::Other),
                forecast_horizon: ForecastHorizon::from_label(horizon)
                    .unwrap_or(ForecastHorizon::LongTerm),
                avg_stly_variance: sum / count as f64,
                sample_count: count,
            })
            .collect())
    }

    /// 报表快照组合列表（城市 × 快照日期,按日期倒序）
    pub async fn list_report_snapshots(&self) -> ApiResult<Vec<ReportSnapshot>> {
        self.repo
            .list_report_snapshots()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// 记录总数
    pub async fn count_records(&self) -> ApiResult<i64> {
        self.repo
            .count_records()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }
}
