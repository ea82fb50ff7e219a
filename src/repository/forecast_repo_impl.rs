// ==========================================
// 酒店入住率预测看板 - 预测数据 Repository 实现
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART D 工程结构
// 职责: 实现预测数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则,只做数据 CRUD
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::forecast::{ForecastRecord, UploadBatch};
use crate::domain::types::{ForecastHorizon, MarketSegment, UploadStatus};
use crate::repository::forecast_repo::{ForecastQuery, ForecastRepository, ReportSnapshot};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// SELECT 列清单（与 row_to_record 的列序一一对应）
const RECORD_COLUMNS: &str = "as_of_date, report_id, city, forecast_date, market_segment, \
     current_occupancy, weekly_pickup, stly_variance, days_out, forecast_horizon";

fn parse_upload_status(raw: &str) -> UploadStatus {
    match raw.trim() {
        "COMPLETED" => UploadStatus::Completed,
        "CANCELLED" => UploadStatus::Cancelled,
        _ => UploadStatus::Failed,
    }
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ForecastRecord> {
    let segment_label: String = row.get(4)?;
    let horizon_label: String = row.get(9)?;

    Ok(ForecastRecord {
        as_of_date: row.get(0)?,
        report_id: row.get(1)?,
        city: row.get(2)?,
        forecast_date: row.get(3)?,
        market_segment: MarketSegment::from_label(&segment_label)
            .ok_or_else(|| conversion_error(4, format!("未知细分市场: {}", segment_label)))?,
        current_occupancy: row.get(5)?,
        weekly_pickup: row.get(6)?,
        stly_variance: row.get(7)?,
        days_out: row.get(8)?,
        forecast_horizon: ForecastHorizon::from_label(&horizon_label)
            .ok_or_else(|| conversion_error(9, format!("未知预测区间: {}", horizon_label)))?,
    })
}

// ==========================================
// ForecastRepositoryImpl
// ==========================================
pub struct ForecastRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ForecastRepositoryImpl {
    /// 创建新的 Repository 实例（打开连接并初始化 schema）
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 复用既有连接（应用层共享一条连接时使用）
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| e.to_string())?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Box<dyn Error>> {
        self.conn.lock().map_err(|e| e.to_string().into())
    }
}

#[async_trait]
impl ForecastRepository for ForecastRepositoryImpl {
    async fn report_exists(&self, report_id: &str) -> Result<bool, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM forecast_report WHERE report_id = ?1 LIMIT 1",
                params![report_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn delete_report(&self, report_id: &str) -> Result<usize, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM forecast_report WHERE report_id = ?1",
            params![report_id],
        )?;
        Ok(deleted)
    }

    async fn insert_records(&self, records: &[ForecastRecord]) -> Result<usize, Box<dyn Error>> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO forecast_report (
                    as_of_date, report_id, city, forecast_date, market_segment,
                    current_occupancy, weekly_pickup, stly_variance, days_out, forecast_horizon
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )?;

            for record in records {
                stmt.execute(params![
                    record.as_of_date,
                    record.report_id,
                    record.city,
                    record.forecast_date,
                    record.market_segment.as_str(),
                    record.current_occupancy,
                    record.weekly_pickup,
                    record.stly_variance,
                    record.days_out,
                    record.forecast_horizon.as_str(),
                ])?;
                count += 1;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    async fn insert_upload_batch(&self, batch: &UploadBatch) -> Result<(), Box<dyn Error>> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO upload_batch (
                batch_id, report_id, file_name, city, as_of_date,
                total_rows, record_count, uploaded_rows, skipped_rows,
                warning_count, status, imported_at, elapsed_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                batch.batch_id,
                batch.report_id,
                batch.file_name,
                batch.city,
                batch.as_of_date,
                batch.total_rows,
                batch.record_count,
                batch.uploaded_rows,
                batch.skipped_rows,
                batch.warning_count,
                batch.status.to_string(),
                batch.imported_at,
                batch.elapsed_ms,
            ],
        )?;
        Ok(())
    }

    async fn list_upload_batches(&self, limit: usize) -> Result<Vec<UploadBatch>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, report_id, file_name, city, as_of_date,
                   total_rows, record_count, uploaded_rows, skipped_rows,
                   warning_count, status, imported_at, elapsed_ms
            FROM upload_batch
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;

        let batches = stmt
            .query_map(params![limit as i64], |row| {
                let status_raw: String = row.get(10)?;
                Ok(UploadBatch {
                    batch_id: row.get(0)?,
                    report_id: row.get(1)?,
                    file_name: row.get(2)?,
                    city: row.get(3)?,
                    as_of_date: row.get(4)?,
                    total_rows: row.get(5)?,
                    record_count: row.get(6)?,
                    uploaded_rows: row.get(7)?,
                    skipped_rows: row.get(8)?,
                    warning_count: row.get(9)?,
                    status: parse_upload_status(&status_raw),
                    imported_at: row.get(11)?,
                    elapsed_ms: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(batches)
    }

    async fn query_records(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<ForecastRecord>, Box<dyn Error>> {
        let conn = self.lock_conn()?;

        let segment_label = query.market_segment.map(|s| s.as_str().to_string());
        let mut clauses: Vec<&str> = Vec::new();
        let mut bind_params: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref city) = query.city {
            clauses.push("city = ?");
            bind_params.push(city);
        }
        if let Some(ref as_of) = query.as_of_date {
            clauses.push("as_of_date = ?");
            bind_params.push(as_of);
        }
        if let Some(ref label) = segment_label {
            clauses.push("market_segment = ?");
            bind_params.push(label);
        }
        if let Some(ref from) = query.forecast_date_from {
            clauses.push("forecast_date >= ?");
            bind_params.push(from);
        }
        if let Some(ref to) = query.forecast_date_to {
            clauses.push("forecast_date <= ?");
            bind_params.push(to);
        }

        let mut sql = format!("SELECT {} FROM forecast_report", RECORD_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY forecast_date ASC");

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(bind_params), row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    async fn list_report_snapshots(&self) -> Result<Vec<ReportSnapshot>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT city, as_of_date, report_id, COUNT(*) AS record_count
            FROM forecast_report
            GROUP BY city, as_of_date, report_id
            ORDER BY as_of_date DESC, city ASC
            "#,
        )?;

        let snapshots = stmt
            .query_map([], |row| {
                Ok(ReportSnapshot {
                    city: row.get(0)?,
                    as_of_date: row.get(1)?,
                    report_id: row.get(2)?,
                    record_count: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(snapshots)
    }

    async fn count_records(&self) -> Result<i64, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM forecast_report", [], |row| row.get(0))?;
        Ok(count)
    }
}
