// ==========================================
// 酒店入住率预测看板 - 上传协调器行为测试
// ==========================================
// 依据: Upload_Pipeline_Spec_v0.3.md - 上传状态机
// 说明: 用记录型 Mock 仓储验证分批/进度/终止契约,
//       不依赖真实数据库
// ==========================================


use async_trait::async_trait;
use chrono::NaiveDate;
use occupancy_dashboard::config::ConfigManager;
use occupancy_dashboard::domain::forecast::{ForecastRecord, UploadBatch};
use occupancy_dashboard::domain::types::{UploadPhase, UploadStatus};
use occupancy_dashboard::importer::{
    ImportError, PresetConfirmer, ProgressReporter, ReportImporter, ReportImporterImpl,
    UniversalFileParser,
};
use occupancy_dashboard::repository::{ForecastQuery, ForecastRepository, ReportSnapshot};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use test_helpers::{data_rows_sequential, forecast_csv, write_named_csv};

// ==========================================
// MockRepository - 记录型仓储
// ==========================================
#[derive(Clone, Default)]
struct MockRepository {
    exists: bool,
    fail_on_insert_call: Option<usize>, // 第 N 次 insert 调用返回错误（1 起）
    calls: Arc<Mutex<Vec<String>>>,     // 调用顺序轨迹
    insert_sizes: Arc<Mutex<Vec<usize>>>,
    audit_batches: Arc<Mutex<Vec<UploadBatch>>>,
}

impl MockRepository {
    fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn inserted_total(&self) -> usize {
        self.insert_sizes.lock().unwrap().iter().sum()
    }
}

#[async_trait]
impl ForecastRepository for MockRepository {
    async fn report_exists(&self, _report_id: &str) -> Result<bool, Box<dyn Error>> {
        self.calls.lock().unwrap().push("exists".to_string());
        Ok(self.exists)
    }

    async fn delete_report(&self, _report_id: &str) -> Result<usize, Box<dyn Error>> {
        self.calls.lock().unwrap().push("delete".to_string());
        Ok(0)
    }

    async fn insert_records(&self, records: &[ForecastRecord]) -> Result<usize, Box<dyn Error>> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push("insert".to_string());
            calls.iter().filter(|c| c.as_str() == "insert").count()
        };

        if self.fail_on_insert_call == Some(call_no) {
            return Err("后端批次写入被拒".to_string().into());
        }

        self.insert_sizes.lock().unwrap().push(records.len());
        Ok(records.len())
    }

    async fn insert_upload_batch(&self, batch: &UploadBatch) -> Result<(), Box<dyn Error>> {
        self.audit_batches.lock().unwrap().push(batch.clone());
        Ok(())
    }

    async fn list_upload_batches(&self, _limit: usize) -> Result<Vec<UploadBatch>, Box<dyn Error>> {
        Ok(self.audit_batches.lock().unwrap().clone())
    }

    async fn query_records(
        &self,
        _query: &ForecastQuery,
    ) -> Result<Vec<ForecastRecord>, Box<dyn Error>> {
        Ok(Vec::new())
    }

    async fn list_report_snapshots(&self) -> Result<Vec<ReportSnapshot>, Box<dyn Error>> {
        Ok(Vec::new())
    }

    async fn count_records(&self) -> Result<i64, Box<dyn Error>> {
        Ok(self.inserted_total() as i64)
    }
}

// ==========================================
// RecordingProgress - 记录型进度上报
// ==========================================
#[derive(Clone, Default)]
struct RecordingProgress {
    phases: Arc<Mutex<Vec<UploadPhase>>>,
    updates: Arc<Mutex<Vec<(usize, usize, f64)>>>,
}

impl ProgressReporter for RecordingProgress {
    fn on_phase(&self, phase: UploadPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_progress(&self, sent: usize, total: usize, fraction: f64) {
        self.updates.lock().unwrap().push((sent, total, fraction));
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 500 数据行（× 5 细分 = 2500 条记录）的标准报表文件
fn large_report_file(dir: &TempDir) -> std::path::PathBuf {
    let start = NaiveDate::from_ymd_opt(2024, 12, 11).unwrap();
    let content = forecast_csv("2024-12-10", "Edmonton", &data_rows_sequential(start, 500));
    write_named_csv(dir, "Edmonton_2024_12_10.csv", &content)
}

fn build_importer(
    repo: MockRepository,
    overwrite: bool,
    progress: RecordingProgress,
) -> ReportImporterImpl<MockRepository, ConfigManager> {
    ReportImporterImpl::new(
        repo,
        ConfigManager::default(),
        Box::new(UniversalFileParser),
        Box::new(PresetConfirmer::new(overwrite)),
        Box::new(progress),
    )
}

#[tokio::test]
async fn test_batched_upload_issues_three_sequential_inserts() {
    let dir = TempDir::new().unwrap();
    let file = large_report_file(&dir);

    let repo = MockRepository::default();
    let progress = RecordingProgress::default();
    let importer = build_importer(repo.clone(), false, progress.clone());

    let outcome = importer.import_report(&file).await.unwrap();

    assert!(outcome.is_completed());
    assert_eq!(outcome.status, UploadStatus::Completed);
    assert_eq!(outcome.batch.record_count, 2500);
    assert_eq!(outcome.batch.uploaded_rows, 2500);

    // 2500 条 / 批大小 1000 → 恰好 3 次顺序写入
    assert_eq!(
        *repo.insert_sizes.lock().unwrap(),
        vec![1000, 1000, 500]
    );

    // 每批之后上报一次进度: 40% / 80% / 100%
    let updates = progress.updates.lock().unwrap().clone();
    assert_eq!(
        updates,
        vec![
            (1000, 2500, 0.4),
            (2000, 2500, 0.8),
            (2500, 2500, 1.0)
        ]
    );
}

#[tokio::test]
async fn test_probe_is_observed_before_any_mutation() {
    let dir = TempDir::new().unwrap();
    let file = large_report_file(&dir);

    let repo = MockRepository {
        exists: true,
        ..Default::default()
    };
    let importer = build_importer(repo.clone(), true, RecordingProgress::default());

    importer.import_report(&file).await.unwrap();

    // exists 先于 delete,delete 先于一切 insert
    let calls = repo.call_log();
    let exists_pos = calls.iter().position(|c| c == "exists").unwrap();
    let delete_pos = calls.iter().position(|c| c == "delete").unwrap();
    let first_insert = calls.iter().position(|c| c == "insert").unwrap();
    assert!(exists_pos < delete_pos);
    assert!(delete_pos < first_insert);
}

#[tokio::test]
async fn test_declined_overwrite_makes_zero_backend_mutations() {
    let dir = TempDir::new().unwrap();
    let file = large_report_file(&dir);

    let repo = MockRepository {
        exists: true,
        ..Default::default()
    };
    let progress = RecordingProgress::default();
    let importer = build_importer(repo.clone(), false, progress.clone());

    let outcome = importer.import_report(&file).await.unwrap();

    assert_eq!(outcome.status, UploadStatus::Cancelled);
    assert_eq!(outcome.batch.uploaded_rows, 0);

    // 仅发生过存在性探测,零删除零写入
    assert_eq!(repo.call_log(), vec!["exists".to_string()]);

    // 状态机停在覆盖确认结点,未进入 Deleting / Uploading
    let phases = progress.phases.lock().unwrap().clone();
    assert!(phases.contains(&UploadPhase::AwaitingOverwriteConfirmation));
    assert!(!phases.contains(&UploadPhase::Deleting));
    assert!(!phases.contains(&UploadPhase::Uploading));
}

#[tokio::test]
async fn test_first_batch_failure_aborts_without_rollback() {
    let dir = TempDir::new().unwrap();
    let file = large_report_file(&dir);

    let repo = MockRepository {
        fail_on_insert_call: Some(2),
        ..Default::default()
    };
    let progress = RecordingProgress::default();
    let importer = build_importer(repo.clone(), false, progress.clone());

    let result = importer.import_report(&file).await;

    // 第 2 批失败 → 终止,已写入的第 1 批保持已提交,成功条数随错误返回
    match result {
        Err(ImportError::UploadError {
            uploaded,
            total,
            message,
        }) => {
            assert_eq!(uploaded, 1000);
            assert_eq!(total, 2500);
            assert!(message.contains("批次写入被拒"));
        }
        other => panic!("期望 UploadError,实际: {:?}", other.map(|o| o.status)),
    }

    assert_eq!(repo.inserted_total(), 1000);
    // 失败后不再发起第 3 批
    assert_eq!(
        repo.call_log()
            .iter()
            .filter(|c| c.as_str() == "insert")
            .count(),
        2
    );

    // 失败的尝试同样落审计
    let audits = repo.audit_batches.lock().unwrap().clone();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].status, UploadStatus::Failed);
    assert_eq!(audits[0].uploaded_rows, 1000);

    let phases = progress.phases.lock().unwrap().clone();
    assert_eq!(phases.last(), Some(&UploadPhase::Failed));
}

#[tokio::test]
async fn test_multi_file_import_isolates_failures() {
    let dir = TempDir::new().unwrap();
    let good = write_named_csv(
        &dir,
        "Edmonton_2024_12_10.csv",
        &forecast_csv(
            "2024-12-10",
            "Edmonton",
            &data_rows_sequential(NaiveDate::from_ymd_opt(2024, 12, 11).unwrap(), 3),
        ),
    );
    // 表头签名缺失 → 布局错误
    let bad = write_named_csv(&dir, "Calgary_2024_12_10.csv", "junk,,,\n,,x,y,z");

    let repo = MockRepository::default();
    let importer = build_importer(repo.clone(), false, RecordingProgress::default());

    let results = importer.import_reports(vec![bad, good]).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_err());
    assert!(results[1].1.is_ok());
    // 坏文件不影响好文件: 3 行 × 5 = 15 条照常写入
    assert_eq!(repo.inserted_total(), 15);
}
