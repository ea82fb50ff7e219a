// ==========================================
// 酒店入住率预测看板 - ReportImporter 集成测试
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 导入管道
// 依据: Upload_Pipeline_Spec_v0.3.md - 上传状态机
// ==========================================


use occupancy_dashboard::config::ConfigManager;
use occupancy_dashboard::domain::types::{ForecastHorizon, MarketSegment, UploadStatus};
use occupancy_dashboard::importer::{
    ImportError, LogProgressReporter, PresetConfirmer, ReportImporter, ReportImporterImpl,
    UniversalFileParser,
};
use occupancy_dashboard::repository::{ForecastQuery, ForecastRepository, ForecastRepositoryImpl};
use chrono::NaiveDate;
use tempfile::TempDir;
use test_helpers::{create_test_db, data_row, forecast_csv, write_named_csv};

// ==========================================
// 辅助函数: 构造导入器
// ==========================================
fn build_importer(
    db_path: &str,
    config: ConfigManager,
    overwrite: bool,
) -> ReportImporterImpl<ForecastRepositoryImpl, ConfigManager> {
    let repo = ForecastRepositoryImpl::new(db_path).expect("创建Repository失败");
    ReportImporterImpl::new(
        repo,
        config,
        Box::new(UniversalFileParser),
        Box::new(PresetConfirmer::new(overwrite)),
        Box::new(LogProgressReporter),
    )
}

fn assertion_repo(db_path: &str) -> ForecastRepositoryImpl {
    ForecastRepositoryImpl::new(db_path).expect("创建Repository失败")
}

fn standard_csv() -> String {
    forecast_csv(
        "2024-12-10",
        "Edmonton",
        &[
            data_row("2024-12-20", 0.875, 12.0, 3.4),
            data_row("2025-01-02", 0.6, 2.0, -1.0),
            data_row("2024-12-09", 0.95, 0.0, 0.5),
        ],
    )
}

#[tokio::test]
async fn test_import_standard_csv_end_to_end() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &standard_csv());

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let outcome = importer.import_report(&file).await.unwrap();

    // 3 数据行 × 5 细分市场
    assert_eq!(outcome.status, UploadStatus::Completed);
    assert_eq!(outcome.batch.record_count, 15);
    assert_eq!(outcome.batch.uploaded_rows, 15);
    assert_eq!(outcome.batch.skipped_rows, 0);
    assert_eq!(outcome.batch.report_id, "Edmonton_2024_12_10");
    assert_eq!(outcome.batch.city, "Edmonton");
    assert!(outcome.violations.is_empty());

    let repo = assertion_repo(&db_path);
    assert_eq!(repo.count_records().await.unwrap(), 15);

    // Totals 细分按预测日期升序
    let query = ForecastQuery {
        city: Some("Edmonton".to_string()),
        market_segment: Some(MarketSegment::Totals),
        ..Default::default()
    };
    let records = repo.query_records(&query).await.unwrap();
    assert_eq!(records.len(), 3);

    // 2024-12-09: 快照日前一天 → Historical
    assert_eq!(records[0].days_out, -1);
    assert_eq!(records[0].forecast_horizon, ForecastHorizon::Historical);

    // 2024-12-20: 入住率 0.875 → 87.5 个百分点
    assert_eq!(records[1].current_occupancy, 87.5);
    assert_eq!(records[1].weekly_pickup, 12.0);
    assert_eq!(records[1].stly_variance, 3.4);
    assert_eq!(records[1].days_out, 10);

    // 2025-01-02: 距快照 23 天 → Near_Term
    assert_eq!(records[2].days_out, 23);
    assert_eq!(records[2].forecast_horizon, ForecastHorizon::NearTerm);
}

#[tokio::test]
async fn test_import_metadata_from_file_name_only() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    // 文件内容无标签行,元信息只能来自文件名
    let content = [
        "Amadeus Forecast Report,,,,,,,,,,,,,,,,,".to_string(),
        ",,Date,Current,Wkly Pickup,STLY Var,Current,Wkly Pickup,STLY Var,\
         Current,Wkly Pickup,STLY Var,Current,Wkly Pickup,STLY Var,\
         Current,Wkly Pickup,STLY Var"
            .to_string(),
        data_row("2024-12-20", 0.5, 1.0, 0.0),
    ]
    .join("\n");
    let file = write_named_csv(&dir, "Calgary_2024_12_10.csv", &content);

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let outcome = importer.import_report(&file).await.unwrap();

    assert_eq!(outcome.batch.city, "Calgary");
    assert_eq!(
        outcome.batch.as_of_date,
        NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
    );
    assert_eq!(outcome.batch.report_id, "Calgary_2024_12_10");
}

#[tokio::test]
async fn test_import_metadata_falls_back_to_content() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    // 文件名不符合 <City>_<YYYY>_<MM>_<DD> 约定 → 走头部标签兜底
    let file = write_named_csv(&dir, "export (1).csv", &standard_csv());

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let outcome = importer.import_report(&file).await.unwrap();

    assert_eq!(outcome.batch.city, "Edmonton");
    assert_eq!(
        outcome.batch.as_of_date,
        NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
    );
    assert_eq!(outcome.batch.report_id, "export (1)");
}

#[tokio::test]
async fn test_import_missing_metadata_is_fatal() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    let content = [
        "no labels here,,,,,,,,,,,,,,,,,".to_string(),
        data_row("2024-12-20", 0.5, 1.0, 0.0),
    ]
    .join("\n");
    let file = write_named_csv(&dir, "export.csv", &content);

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let result = importer.import_report(&file).await;

    assert!(matches!(result, Err(ImportError::MetadataError(_))));
    assert_eq!(assertion_repo(&db_path).count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_import_missing_header_is_layout_error() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    // 有标签行但无表头签名行
    let content = [
        "Amadeus Forecast Report,,,,,,,,,,,,,,,,,".to_string(),
        ",As of Date,2024-12-10,,,,,,,,,,,,,,,".to_string(),
        ",Comp Set,Edmonton,,,,,,,,,,,,,,,".to_string(),
        data_row("2024-12-20", 0.5, 1.0, 0.0),
    ]
    .join("\n");
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &content);

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let result = importer.import_report(&file).await;

    assert!(matches!(result, Err(ImportError::LayoutError(_))));
    assert_eq!(assertion_repo(&db_path).count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_import_skips_unparseable_date_rows() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    let content = forecast_csv(
        "2024-12-10",
        "Edmonton",
        &[
            data_row("2024-12-20", 0.875, 12.0, 3.4),
            data_row("TBD", 0.6, 2.0, -1.0), // 日期不可解析 → 跳过该行
            data_row("2024-12-22", 0.7, 1.0, 0.0),
        ],
    );
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &content);

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let outcome = importer.import_report(&file).await.unwrap();

    // 部分成功: 记录数按实际解析行计,跳过行单独上报
    assert_eq!(outcome.status, UploadStatus::Completed);
    assert_eq!(outcome.batch.record_count, 10);
    assert_eq!(outcome.batch.skipped_rows, 1);
    assert_eq!(outcome.skipped_row_samples.len(), 1);
    assert_eq!(assertion_repo(&db_path).count_records().await.unwrap(), 10);
}

#[tokio::test]
async fn test_import_duplicate_declined_is_cancelled() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &standard_csv());

    // 首次导入
    let importer = build_importer(&db_path, ConfigManager::default(), false);
    importer.import_report(&file).await.unwrap();

    // 二次导入,拒绝覆盖 → CANCELLED,零删除零写入
    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let outcome = importer.import_report(&file).await.unwrap();

    assert_eq!(outcome.status, UploadStatus::Cancelled);
    assert_eq!(outcome.batch.uploaded_rows, 0);

    let repo = assertion_repo(&db_path);
    assert_eq!(repo.count_records().await.unwrap(), 15);

    // 取消的尝试同样留审计记录
    let batches = repo.list_upload_batches(10).await.unwrap();
    assert_eq!(batches.len(), 2);
    assert!(batches
        .iter()
        .any(|b| b.status == UploadStatus::Cancelled && b.uploaded_rows == 0));
}

#[tokio::test]
async fn test_import_duplicate_approved_replaces_prior_rows() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &standard_csv());
    let importer = build_importer(&db_path, ConfigManager::default(), false);
    importer.import_report(&file).await.unwrap();
    assert_eq!(assertion_repo(&db_path).count_records().await.unwrap(), 15);

    // 同 report_id 的修订版（2 行）,批准覆盖 → 旧 15 条被替换为 10 条
    let revised = forecast_csv(
        "2024-12-10",
        "Edmonton",
        &[
            data_row("2024-12-20", 0.9, 10.0, 3.0),
            data_row("2024-12-21", 0.8, 5.0, 1.0),
        ],
    );
    let dir2 = TempDir::new().unwrap();
    let file2 = write_named_csv(&dir2, "Edmonton_2024_12_10.csv", &revised);

    let importer = build_importer(&db_path, ConfigManager::default(), true);
    let outcome = importer.import_report(&file2).await.unwrap();

    assert_eq!(outcome.status, UploadStatus::Completed);
    assert_eq!(outcome.batch.uploaded_rows, 10);

    let repo = assertion_repo(&db_path);
    assert_eq!(repo.count_records().await.unwrap(), 10);
    assert!(repo.report_exists("Edmonton_2024_12_10").await.unwrap());
}

#[tokio::test]
async fn test_import_validation_circuit_breaker() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    // 3 行全细分入住率越界 → 15 条违规 > 阈值 10 → 整批拒绝
    let content = forecast_csv(
        "2024-12-10",
        "Edmonton",
        &[
            data_row("2024-12-20", 1.35, 1.0, 0.0),
            data_row("2024-12-21", 1.42, 1.0, 0.0),
            data_row("2024-12-22", -0.2, 1.0, 0.0),
        ],
    );
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &content);

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let result = importer.import_report(&file).await;

    assert!(matches!(
        result,
        Err(ImportError::TooManyViolations {
            violations: 15,
            threshold: 10
        })
    ));
    assert_eq!(assertion_repo(&db_path).count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_import_sub_threshold_violations_are_warnings() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();

    // 2 行越界 = 10 条违规 = 阈值 → 放行并携带警告
    let content = forecast_csv(
        "2024-12-10",
        "Edmonton",
        &[
            data_row("2024-12-20", 1.35, 1.0, 0.0),
            data_row("2024-12-21", 1.42, 1.0, 0.0),
            data_row("2024-12-22", 0.8, 1.0, 0.0),
        ],
    );
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &content);

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let outcome = importer.import_report(&file).await.unwrap();

    assert_eq!(outcome.status, UploadStatus::Completed);
    assert_eq!(outcome.violations.len(), 10);
    assert_eq!(outcome.batch.warning_count, 10);
    // 越界行不过滤,整批照常写入
    assert_eq!(assertion_repo(&db_path).count_records().await.unwrap(), 15);
}

#[tokio::test]
async fn test_import_rejects_oversize_file() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.csv", &standard_csv());

    let config = ConfigManager {
        max_file_size_bytes: 16,
        ..Default::default()
    };
    let importer = build_importer(&db_path, config, false);
    let result = importer.import_report(&file).await;

    assert!(matches!(result, Err(ImportError::FileTooLarge { .. })));
}

#[tokio::test]
async fn test_import_rejects_unsupported_extension() {
    let (_db_guard, db_path) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let file = write_named_csv(&dir, "Edmonton_2024_12_10.txt", &standard_csv());

    let importer = build_importer(&db_path, ConfigManager::default(), false);
    let result = importer.import_report(&file).await;

    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}
