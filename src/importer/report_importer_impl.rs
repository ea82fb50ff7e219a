// ==========================================
// 酒店入住率预测看板 - 报表导入器实现
// ==========================================
// 依据: Upload_Pipeline_Spec_v0.3.md - 上传状态机
// 依据: Field_Mapping_Amadeus_v0.2.md - 字段映射规范
// ==========================================
// 职责: 整合导入流程,从文件到后端
// 流程: 门禁 → 解析 → 元信息 → 表头定位 → 转换 → 校验
//       → 去重探测 → 覆盖确认 → 删除旧表 → 分批写入
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::forecast::{DqViolation, ImportOutcome, ReportMetadata, UploadBatch};
use crate::domain::types::{UploadPhase, UploadStatus};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportError;
use crate::importer::file_parser::check_file_gate;
use crate::importer::header_locator::HeaderLocator;
use crate::importer::metadata_extractor::MetadataExtractor;
use crate::importer::report_importer_trait::{
    FileParser, OverwriteConfirmer, ProgressReporter, ReportImporter,
};
use crate::importer::row_transformer::{RowTransformer, TransformOutcome};
use crate::repository::ForecastRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PresetConfirmer - 预设覆盖决策
// ==========================================
// 用途: 非交互调用方（CLI / 批处理）把覆盖决策前置为参数
pub struct PresetConfirmer {
    decision: bool,
}

impl PresetConfirmer {
    pub fn new(decision: bool) -> Self {
        Self { decision }
    }
}

#[async_trait]
impl OverwriteConfirmer for PresetConfirmer {
    async fn confirm_overwrite(
        &self,
        report_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        info!(report_id = %report_id, decision = self.decision, "预设覆盖决策生效");
        Ok(self.decision)
    }
}

// ==========================================
// LogProgressReporter - 日志进度上报
// ==========================================
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn on_phase(&self, phase: UploadPhase) {
        debug!(phase = %phase, "上传阶段切换");
    }

    fn on_progress(&self, sent: usize, total: usize, fraction: f64) {
        info!(sent, total, progress = %format!("{:.0}%", fraction * 100.0), "分批写入进度");
    }
}

// ==========================================
// ReportImporterImpl - 报表导入器实现
// ==========================================
pub struct ReportImporterImpl<R, C>
where
    R: ForecastRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    forecast_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,

    // 覆盖决策回调（决策权在调用方）
    confirmer: Box<dyn OverwriteConfirmer>,

    // 进度上报
    progress: Box<dyn ProgressReporter>,
}

impl<R, C> ReportImporterImpl<R, C>
where
    R: ForecastRepository,
    C: ImportConfigReader,
{
    /// 创建新的 ReportImporter 实例
    ///
    /// # 参数
    /// - forecast_repo: 预测数据仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - confirmer: 覆盖确认回调
    /// - progress: 进度上报
    pub fn new(
        forecast_repo: R,
        config: C,
        file_parser: Box<dyn FileParser>,
        confirmer: Box<dyn OverwriteConfirmer>,
        progress: Box<dyn ProgressReporter>,
    ) -> Self {
        Self {
            forecast_repo,
            config,
            file_parser,
            confirmer,
            progress,
        }
    }
}

#[async_trait]
impl<R, C> ReportImporter for ReportImporterImpl<R, C>
where
    R: ForecastRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path))]
    async fn import_report(&self, file_path: &Path) -> Result<ImportOutcome, ImportError> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!(batch_id = %batch_id, file = %file_name, "开始导入预测报表");
        self.progress.on_phase(UploadPhase::Idle);

        // === 步骤 1: 文件门禁 ===
        debug!("步骤 1: 文件门禁");
        let max_size = self
            .config
            .get_max_file_size_bytes()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;
        check_file_gate(file_path, max_size)?;

        // === 步骤 2: 解析文件 ===
        debug!("步骤 2: 解析文件");
        let grid = self.file_parser.parse_to_grid(file_path)?;
        info!(rows = grid.len(), "文件解析完成");

        // === 步骤 3: 元信息提取 ===
        debug!("步骤 3: 元信息提取");
        let scan_rows = self
            .config
            .get_metadata_scan_rows()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;
        let metadata = MetadataExtractor::new(scan_rows).extract(&grid, &file_name)?;
        info!(report_id = %metadata.report_id, city = %metadata.city, as_of = %metadata.as_of_date, "元信息提取完成");

        // === 步骤 4: 表头定位 ===
        debug!("步骤 4: 表头定位");
        let body_start = HeaderLocator.locate_body_start(&grid)?;
        info!(body_start, "表头定位完成");

        // === 步骤 5: 行转换 ===
        debug!("步骤 5: 行转换");
        let transform = RowTransformer.transform(&grid, body_start, &metadata);
        info!(
            records = transform.records.len(),
            skipped = transform.skipped_rows,
            "行转换完成"
        );

        // === 步骤 6: DQ 校验 ===
        debug!("步骤 6: DQ 校验");
        let violations = self.validate_records(&transform).await?;
        info!(warnings = violations.len(), "DQ 校验通过");

        // === 步骤 7: 去重探测与覆盖确认 ===
        debug!("步骤 7: 去重探测");
        self.progress.on_phase(UploadPhase::CheckingDuplicate);
        let exists = self
            .forecast_repo
            .report_exists(&metadata.report_id)
            .await
            .map_err(|e| ImportError::DatabaseError(e.to_string()))?;

        if exists {
            self.progress
                .on_phase(UploadPhase::AwaitingOverwriteConfirmation);
            let approved = self
                .confirmer
                .confirm_overwrite(&metadata.report_id)
                .await
                .map_err(|e| ImportError::InternalError(format!("覆盖确认回调失败: {}", e)))?;

            if !approved {
                // 用户拒绝覆盖: 零写入,以 CANCELLED 终止（非错误）
                info!(report_id = %metadata.report_id, "用户拒绝覆盖,上传取消");
                return self
                    .finalize(
                        batch_id,
                        &metadata,
                        &transform,
                        violations,
                        0,
                        UploadStatus::Cancelled,
                        start_time,
                    )
                    .await;
            }

            self.progress.on_phase(UploadPhase::Deleting);
            let deleted = self
                .forecast_repo
                .delete_report(&metadata.report_id)
                .await
                .map_err(|e| ImportError::UploadError {
                    uploaded: 0,
                    total: transform.records.len(),
                    message: format!("删除旧报表失败: {}", e),
                })?;
            info!(report_id = %metadata.report_id, deleted, "旧报表已删除");
        }

        // === 步骤 8: 分批顺序写入 ===
        debug!("步骤 8: 分批写入");
        self.progress.on_phase(UploadPhase::Uploading);
        let batch_size = self
            .config
            .get_insert_batch_size()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?
            .max(1);

        let total = transform.records.len();
        let mut uploaded = 0usize;

        for chunk in transform.records.chunks(batch_size) {
            // 错误立即降为 String,避免跨 await 持有非 Send 的错误对象
            let insert_result = self
                .forecast_repo
                .insert_records(chunk)
                .await
                .map_err(|e| e.to_string());

            match insert_result {
                Ok(count) => {
                    uploaded += count;
                    let fraction = uploaded as f64 / total as f64;
                    self.progress.on_progress(uploaded, total, fraction);
                    debug!(uploaded, total, "批次写入成功");
                }
                Err(message) => {
                    // 首个失败批次即终止;已写入批次不回滚,成功条数随错误返回
                    self.progress.on_phase(UploadPhase::Failed);
                    error!(uploaded, total, error = %message, "批次写入失败,终止上传");
                    let audit = self.build_batch(
                        &batch_id,
                        &metadata,
                        &transform,
                        violations.len(),
                        uploaded,
                        UploadStatus::Failed,
                        start_time,
                    );
                    let audit_result = self
                        .forecast_repo
                        .insert_upload_batch(&audit)
                        .await
                        .map_err(|e| e.to_string());
                    if let Err(audit_err) = audit_result {
                        warn!(error = %audit_err, "失败批次审计写入失败");
                    }
                    return Err(ImportError::UploadError {
                        uploaded,
                        total,
                        message,
                    });
                }
            }
        }

        self.progress.on_phase(UploadPhase::Done);

        // === 步骤 9: 审计落库与结果构造 ===
        self.finalize(
            batch_id,
            &metadata,
            &transform,
            violations,
            uploaded,
            UploadStatus::Completed,
            start_time,
        )
        .await
    }

    async fn import_reports(
        &self,
        file_paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, Result<ImportOutcome, String>)> {
        info!(count = file_paths.len(), "开始批量导入报表");

        // 逐文件严格串行: 同一后端表不做并发写入,
        // 单个文件的失败不影响其余文件
        let mut results = Vec::with_capacity(file_paths.len());
        for path in file_paths {
            let result = self
                .import_report(&path)
                .await
                .map_err(|e| e.to_string());

            match &result {
                Ok(outcome) => info!(
                    file = %path.display(),
                    status = %outcome.status,
                    uploaded = outcome.batch.uploaded_rows,
                    "文件导入结束"
                ),
                Err(e) => error!(file = %path.display(), error = %e, "文件导入失败"),
            }
            results.push((path, result));
        }

        info!(
            total = results.len(),
            success = results.iter().filter(|(_, r)| r.is_ok()).count(),
            failed = results.iter().filter(|(_, r)| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}

// 辅助方法
impl<R, C> ReportImporterImpl<R, C>
where
    R: ForecastRepository,
    C: ImportConfigReader,
{
    /// DQ 校验（配置驱动）
    async fn validate_records(
        &self,
        transform: &TransformOutcome,
    ) -> Result<Vec<DqViolation>, ImportError> {
        let required_fields = self
            .config
            .get_required_fields()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;
        let valid_segments = self
            .config
            .get_valid_market_segments()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;
        let reject_threshold = self
            .config
            .get_violation_reject_threshold()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;
        let sample_size = self
            .config
            .get_dq_sample_size()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;

        let validator = DqValidator::new(
            required_fields,
            valid_segments,
            reject_threshold,
            sample_size,
        );
        validator.validate(&transform.records)
    }

    /// 构造批次审计记录
    #[allow(clippy::too_many_arguments)]
    fn build_batch(
        &self,
        batch_id: &str,
        metadata: &ReportMetadata,
        transform: &TransformOutcome,
        warning_count: usize,
        uploaded: usize,
        status: UploadStatus,
        start_time: Instant,
    ) -> UploadBatch {
        UploadBatch {
            batch_id: batch_id.to_string(),
            report_id: metadata.report_id.clone(),
            file_name: metadata.file_name.clone(),
            city: metadata.city.clone(),
            as_of_date: metadata.as_of_date,
            total_rows: transform.body_rows as i64,
            record_count: transform.records.len() as i64,
            uploaded_rows: uploaded as i64,
            skipped_rows: transform.skipped_rows as i64,
            warning_count: warning_count as i64,
            status,
            imported_at: Utc::now(),
            elapsed_ms: start_time.elapsed().as_millis() as i64,
        }
    }

    /// 审计落库并构造最终结果
    #[allow(clippy::too_many_arguments)]
    async fn finalize(
        &self,
        batch_id: String,
        metadata: &ReportMetadata,
        transform: &TransformOutcome,
        violations: Vec<DqViolation>,
        uploaded: usize,
        status: UploadStatus,
        start_time: Instant,
    ) -> Result<ImportOutcome, ImportError> {
        let batch = self.build_batch(
            &batch_id,
            metadata,
            transform,
            violations.len(),
            uploaded,
            status,
            start_time,
        );

        self.forecast_repo
            .insert_upload_batch(&batch)
            .await
            .map_err(|e| ImportError::DatabaseError(format!("批次审计写入失败: {}", e)))?;

        let sample_cap = self
            .config
            .get_skipped_row_sample_cap()
            .await
            .map_err(|e| ImportError::ConfigError(e.to_string()))?;
        let skipped_row_samples: Vec<usize> = transform
            .skipped_row_indices
            .iter()
            .take(sample_cap)
            .copied()
            .collect();

        if !skipped_row_samples.is_empty() {
            warn!(
                skipped = transform.skipped_rows,
                samples = ?skipped_row_samples,
                "部分数据行被跳过"
            );
        }

        info!(
            batch_id = %batch.batch_id,
            status = %status,
            total = batch.record_count,
            uploaded = batch.uploaded_rows,
            elapsed_ms = batch.elapsed_ms,
            "预测报表导入结束"
        );

        Ok(ImportOutcome {
            batch,
            status,
            violations,
            skipped_row_samples,
        })
    }
}
