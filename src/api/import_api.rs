// ==========================================
// 酒店入住率预测看板 - 报表导入API
// ==========================================
// 职责: 封装报表导入相关功能,供前端/CLI 调用
// 依据: Upload_Pipeline_Spec_v0.3.md - 上传管道
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::forecast::{DqViolation, UploadBatch};
use crate::domain::types::UploadStatus;
use crate::importer::{
    LogProgressReporter, OverwriteConfirmer, PresetConfirmer, ProgressReporter, ReportImporter,
    ReportImporterImpl, UniversalFileParser,
};
use crate::repository::{ForecastRepository, ForecastRepositoryImpl};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 批次终态（COMPLETED / CANCELLED）
    pub status: UploadStatus,
    /// 报表 ID
    pub report_id: String,
    /// 批次 ID（审计追溯用）
    pub batch_id: String,
    /// 转换产出记录数
    pub total_records: i64,
    /// 实际写入记录数
    pub uploaded: i64,
    /// 跳过行数
    pub skipped_rows: i64,
    /// DQ 警告明细（用于前端生成摘要/定位问题）
    pub violations: Vec<DqViolation>,
    /// 被跳过行号样本（封顶）
    pub skipped_row_samples: Vec<usize>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 多文件导入的单文件结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileImportResult {
    /// 源文件路径
    pub file: String,
    /// 是否成功（CANCELLED 也算成功结束,只是零写入）
    pub success: bool,
    /// 失败时的用户可读消息
    pub message: Option<String>,
    /// 成功时的导入响应
    pub response: Option<ImportApiResponse>,
}

// ==========================================
// ImportApi - 报表导入 API
// ==========================================
pub struct ImportApi {
    db_path: String,
    config: ConfigManager,
}

impl ImportApi {
    /// 创建导入API实例（默认配置）
    pub fn new(db_path: &str) -> Self {
        Self {
            db_path: db_path.to_string(),
            config: ConfigManager::default(),
        }
    }

    /// 创建导入API实例（自定义配置）
    pub fn with_config(db_path: &str, config: ConfigManager) -> Self {
        Self {
            db_path: db_path.to_string(),
            config,
        }
    }

    /// 导入单个报表文件（覆盖决策前置为参数）
    ///
    /// # 参数
    /// - file_path: 报表文件路径
    /// - overwrite: 同 report_id 已存在时是否覆盖
    pub async fn import_report(
        &self,
        file_path: &Path,
        overwrite: bool,
    ) -> ApiResult<ImportApiResponse> {
        self.import_report_with_callbacks(
            file_path,
            Box::new(PresetConfirmer::new(overwrite)),
            Box::new(LogProgressReporter),
        )
        .await
    }

    /// 导入单个报表文件（注入覆盖确认与进度回调,交互式前端使用）
    pub async fn import_report_with_callbacks(
        &self,
        file_path: &Path,
        confirmer: Box<dyn OverwriteConfirmer>,
        progress: Box<dyn ProgressReporter>,
    ) -> ApiResult<ImportApiResponse> {
        let importer = self.build_importer(confirmer, progress)?;
        let outcome = importer.import_report(file_path).await?;

        Ok(ImportApiResponse {
            status: outcome.status,
            report_id: outcome.batch.report_id.clone(),
            batch_id: outcome.batch.batch_id.clone(),
            total_records: outcome.batch.record_count,
            uploaded: outcome.batch.uploaded_rows,
            skipped_rows: outcome.batch.skipped_rows,
            violations: outcome.violations,
            skipped_row_samples: outcome.skipped_row_samples,
            elapsed_ms: outcome.batch.elapsed_ms,
        })
    }

    /// 批量导入多个报表文件（逐个顺序执行,单文件失败不中断）
    pub async fn import_reports(
        &self,
        file_paths: Vec<PathBuf>,
        overwrite: bool,
    ) -> ApiResult<Vec<FileImportResult>> {
        let importer = self.build_importer(
            Box::new(PresetConfirmer::new(overwrite)),
            Box::new(LogProgressReporter),
        )?;

        let results = importer.import_reports(file_paths).await;

        Ok(results
            .into_iter()
            .map(|(path, result)| match result {
                Ok(outcome) => FileImportResult {
                    file: path.display().to_string(),
                    success: true,
                    message: None,
                    response: Some(ImportApiResponse {
                        status: outcome.status,
                        report_id: outcome.batch.report_id.clone(),
                        batch_id: outcome.batch.batch_id.clone(),
                        total_records: outcome.batch.record_count,
                        uploaded: outcome.batch.uploaded_rows,
                        skipped_rows: outcome.batch.skipped_rows,
                        violations: outcome.violations,
                        skipped_row_samples: outcome.skipped_row_samples,
                        elapsed_ms: outcome.batch.elapsed_ms,
                    }),
                },
                Err(message) => FileImportResult {
                    file: path.display().to_string(),
                    success: false,
                    message: Some(message),
                    response: None,
                },
            })
            .collect())
    }

    /// 按时间倒序列出最近的上传批次审计记录
    pub async fn list_upload_batches(&self, limit: usize) -> ApiResult<Vec<UploadBatch>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        let repo = self.open_repo()?;
        repo.list_upload_batches(limit)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    fn open_repo(&self) -> ApiResult<ForecastRepositoryImpl> {
        ForecastRepositoryImpl::new(&self.db_path)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    fn build_importer(
        &self,
        confirmer: Box<dyn OverwriteConfirmer>,
        progress: Box<dyn ProgressReporter>,
    ) -> ApiResult<ReportImporterImpl<ForecastRepositoryImpl, ConfigManager>> {
        let repo = self.open_repo()?;
        Ok(ReportImporterImpl::new(
            repo,
            self.config.clone(),
            Box::new(UniversalFileParser),
            confirmer,
            progress,
        ))
    }
}
