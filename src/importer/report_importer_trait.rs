// ==========================================
// 酒店入住率预测看板 - 报表导入 Trait
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART D 工程结构
// 依据: Upload_Pipeline_Spec_v0.3.md - 上传管道
// 职责: 定义报表导入接口（不包含实现）
// ==========================================

use crate::domain::forecast::{ImportOutcome, RawGrid};
use crate::domain::types::UploadPhase;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use std::error::Error;
use std::path::{Path, PathBuf};

// ==========================================
// ReportImporter Trait
// ==========================================
// 用途: 报表导入主接口
// 实现者: ReportImporterImpl
#[async_trait]
pub trait ReportImporter: Send + Sync {
    /// 导入单个预测报表文件
    ///
    /// # 参数
    /// - file_path: 报表文件路径（.xlsx / .xls / .csv）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入结果（含批次审计、终态、警告明细）
    ///   用户拒绝覆盖 → Ok 且 status = CANCELLED
    /// - Err(ImportError): 文件门禁 / 布局 / 元信息 / 校验 / 上传错误
    ///
    /// # 导入流程（7 个阶段）
    /// 1. 文件门禁（扩展名 + 大小上限）
    /// 2. 解析为原始网格
    /// 3. 元信息提取（文件名 + 头部标签兜底）
    /// 4. 表头定位
    /// 5. 行转换（每行 × 5 细分市场）
    /// 6. DQ 校验（熔断裁决）
    /// 7. 去重探测 → 覆盖确认 → 删除旧报表 → 分批顺序写入
    async fn import_report(&self, file_path: &Path) -> Result<ImportOutcome, ImportError>;

    /// 批量导入多个报表文件（逐个顺序执行）
    ///
    /// # 说明
    /// - 单个文件失败不影响其余文件,各文件独立返回成败与条数
    /// - 文件之间严格串行: 同一后端表不做并发写入
    async fn import_reports(
        &self,
        file_paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, Result<ImportOutcome, String>)>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 2）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始二维网格
    ///
    /// # 返回
    /// - Ok(RawGrid): 逐行逐列的原始单元格,不做业务解释
    /// - Err(ImportError): 文件读取 / 格式错误
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid>;
}

// ==========================================
// OverwriteConfirmer Trait
// ==========================================
// 用途: 同 report_id 报表已存在时的覆盖决策回调
// 红线: 决策在调用方（人）,核心层绝不自行拍板
#[async_trait]
pub trait OverwriteConfirmer: Send + Sync {
    /// 征询是否覆盖已存在的报表
    ///
    /// # 返回
    /// - Ok(true): 覆盖（先删旧 report_id 全部行,再写入）
    /// - Ok(false): 拒绝 → 本次上传以 CANCELLED 终止,零写入
    async fn confirm_overwrite(&self, report_id: &str) -> Result<bool, Box<dyn Error>>;
}

// ==========================================
// ProgressReporter Trait
// ==========================================
// 用途: 上传阶段与分批进度上报（UI 进度条数据源）
pub trait ProgressReporter: Send + Sync {
    /// 阶段切换（上传状态机结点）
    fn on_phase(&self, phase: UploadPhase);

    /// 分批进度: 每个批次写入成功后上报一次
    ///
    /// # 参数
    /// - sent: 已写入记录数
    /// - total: 总记录数
    /// - fraction: sent / total
    fn on_progress(&self, sent: usize, total: usize, fraction: f64);
}
