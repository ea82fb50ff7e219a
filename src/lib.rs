// ==========================================
// 酒店入住率预测看板 - 核心库
// ==========================================
// 依据: Dashboard_Master_Spec.md - 系统宪法
// 技术栈: Rust + SQLite
// 系统定位: 预测报表导入与分析（上传决策权在人）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部报表文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ForecastHorizon, MarketSegment, UploadPhase, UploadStatus};

// 领域实体
pub use domain::{
    CellValue, DqLevel, DqViolation, ForecastRecord, ImportOutcome, RawGrid, ReportMetadata,
    UploadBatch,
};

// 导入层
pub use importer::{ImportError, ReportImporter, ReportImporterImpl};

// 仓储层
pub use repository::{ForecastQuery, ForecastRepository, ForecastRepositoryImpl, ReportSnapshot};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
