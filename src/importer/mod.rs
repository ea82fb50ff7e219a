// ==========================================
// 酒店入住率预测看板 - 导入层
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 导入管道
// ==========================================
// 职责: 外部报表文件导入,生成内部预测记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod cell_parser;
pub mod dq_validator;
pub mod error;
pub mod file_parser;
pub mod header_locator;
pub mod metadata_extractor;
pub mod report_importer_impl;
pub mod report_importer_trait;
pub mod row_transformer;

// 重导出核心类型
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use file_parser::{check_file_gate, CsvParser, ExcelParser, UniversalFileParser};
pub use header_locator::HeaderLocator;
pub use metadata_extractor::MetadataExtractor;
pub use report_importer_impl::{LogProgressReporter, PresetConfirmer, ReportImporterImpl};
pub use row_transformer::{RowTransformer, TransformOutcome};

// 重导出 Trait 接口
pub use report_importer_trait::{
    FileParser, OverwriteConfirmer, ProgressReporter, ReportImporter,
};
