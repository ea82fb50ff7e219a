// ==========================================
// 酒店入住率预测看板 - 导入模块错误类型
// ==========================================
// 依据: Upload_Pipeline_Spec_v0.3.md - 错误分级
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
///
/// 分级约定:
/// - 文件门禁/布局/元信息错误: 整个文件拒绝,用户修正源文件后重试
/// - 单行预测日期不可解析: 不是错误,转换层静默跳过并记日志
/// - 校验熔断: 违规数超阈值时整批拒绝
/// - 上传错误: 剩余批次终止,已写入批次不回滚,附带成功条数
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件门禁错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件超出大小限制: {size} 字节（上限 {max} 字节）")]
    FileTooLarge { size: u64, max: u64 },

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 布局错误 =====
    #[error("无法识别的文件布局: {0}")]
    LayoutError(String),

    // ===== 元信息错误 =====
    #[error("报表元信息缺失: {0}")]
    MetadataError(String),

    // ===== 校验错误 =====
    #[error("未提取到任何数据")]
    NoDataExtracted,

    #[error("首条记录缺失必填字段: {field}")]
    RequiredFieldMissing { field: String },

    #[error("数据质量违规过多: {violations} 条（阈值 {threshold}）,整批拒绝")]
    TooManyViolations { violations: usize, threshold: usize },

    // ===== 上传错误 =====
    #[error("批次写入失败（已成功 {uploaded}/{total} 条）: {message}")]
    UploadError {
        uploaded: usize,
        total: usize,
        message: String,
    },

    // ===== 数据库错误 =====
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
