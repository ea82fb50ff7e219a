// ==========================================
// 酒店入住率预测看板 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换内层错误为用户可读消息
// 红线: 所有错误信息必须包含显式原因（可解释性）
// ==========================================

use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 导入管道错误（原样透传给前端展示）
    // ==========================================
    #[error(transparent)]
    ImportFailed(#[from] ImportError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
