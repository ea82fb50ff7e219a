// ==========================================
// 酒店入住率预测看板 - API 层
// ==========================================
// 职责: 面向前端/CLI 的业务接口封装
// 红线: 只返回结构化数据或结构化错误,不触达任何 UI 状态
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, PickupPoint, TrendPoint, TrendRequest, VarianceCell};
pub use error::{ApiError, ApiResult};
pub use import_api::{FileImportResult, ImportApi, ImportApiResponse};
