// ==========================================
// 酒店入住率预测看板 - 数据仓储层
// ==========================================
// 职责: 后端数据访问（存在性探测/删除/分批写入/看板查询）
// 红线: 不含业务规则
// ==========================================

pub mod forecast_repo;
pub mod forecast_repo_impl;

// 重导出核心类型
pub use forecast_repo::{ForecastQuery, ForecastRepository, ReportSnapshot};
pub use forecast_repo_impl::ForecastRepositoryImpl;
