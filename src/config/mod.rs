// ==========================================
// 酒店入住率预测看板 - 配置层
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 0.3 配置项全集
// ==========================================
// 职责: 导入管道配置常量供给
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::ConfigManager;
pub use import_config_trait::ImportConfigReader;
