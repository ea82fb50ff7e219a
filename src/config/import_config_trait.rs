// ==========================================
// 酒店入住率预测看板 - 导入配置读取 Trait
// ==========================================
// 依据: Dashboard_Master_Spec.md - PART D 工程结构
// 依据: Amadeus_Ingest_Spec_v0.4.md - 0.3 配置项全集
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（进程内静态配置）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 文件门禁 =====

    /// 获取允许的最大文件字节数
    ///
    /// # 默认值
    /// - 52_428_800 (50MB)
    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error>>;

    // ===== 上传分批 =====

    /// 获取单次后端写入的记录条数（分批大小）
    ///
    /// # 默认值
    /// - 1000
    async fn get_insert_batch_size(&self) -> Result<usize, Box<dyn Error>>;

    // ===== 校验规则 =====

    /// 获取必填字段名列表（首条记录逐字段检查）
    ///
    /// # 默认值
    /// - ["as_of_date", "city", "forecast_date", "market_segment", "current_occupancy"]
    async fn get_required_fields(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取合法细分市场标签列表
    ///
    /// # 默认值
    /// - ["Totals", "Transient", "Group_Sold", "Unsold_Block", "Other"]
    async fn get_valid_market_segments(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取整批拒绝的违规数阈值（严格大于即拒绝）
    ///
    /// # 默认值
    /// - 10
    async fn get_violation_reject_threshold(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取软违规抽样扫描的记录条数上限
    ///
    /// # 默认值
    /// - 50
    async fn get_dq_sample_size(&self) -> Result<usize, Box<dyn Error>>;

    // ===== 元信息提取 =====

    /// 获取文件头部标签扫描的行数窗口
    ///
    /// # 默认值
    /// - 20
    async fn get_metadata_scan_rows(&self) -> Result<usize, Box<dyn Error>>;

    // ===== 结果呈现 =====

    /// 获取跳过行号样本的封顶数量（用于部分成功提示）
    ///
    /// # 默认值
    /// - 5
    async fn get_skipped_row_sample_cap(&self) -> Result<usize, Box<dyn Error>>;

    // ===== 预测区间边界 =====

    /// 获取近期区间上界（含,天）
    ///
    /// # 默认值
    /// - 30
    async fn get_near_term_max_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取中期区间上界（含,天）
    ///
    /// # 默认值
    /// - 90
    async fn get_medium_term_max_days(&self) -> Result<i64, Box<dyn Error>>;
}
