// ==========================================
// 酒店入住率预测看板 - 数据质量校验器
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 5. 校验规则
// 职责: 必填字段 / 数值范围 / 枚举成员 校验 + 熔断裁决
// 红线: 软违规不逐行过滤,只做整批熔断（超阈值才拒绝）
// ==========================================

use crate::domain::forecast::{DqLevel, DqViolation, ForecastRecord};
use crate::importer::error::{ImportError, ImportResult};
use tracing::warn;

// ==========================================
// DqValidator
// ==========================================
pub struct DqValidator {
    required_fields: Vec<String>,  // 首条记录逐字段检查
    valid_segments: Vec<String>,   // 合法细分市场标签
    reject_threshold: usize,       // 违规数严格大于该值 → 整批拒绝
    sample_size: usize,            // 软违规抽样条数上限
}

impl DqValidator {
    pub fn new(
        required_fields: Vec<String>,
        valid_segments: Vec<String>,
        reject_threshold: usize,
        sample_size: usize,
    ) -> Self {
        Self {
            required_fields,
            valid_segments,
            reject_threshold,
            sample_size,
        }
    }

    /// 校验转换产出
    ///
    /// # 裁决顺序
    /// 1. 空列表 → 立即拒绝（"未提取到任何数据"）
    /// 2. 首条记录缺任一必填字段 → 立即拒绝
    /// 3. 抽样前 N 条收集软违规（入住率越界 / STLY 差异越界 / 细分非法）
    /// 4. 违规数 > 阈值 → 整批拒绝;否则放行,违规作为警告返回
    pub fn validate(&self, records: &[ForecastRecord]) -> ImportResult<Vec<DqViolation>> {
        if records.is_empty() {
            return Err(ImportError::NoDataExtracted);
        }

        // 模式边界只检查一次: 首条记录逐字段
        for field in &self.required_fields {
            if !field_is_present(&records[0], field) {
                return Err(ImportError::RequiredFieldMissing {
                    field: field.clone(),
                });
            }
        }

        let violations = self.collect_violations(records);

        if violations.len() > self.reject_threshold {
            warn!(
                violations = violations.len(),
                threshold = self.reject_threshold,
                "违规数超阈值,整批拒绝"
            );
            return Err(ImportError::TooManyViolations {
                violations: violations.len(),
                threshold: self.reject_threshold,
            });
        }

        if !violations.is_empty() {
            warn!(violations = violations.len(), "放行,违规降级为警告");
        }

        Ok(violations)
    }

    /// 抽样收集软违规
    fn collect_violations(&self, records: &[ForecastRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        for (index, record) in records.iter().take(self.sample_size).enumerate() {
            if record.current_occupancy < 0.0 || record.current_occupancy > 100.0 {
                violations.push(DqViolation {
                    record_index: index,
                    forecast_date: Some(record.forecast_date),
                    level: DqLevel::Warning,
                    field: "current_occupancy".to_string(),
                    message: format!("入住率越界 [0,100]: {:.2}", record.current_occupancy),
                });
            }

            if record.stly_variance.abs() > 100.0 {
                violations.push(DqViolation {
                    record_index: index,
                    forecast_date: Some(record.forecast_date),
                    level: DqLevel::Warning,
                    field: "stly_variance".to_string(),
                    message: format!("STLY 差异越界 |x|>100: {:.2}", record.stly_variance),
                });
            }

            let segment_label = record.market_segment.as_str().to_string();
            if !self.valid_segments.contains(&segment_label) {
                violations.push(DqViolation {
                    record_index: index,
                    forecast_date: Some(record.forecast_date),
                    level: DqLevel::Warning,
                    field: "market_segment".to_string(),
                    message: format!("未知细分市场: {}", segment_label),
                });
            }
        }

        violations
    }
}

/// 模式边界的字段在位检查
///
/// 记录是静态结构,"在位"指字符串非空、数值有限;
/// 配置列出了未知字段名时按缺失处理（宁可拒绝不可放行）
fn field_is_present(record: &ForecastRecord, field: &str) -> bool {
    match field {
        "as_of_date" | "forecast_date" | "market_segment" | "days_out" | "forecast_horizon" => true,
        "report_id" => !record.report_id.trim().is_empty(),
        "city" => !record.city.trim().is_empty(),
        "current_occupancy" => record.current_occupancy.is_finite(),
        "weekly_pickup" => record.weekly_pickup.is_finite(),
        "stly_variance" => record.stly_variance.is_finite(),
        _ => false,
    }
}
