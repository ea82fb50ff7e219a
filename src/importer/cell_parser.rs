// ==========================================
// 酒店入住率预测看板 - 单元格解析工具
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 1. 单元格解析规则
// 职责: 原始单元格 → 规范日期 / 规范数值,区间派生
// 红线: 纯函数,绝不 panic,绝不返回 Err
// ==========================================

use crate::domain::forecast::CellValue;
use crate::domain::types::ForecastHorizon;
use chrono::{DateTime, NaiveDate};

/// 电子表格序列日期纪元偏移: 序列号 25569 对应 1970-01-01
pub const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

/// 每天秒数（序列号换算用,日历日口径,无时区参与）
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// 近期区间上界（含,天）
pub const NEAR_TERM_MAX_DAYS: i64 = 30;

/// 中期区间上界（含,天）
pub const MEDIUM_TERM_MAX_DAYS: i64 = 90;

/// 周几缩写（解析前剥除的前导 token）
const WEEKDAY_ABBREVS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// 字符串直接解析尝试的日期格式（按顺序）
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d-%b-%Y"];

// ==========================================
// 日期解析
// ==========================================

/// 解析单元格为规范日期（YYYY-MM-DD）
///
/// # 规则
/// - 数值: 按序列日期解释（纪元偏移 25569 天 × 86400 秒）
/// - 文本: 剥除前导周几缩写后依次尝试日历格式,最后回退 MM/DD/YYYY 显式匹配
/// - 原生日期: 直接取日期部分
/// - 其余输入一律返回 None,调用方决定按行跳过还是按元信息缺失处理
pub fn parse_cell_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Number(n) => parse_serial_date(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Date(dt) => Some(dt.date()),
        _ => None,
    }
}

/// 序列号 → 日期（序列号 45659 = 2025-01-02）
pub fn parse_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let unix_seconds = ((serial - SERIAL_EPOCH_OFFSET_DAYS) * SECONDS_PER_DAY).round() as i64;
    DateTime::from_timestamp(unix_seconds, 0).map(|dt| dt.date_naive())
}

/// 文本 → 日期
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let trimmed = strip_weekday_prefix(value.trim());

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    parse_mdy(trimmed)
}

/// 剥除前导周几缩写 token（如 "Mon 12/30/2024" / "Tue, Dec 31"）
fn strip_weekday_prefix(value: &str) -> &str {
    if let Some((first, rest)) = value.split_once(char::is_whitespace) {
        let token = first.trim_end_matches([',', '.']).to_lowercase();
        if WEEKDAY_ABBREVS.contains(&token.as_str()) {
            return rest.trim_start();
        }
    }
    value
}

/// 显式 MM/DD/YYYY 匹配（月/日允许 1-2 位,年必须 4 位）
fn parse_mdy(value: &str) -> Option<NaiveDate> {
    let mut parts = value.splitn(3, '/');
    let month = parts.next()?.trim();
    let day = parts.next()?.trim();
    let year = parts.next()?.trim();

    if year.len() != 4 || month.is_empty() || month.len() > 2 || day.is_empty() || day.len() > 2 {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

// ==========================================
// 数值解析
// ==========================================

/// 解析单元格为数值
///
/// # 规则
/// - 数值输入原样通过（非有限值归零）
/// - 空单元格归零
/// - 文本剥除货币/千分位/百分号等噪音后解析,解析失败归零
pub fn parse_cell_number(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) => 0.0,
        CellValue::Text(s) => parse_number_text(s),
        CellValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// 文本 → 数值（仅保留数字、小数点、负号后解析）
pub fn parse_number_text(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// ==========================================
// 区间派生
// ==========================================

/// days_out → 预测区间
///
/// # 分桶（按序求值,首个命中生效,全整数域无缝隙无重叠）
/// - days_out <= -1        → Historical
/// - 0 <= days_out <= 30   → Near_Term
/// - 31 <= days_out <= 90  → Medium_Term
/// - days_out >= 91        → Long_Term
pub fn horizon_from_days_out(days_out: i64) -> ForecastHorizon {
    if days_out <= -1 {
        ForecastHorizon::Historical
    } else if days_out <= NEAR_TERM_MAX_DAYS {
        ForecastHorizon::NearTerm
    } else if days_out <= MEDIUM_TERM_MAX_DAYS {
        ForecastHorizon::MediumTerm
    } else {
        ForecastHorizon::LongTerm
    }
}

/// 四舍五入保留 2 位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
