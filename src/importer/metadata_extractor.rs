// ==========================================
// 酒店入住率预测看板 - 报表元信息提取器
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 2. 元信息提取
// 职责: 文件名分解为主,文件头部标签扫描兜底
// 红线: as_of_date 与 city 两个来源都取不到 → 整个文件拒绝
// ==========================================

use crate::domain::forecast::{RawGrid, ReportMetadata};
use crate::importer::cell_parser::parse_cell_date;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

/// 头部扫描识别的标签（不区分大小写,取列 1 为标签、列 2 为值）
const LABEL_AS_OF_DATE: &str = "as of date";
const LABEL_COMP_SET: &str = "comp set";

// ==========================================
// MetadataExtractor
// ==========================================
pub struct MetadataExtractor {
    scan_rows: usize, // 头部标签扫描窗口（行数）
}

impl MetadataExtractor {
    pub fn new(scan_rows: usize) -> Self {
        Self { scan_rows }
    }

    /// 提取报表元信息
    ///
    /// # 规则
    /// 1. 文件名去扩展名后按 `_` 分解: >= 4 段时,段 0 为城市,
    ///    段 1..3 以 `-` 连接（月/日补零到 2 位）为快照日期
    /// 2. 无论文件名是否解析成功,都扫描前 N 行的标签/值对,
    ///    作为文件名缺失字段的兜底来源
    /// 3. 两个来源都取不到 as_of_date 或 city → MetadataError
    ///
    /// report_id 恒为去扩展名的文件名,是整次上传的去重键
    pub fn extract(&self, grid: &RawGrid, file_name: &str) -> ImportResult<ReportMetadata> {
        let report_id = file_stem(file_name);

        // === 来源 1: 文件名分解 ===
        let (city_from_name, as_of_from_name) = parse_file_name(&report_id);

        // === 来源 2: 头部标签扫描（始终执行）===
        let (city_from_file, as_of_from_file) = self.scan_leading_rows(grid);

        let as_of_date = as_of_from_name.or(as_of_from_file).ok_or_else(|| {
            ImportError::MetadataError(format!(
                "无法确定报表快照日期（文件名: {},头部 {} 行内无 \"As of Date\" 标签）",
                file_name, self.scan_rows
            ))
        })?;

        let city = city_from_name.or(city_from_file).ok_or_else(|| {
            ImportError::MetadataError(format!(
                "无法确定城市（文件名: {},头部 {} 行内无 \"Comp Set\" 标签）",
                file_name, self.scan_rows
            ))
        })?;

        debug!(report_id = %report_id, city = %city, as_of = %as_of_date, "元信息提取完成");

        Ok(ReportMetadata {
            file_name: file_name.to_string(),
            report_id,
            as_of_date,
            city,
        })
    }

    /// 扫描前 N 行的标签/值对
    fn scan_leading_rows(&self, grid: &RawGrid) -> (Option<String>, Option<NaiveDate>) {
        let mut city = None;
        let mut as_of = None;

        for row in grid.iter().take(self.scan_rows) {
            let label = match row.get(1) {
                Some(cell) => cell.as_text().trim().to_lowercase(),
                None => continue,
            };
            let value = match row.get(2) {
                Some(cell) => cell,
                None => continue,
            };

            match label.as_str() {
                LABEL_AS_OF_DATE => {
                    if as_of.is_none() {
                        as_of = parse_cell_date(value);
                    }
                }
                LABEL_COMP_SET => {
                    if city.is_none() {
                        let text = value.as_text().trim().to_string();
                        if !text.is_empty() {
                            city = Some(text);
                        }
                    }
                }
                _ => {}
            }
        }

        (city, as_of)
    }
}

/// 文件名去扩展名
fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// 文件名分解: `<City>_<YYYY>_<MM>_<DD>` → (城市, 快照日期)
fn parse_file_name(stem: &str) -> (Option<String>, Option<NaiveDate>) {
    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() < 4 {
        return (None, None);
    }

    let city = if tokens[0].trim().is_empty() {
        None
    } else {
        Some(tokens[0].trim().to_string())
    };

    let date_str = format!("{}-{:0>2}-{:0>2}", tokens[1], tokens[2], tokens[3]);
    let as_of = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").ok();

    (city, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::CellValue;

    fn label_row(label: &str, value: &str) -> Vec<CellValue> {
        vec![
            CellValue::Empty,
            CellValue::Text(label.to_string()),
            CellValue::Text(value.to_string()),
        ]
    }

    #[test]
    fn test_extract_from_file_name() {
        let extractor = MetadataExtractor::new(20);
        let grid: RawGrid = vec![vec![CellValue::Empty]];

        let meta = extractor
            .extract(&grid, "Edmonton_2024_12_10.xlsx")
            .unwrap();

        assert_eq!(meta.city, "Edmonton");
        assert_eq!(
            meta.as_of_date,
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
        );
        assert_eq!(meta.report_id, "Edmonton_2024_12_10");
        assert_eq!(meta.file_name, "Edmonton_2024_12_10.xlsx");
    }

    #[test]
    fn test_extract_zero_pads_month_and_day() {
        let extractor = MetadataExtractor::new(20);
        let grid: RawGrid = vec![];

        let meta = extractor.extract(&grid, "Calgary_2024_3_5.csv").unwrap();

        assert_eq!(
            meta.as_of_date,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_extract_falls_back_to_leading_rows() {
        let extractor = MetadataExtractor::new(20);
        let grid: RawGrid = vec![
            vec![CellValue::Text("Forecast Report".to_string())],
            label_row("As of Date", "2024-12-10"),
            label_row("Comp Set", "Edmonton"),
        ];

        let meta = extractor.extract(&grid, "forecast-export.xlsx").unwrap();

        assert_eq!(meta.city, "Edmonton");
        assert_eq!(
            meta.as_of_date,
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
        );
        assert_eq!(meta.report_id, "forecast-export");
    }

    #[test]
    fn test_extract_file_name_wins_over_content() {
        let extractor = MetadataExtractor::new(20);
        let grid: RawGrid = vec![
            label_row("As of Date", "2023-01-01"),
            label_row("Comp Set", "Winnipeg"),
        ];

        let meta = extractor
            .extract(&grid, "Edmonton_2024_12_10.xlsx")
            .unwrap();

        assert_eq!(meta.city, "Edmonton");
        assert_eq!(
            meta.as_of_date,
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
        );
    }

    #[test]
    fn test_extract_label_scan_respects_window() {
        let extractor = MetadataExtractor::new(2);
        let mut grid: RawGrid = vec![vec![CellValue::Empty]; 2];
        grid.push(label_row("As of Date", "2024-12-10"));
        grid.push(label_row("Comp Set", "Edmonton"));

        let result = extractor.extract(&grid, "forecast-export.xlsx");
        assert!(matches!(result, Err(ImportError::MetadataError(_))));
    }

    #[test]
    fn test_extract_missing_both_sources_fails() {
        let extractor = MetadataExtractor::new(20);
        let grid: RawGrid = vec![vec![CellValue::Text("junk".to_string())]];

        let result = extractor.extract(&grid, "report.xlsx");
        assert!(matches!(result, Err(ImportError::MetadataError(_))));
    }

    #[test]
    fn test_extract_serial_as_of_date_in_content() {
        let extractor = MetadataExtractor::new(20);
        let grid: RawGrid = vec![
            vec![
                CellValue::Empty,
                CellValue::Text("As Of Date".to_string()),
                CellValue::Number(45636.0), // 2024-12-10
            ],
            label_row("Comp Set", "Edmonton"),
        ];

        let meta = extractor.extract(&grid, "report.xlsx").unwrap();
        assert_eq!(
            meta.as_of_date,
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
        );
    }
}
