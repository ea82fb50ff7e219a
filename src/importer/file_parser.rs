// ==========================================
// 酒店入住率预测看板 - 文件解析器实现
// ==========================================
// 依据: Amadeus_Ingest_Spec_v0.4.md - 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 原始二维网格（不做任何业务解释）
// ==========================================

use crate::domain::forecast::{CellValue, RawGrid};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::report_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// 支持的文件扩展名
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// 文件门禁: 存在性 + 扩展名 + 大小上限
///
/// 在任何解析发生之前执行;不通过即整个文件拒绝
pub fn check_file_gate(file_path: &Path, max_size_bytes: u64) -> ImportResult<()> {
    if !file_path.exists() {
        return Err(ImportError::FileNotFound(file_path.display().to_string()));
    }

    let ext = file_extension(file_path);
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }

    let size = std::fs::metadata(file_path)?.len();
    if size > max_size_bytes {
        return Err(ImportError::FileTooLarge {
            size,
            max: max_size_bytes,
        });
    }

    Ok(())
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file = File::open(file_path)?;
        // 不把首行当表头: 表头行位置由 HeaderLocator 在网格里定位
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut grid: RawGrid = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value.to_string())
                    }
                })
                .collect();
            grid.push(row);
        }

        Ok(grid)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let grid: RawGrid = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        Ok(grid)
    }
}

/// calamine 单元格 → CellValue
///
/// 日期单元格保留序列号数值本体,由 cell_parser 统一走纪元换算,
/// 避免解析库与业务层各自做一遍时区解释
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        match file_extension(file_path).as_str() {
            "csv" => CsvParser.parse_to_grid(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_grid(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
