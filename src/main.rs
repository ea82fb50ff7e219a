// ==========================================
// 酒店入住率预测看板 - CLI 入口
// ==========================================
// 用途: 报表导入与看板数据的命令行驱动
// 说明: 浏览器前端走同一套 API 层,本入口仅是最小调用方
// ==========================================

use occupancy_dashboard::api::{DashboardApi, ImportApi};
use occupancy_dashboard::logging;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = r#"酒店入住率预测看板

用法:
  occupancy-dashboard import <文件...> [--overwrite] [--db <路径>]
  occupancy-dashboard reports [--db <路径>]
  occupancy-dashboard batches [--db <路径>]
  occupancy-dashboard count [--db <路径>]

说明:
  import      导入一个或多个预测报表文件 (.xlsx/.xls/.csv)
  --overwrite 同名报表已存在时直接覆盖（默认: 拒绝并取消）
  reports     列出已入库的报表快照组合（城市 × 快照日期）
  batches     列出最近的上传批次审计记录
  count       预测记录总数
"#;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprint!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    let command = args[0].clone();
    let mut files: Vec<PathBuf> = Vec::new();
    let mut overwrite = false;
    let mut db_path: Option<String> = None;

    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--overwrite" => overwrite = true,
            "--db" => db_path = iter.next(),
            "--help" | "-h" => {
                print!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    let db_path = match db_path.or_else(default_db_path) {
        Some(path) => path,
        None => {
            eprintln!("无法确定数据库路径,请通过 --db 指定");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(db = %db_path, "使用数据库");

    match command.as_str() {
        "import" => run_import(&db_path, files, overwrite).await,
        "reports" => run_reports(&db_path).await,
        "batches" => run_batches(&db_path).await,
        "count" => run_count(&db_path).await,
        other => {
            eprintln!("未知命令: {}\n", other);
            eprint!("{}", USAGE);
            ExitCode::FAILURE
        }
    }
}

/// 默认数据库路径: <数据目录>/occupancy-dashboard/forecast.db
fn default_db_path() -> Option<String> {
    let dir = dirs::data_dir()?.join("occupancy-dashboard");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("forecast.db").display().to_string())
}

async fn run_import(db_path: &str, files: Vec<PathBuf>, overwrite: bool) -> ExitCode {
    if files.is_empty() {
        eprintln!("import 需要至少一个文件参数");
        return ExitCode::FAILURE;
    }

    let api = ImportApi::new(db_path);
    let results = match api.import_reports(files, overwrite).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("导入失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut any_failed = false;
    for result in &results {
        match (&result.response, &result.message) {
            (Some(response), _) => {
                println!(
                    "{}: {} 记录 {} / 写入 {} / 跳过行 {} / 警告 {}（{} ms）",
                    result.file,
                    response.status,
                    response.total_records,
                    response.uploaded,
                    response.skipped_rows,
                    response.violations.len(),
                    response.elapsed_ms
                );
                if !response.skipped_row_samples.is_empty() {
                    println!("  跳过行样本: {:?}", response.skipped_row_samples);
                }
            }
            (None, Some(message)) => {
                any_failed = true;
                println!("{}: 失败 - {}", result.file, message);
            }
            (None, None) => {
                any_failed = true;
                println!("{}: 失败 - 未知原因", result.file);
            }
        }
    }

    if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run_reports(db_path: &str) -> ExitCode {
    let api = match DashboardApi::from_db_path(db_path) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("打开数据库失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match api.list_report_snapshots().await {
        Ok(snapshots) => {
            for snapshot in snapshots {
                println!(
                    "{}  {}  {}（{} 条记录）",
                    snapshot.as_of_date, snapshot.city, snapshot.report_id, snapshot.record_count
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("查询失败: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_batches(db_path: &str) -> ExitCode {
    let api = ImportApi::new(db_path);
    match api.list_upload_batches(20).await {
        Ok(batches) => {
            for batch in batches {
                println!(
                    "{}  {}  {}  写入 {}/{}（{} ms）",
                    batch.imported_at.format("%Y-%m-%d %H:%M:%S"),
                    batch.report_id,
                    batch.status,
                    batch.uploaded_rows,
                    batch.record_count,
                    batch.elapsed_ms
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("查询失败: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_count(db_path: &str) -> ExitCode {
    let api = match DashboardApi::from_db_path(db_path) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("打开数据库失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match api.count_records().await {
        Ok(count) => {
            println!("{}", count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("查询失败: {}", e);
            ExitCode::FAILURE
        }
    }
}
