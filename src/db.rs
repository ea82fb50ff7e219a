// ==========================================
// 酒店入住率预测看板 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表语句集中一处，避免各模块各建一套
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// forecast_report: 预测记录表（id 与 created_at 由后端补齐，核心层不产出）
/// upload_batch: 上传批次审计表
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS forecast_report (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            as_of_date TEXT NOT NULL,
            report_id TEXT NOT NULL,
            city TEXT NOT NULL,
            forecast_date TEXT NOT NULL,
            market_segment TEXT NOT NULL,
            current_occupancy REAL NOT NULL,
            weekly_pickup REAL NOT NULL,
            stly_variance REAL NOT NULL,
            days_out INTEGER NOT NULL,
            forecast_horizon TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_forecast_report_report_id
            ON forecast_report (report_id);
        CREATE INDEX IF NOT EXISTS idx_forecast_report_city_as_of
            ON forecast_report (city, as_of_date, forecast_date);

        CREATE TABLE IF NOT EXISTS upload_batch (
            batch_id TEXT PRIMARY KEY,
            report_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            city TEXT NOT NULL,
            as_of_date TEXT NOT NULL,
            total_rows INTEGER NOT NULL,
            record_count INTEGER NOT NULL,
            uploaded_rows INTEGER NOT NULL,
            skipped_rows INTEGER NOT NULL,
            warning_count INTEGER NOT NULL,
            status TEXT NOT NULL,
            imported_at TEXT NOT NULL,
            elapsed_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_upload_batch_report_id
            ON upload_batch (report_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
