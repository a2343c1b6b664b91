//! 数据库结构导出工具
//!
//! 一次性批处理任务：
//! - 解析数据库连接配置
//! - 依次执行元数据查询并写入 JSON 文件
//! - 生成执行摘要 build-metadata.json

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use common::config::{self, DatabaseConfig, ProcessEnv};
use common::telemetry::init_tracing;
use schema_export::{run_export, ExportPaths, PgExecutor, PoolSettings, DB_QUERIES};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "schema-export", about = "Export database schema metadata to JSON files")]
struct Args {
    /// Directory holding the metadata SQL scripts.
    #[arg(long, default_value = "db-setup/scripts")]
    scripts_dir: PathBuf,

    /// Directory the JSON files are written to.
    #[arg(long, default_value = "db-setup")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 1)]
    max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[arg(long, default_value_t = 30)]
    connect_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env 必须在日志初始化之前加载，以便 RUST_LOG 生效
    let dotenv = config::load_dotenv();
    init_tracing();
    match dotenv {
        Ok(Some(path)) => info!(path = %path.display(), "[dotenv] loaded"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to parse .env file"),
    }

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "❌ Error generating database build");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!("Starting database build generation...");

    // 配置缺失时立即失败，不创建连接池，也不写任何文件
    let database = DatabaseConfig::from_env(&ProcessEnv)?;
    let settings = PoolSettings {
        max_connections: args.max_connections.max(1),
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
    };
    let executor = PgExecutor::connect(&database, settings).await?;

    let paths = ExportPaths {
        scripts_dir: args.scripts_dir,
        out_dir: args.out_dir,
    };
    run_export(&executor, &paths, &DB_QUERIES).await?;
    Ok(())
}
