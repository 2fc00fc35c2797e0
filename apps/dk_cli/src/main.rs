// apps/dk_cli/src/main.rs

//! DikeKernel 命令行界面
//!
//! 用内置的示例堤防剖面和合成风暴过程运行护面损伤计算，
//! 以 JSON 输出各位置的最终损伤和失效时刻。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// DikeKernel 护面损伤计算命令行工具
#[derive(Parser)]
#[command(name = "dk_cli")]
#[command(author = "DikeKernel Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Revetment damage calculation kernel", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行损伤计算
    Run(commands::run::RunArgs),
    /// 校验示例输入
    Validate(commands::validate::ValidateArgs),
    /// 显示可用护面模型和默认配置
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
