// apps/dk_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出可用护面模型和计算引擎的默认配置。

use anyhow::Result;
use clap::Args;
use dk_models::RevetmentKind;
use dk_workflow::CalculatorConfig;
use tracing::info;

/// 信息显示参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// 只显示护面模型
    #[arg(long)]
    pub models: bool,

    /// 只显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== DikeKernel 信息 ===");
    let show_all = !args.models && !args.defaults;

    if args.models || show_all {
        print_models();
    }
    if show_all {
        println!();
    }
    if args.defaults || show_all {
        print_default_config()?;
    }
    Ok(())
}

fn print_models() {
    println!("=== 护面模型 ===");
    for kind in RevetmentKind::ALL {
        let mode = if kind.is_stateful() {
            "有状态，时段顺序计算"
        } else {
            "无状态，时段可并行"
        };
        println!("  {:<22} {} ({})", kind.to_string(), kind.description(), mode);
    }
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    println!("DikeKernel CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("{}", serde_json::to_string_pretty(&CalculatorConfig::default())?);
    Ok(())
}
