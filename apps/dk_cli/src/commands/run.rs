// apps/dk_cli/src/commands/run.rs

//! 运行计算命令
//!
//! 构建示例场景，校验后交给 [`Calculator`] 执行，
//! 各位置摘要以 JSON 写到标准输出或指定文件。

use super::scenario::ScenarioArgs;
use anyhow::{bail, Context, Result};
use clap::Args;
use dk_core::{validate, LocationSummary, ValidationOutcome};
use dk_foundation::{DiagnosticEvent, DiagnosticsSink, DkError};
use dk_workflow::{Calculator, CalculatorConfig, Concurrency, LoggingListener};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// 运行计算参数
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// 位置并发方式 (sequential, parallel)
    #[arg(long, default_value = "parallel")]
    pub location_concurrency: Concurrency,

    /// 时段并发方式 (sequential, parallel)；有状态护面只能顺序计算
    #[arg(long, default_value = "sequential")]
    pub interval_concurrency: Concurrency,

    /// 工作线程数，0 表示自动
    #[arg(short = 'j', long, default_value = "0")]
    pub threads: usize,

    /// 结果输出文件（默认标准输出）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 格式化 JSON 输出
    #[arg(long)]
    pub pretty: bool,
}

impl RunArgs {
    fn calculator_config(&self) -> CalculatorConfig {
        CalculatorConfig::new()
            .with_location_concurrency(self.location_concurrency)
            .with_interval_concurrency(self.interval_concurrency)
            .with_num_threads(self.threads)
    }
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== DikeKernel 损伤计算 ===");
    let sink = DiagnosticsSink::new();

    let input = Arc::new(args.scenario.build(&sink)?);
    if validate(&input, &sink) == ValidationOutcome::Failed {
        report_diagnostics(&sink.flush());
        bail!("输入校验失败");
    }

    let config = args.calculator_config();
    config.validate()?;
    info!(
        "位置并发: {}, 时段并发: {}, 线程数: {}",
        config.location_concurrency,
        config.interval_concurrency,
        if config.num_threads == 0 {
            "auto".to_string()
        } else {
            config.num_threads.to_string()
        }
    );

    let wall_clock = Instant::now();
    let calculator = Calculator::new(config).with_listener(Arc::new(LoggingListener::new("dk")));
    let handle = calculator.spawn(input, &sink)?;
    info!("运行 {} 已启动", handle.id());

    match handle.wait_for_completion() {
        Ok(output) => {
            report_diagnostics(&sink.flush());
            let summaries = output.summaries();
            let failed = summaries.iter().filter(|s| s.failed).count();
            info!(
                "计算完成: {} 个位置, {} 个失效, 耗时 {:.3}s",
                summaries.len(),
                failed,
                wall_clock.elapsed().as_secs_f64()
            );
            write_summaries(&summaries, &args)
        }
        Err(failure) => {
            report_diagnostics(&failure.diagnostics);
            let summaries: Vec<LocationSummary> =
                failure.partial_results.iter().map(|r| r.summary()).collect();
            write_summaries(&summaries, &args)?;
            Err(DkError::from(failure).into())
        }
    }
}

fn write_summaries(summaries: &[LocationSummary], args: &RunArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(summaries)?
    } else {
        serde_json::to_string(summaries)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("无法写入结果文件: {}", path.display()))?;
            info!("结果已写入 {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn report_diagnostics(events: &[DiagnosticEvent]) {
    for event in events {
        if event.is_error() {
            error!("{}", event);
        } else {
            warn!("{}", event);
        }
    }
}
