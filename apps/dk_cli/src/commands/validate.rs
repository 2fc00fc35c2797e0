// apps/dk_cli/src/commands/validate.rs

//! 输入校验命令
//!
//! 构建示例场景并执行业务规则校验，只输出诊断，不运行计算。

use super::scenario::ScenarioArgs;
use anyhow::{bail, Result};
use clap::Args;
use dk_core::validate;
use dk_foundation::{DiagnosticEvent, DiagnosticsSink};
use tracing::{error, info, warn};

/// 校验参数
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行校验命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== DikeKernel 输入校验 ===");
    let sink = DiagnosticsSink::new();

    // 构建失败时结构诊断已写入 sink
    let input = match args.scenario.build(&sink) {
        Ok(input) => input,
        Err(err) => {
            print_validation_result(&sink.flush(), args.strict)?;
            return Err(err);
        }
    };

    let outcome = validate(&input, &sink);
    info!("校验结论: {}", outcome);
    print_validation_result(&sink.flush(), args.strict)
}

fn print_validation_result(events: &[DiagnosticEvent], strict: bool) -> Result<()> {
    println!("=== 校验结果 ===");

    let (errors, warnings): (Vec<_>, Vec<_>) = events.iter().partition(|e| e.is_error());

    if !errors.is_empty() {
        println!("\n错误 ({}):", errors.len());
        for event in &errors {
            error!("{}", event);
            println!("  ✗ {}", event);
        }
    }

    if !warnings.is_empty() {
        println!("\n警告 ({}):", warnings.len());
        for event in &warnings {
            warn!("{}", event);
            println!("  ⚠ {}", event);
        }
    }

    let success = errors.is_empty() && (!strict || warnings.is_empty());
    if success {
        println!("\n✓ 校验通过");
        Ok(())
    } else {
        println!("\n✗ 校验失败");
        bail!(
            "校验失败：发现 {} 个错误，{} 个警告",
            errors.len(),
            warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        validate: ValidateArgs,
    }

    #[test]
    fn test_default_scenario_passes() {
        let cli = TestCli::parse_from(["dk_cli"]);
        assert!(execute(cli.validate).is_ok());
    }

    #[test]
    fn test_strict_fails_on_berm_warning() {
        // x = 15 落在水平平台上，坡度为 0 产生警告
        let cli = TestCli::parse_from(["dk_cli", "--strict"]);
        assert!(execute(cli.validate).is_err());
    }

    #[test]
    fn test_negative_failure_number_fails() {
        let cli = TestCli::parse_from(["dk_cli", "--failure-number=-1.0"]);
        assert!(execute(cli.validate).is_err());
    }

    #[test]
    fn test_partition_counts() {
        let events = vec![
            DiagnosticEvent::warning(dk_foundation::DiagnosticPhase::Validate, "w"),
            DiagnosticEvent::error(dk_foundation::DiagnosticPhase::Validate, "e"),
        ];
        assert!(print_validation_result(&events, false).is_err());
        assert!(print_validation_result(&events[..1], false).is_ok());
        assert!(print_validation_result(&events[..1], true).is_err());
    }
}
