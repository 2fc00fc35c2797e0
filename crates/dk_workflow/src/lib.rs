// crates/dk_workflow/src/lib.rs

//! DikeKernel Workflow Layer (Layer 3)
//!
//! 计算引擎：按位置（可并行）、按时段（无状态模型可并行）调度损伤计算，
//! 管理运行生命周期、取消、进度事件和故障隔离。
//!
//! # 示例
//!
//! ```ignore
//! let sink = DiagnosticsSink::new();
//! let handle = Calculator::start(Arc::new(input), CalculatorConfig::default(), &sink)?;
//! let output = handle.wait_for_completion()?;
//! for summary in output.summaries() {
//!     println!("{:?}", summary);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calculator;
pub mod config;
pub mod error;
pub mod events;
pub mod run;

pub use calculator::{CalculationOutput, Calculator, RunFailure, RunHandle};
pub use config::{CalculatorConfig, Concurrency};
pub use error::CalculatorError;
pub use events::{CalculationEvent, EventDispatcher, EventListener, FnListener, LoggingListener};
pub use run::{RunId, RunState};
