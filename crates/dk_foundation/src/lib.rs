// crates/dk_foundation/src/lib.rs

//! DikeKernel Foundation Layer (Layer 0)
//!
//! 基础层，提供整个项目共享的错误类型、诊断事件收集与验证报告。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`diagnostics`]: 线程安全的诊断事件收集器
//! - [`validation`]: 验证报告与检查辅助函数
//! - [`float`]: NaN 哨兵与浮点辅助函数

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod error;
pub mod float;
pub mod validation;

// 重导出常用类型
pub use diagnostics::{DiagnosticEvent, DiagnosticPhase, DiagnosticSeverity, DiagnosticsSink};
pub use error::{DkError, DkResult};
pub use validation::{ValidationIssue, ValidationReport};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::diagnostics::{
        DiagnosticEvent, DiagnosticPhase, DiagnosticSeverity, DiagnosticsSink,
    };
    pub use crate::error::{DkError, DkResult};
    pub use crate::float::{approx_eq, contribution, NOT_LOADED};
    pub use crate::validation::{ValidationIssue, ValidationReport};
}
