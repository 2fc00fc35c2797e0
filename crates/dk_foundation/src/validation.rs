// crates/dk_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和问题类型，模型的业务规则检查把结果写入 [`ValidationReport`]，
//! 再统一发布到诊断收集器。
//!
//! # 示例
//!
//! ```
//! use dk_foundation::validation::{check_range, ValidationReport};
//!
//! let mut report = ValidationReport::new();
//! check_range(&mut report, "failure_number", Some(0), -1.0, 0.0, f64::MAX);
//!
//! assert!(!report.is_valid());
//! ```

use crate::diagnostics::{DiagnosticEvent, DiagnosticPhase, DiagnosticsSink};
use std::fmt;

/// 验证报告
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationIssue>,
    /// 警告列表
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// 添加警告
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// 转换为诊断事件（错误在前）
    pub fn to_events(&self, phase: DiagnosticPhase) -> Vec<DiagnosticEvent> {
        let errors = self
            .errors
            .iter()
            .map(|issue| issue.to_event(DiagnosticEvent::error(phase, issue.message.clone())));
        let warnings = self
            .warnings
            .iter()
            .map(|issue| issue.to_event(DiagnosticEvent::warning(phase, issue.message.clone())));
        errors.chain(warnings).collect()
    }

    /// 发布到诊断收集器
    pub fn publish(&self, sink: &DiagnosticsSink, phase: DiagnosticPhase) {
        sink.extend(self.to_events(phase));
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.errors.len())?;
        writeln!(f, "  警告: {} 个", self.warnings.len())?;

        for (i, err) in self.errors.iter().enumerate() {
            writeln!(f, "  E{}. {}", i + 1, err)?;
        }
        for (i, warn) in self.warnings.iter().enumerate() {
            writeln!(f, "  W{}. {}", i + 1, warn)?;
        }

        Ok(())
    }
}

/// 验证问题
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// 相关计算位置
    pub location: Option<usize>,
    /// 描述
    pub message: String,
}

impl ValidationIssue {
    /// 创建问题
    pub fn new(location: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    fn to_event(&self, event: DiagnosticEvent) -> DiagnosticEvent {
        match self.location {
            Some(location) => event.at_location(location),
            None => event,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(id) => write!(f, "位置{}: {}", id, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

// ============================================================================
// 验证辅助函数
// ============================================================================

/// 检查值是否有限
pub fn check_finite(
    report: &mut ValidationReport,
    field: &'static str,
    location: Option<usize>,
    value: f64,
) -> bool {
    if !value.is_finite() {
        report.add_error(ValidationIssue::new(
            location,
            format!("字段{}={} 非有限值", field, value),
        ));
        false
    } else {
        true
    }
}

/// 检查值是否在闭区间内
pub fn check_range(
    report: &mut ValidationReport,
    field: &'static str,
    location: Option<usize>,
    value: f64,
    min: f64,
    max: f64,
) -> bool {
    if value.is_nan() || value < min || value > max {
        report.add_error(ValidationIssue::new(
            location,
            format!("字段{}={} 超出范围[{}, {}]", field, value, min, max),
        ));
        false
    } else {
        true
    }
}

/// 检查值是否严格为正
pub fn check_positive(
    report: &mut ValidationReport,
    field: &'static str,
    location: Option<usize>,
    value: f64,
) -> bool {
    if value.is_nan() || value <= 0.0 {
        report.add_error(ValidationIssue::new(
            location,
            format!("字段{}={} 必须大于 0", field, value),
        ));
        false
    } else {
        true
    }
}
