// crates/dk_foundation/src/diagnostics.rs

//! 诊断事件收集模块
//!
//! 构建、验证、计算各阶段产生的警告/错误事件统一写入 [`DiagnosticsSink`]，
//! 调用方在阶段之间通过 [`DiagnosticsSink::flush`] 取出并清空。
//!
//! # 并发语义
//!
//! - 写入与 `flush` 在同一把锁下完成，并发写入者既不会丢失也不会重复事件
//! - sink 的生命周期跟随一次逻辑操作（构建 / 验证 / 运行），不是进程全局状态
//! - 每个事件同时镜像到 `tracing`
//!
//! # 示例
//!
//! ```
//! use dk_foundation::diagnostics::{DiagnosticPhase, DiagnosticsSink};
//!
//! let sink = DiagnosticsSink::new();
//! sink.warning(DiagnosticPhase::Build, "前滩坡度为零");
//!
//! assert_eq!(sink.flush().len(), 1);
//! assert!(sink.flush().is_empty());
//! ```

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 事件严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// 警告
    Warning,
    /// 错误
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// 产生事件的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticPhase {
    /// 输入构建
    Build,
    /// 业务规则验证
    Validate,
    /// 损伤计算
    Calculate,
}

impl fmt::Display for DiagnosticPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "Build"),
            Self::Validate => write!(f, "Validate"),
            Self::Calculate => write!(f, "Calculate"),
        }
    }
}

/// 诊断事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEvent {
    /// 严重程度
    pub severity: DiagnosticSeverity,
    /// 产生阶段
    pub phase: DiagnosticPhase,
    /// 事件描述
    pub message: String,
    /// 相关计算位置的序号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<usize>,
    /// 产生时间
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticEvent {
    /// 创建事件
    pub fn new(
        severity: DiagnosticSeverity,
        phase: DiagnosticPhase,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            phase,
            message: message.into(),
            location: None,
            timestamp: Utc::now(),
        }
    }

    /// 创建警告
    pub fn warning(phase: DiagnosticPhase, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, phase, message)
    }

    /// 创建错误
    pub fn error(phase: DiagnosticPhase, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, phase, message)
    }

    /// 关联计算位置
    pub fn at_location(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }

    /// 是否为错误
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(
                f,
                "[{}][{}] 位置{}: {}",
                self.phase, self.severity, location, self.message
            ),
            None => write!(f, "[{}][{}] {}", self.phase, self.severity, self.message),
        }
    }
}

/// 诊断事件收集器
///
/// 克隆得到的句柄共享同一个事件队列，可以安全地交给并行计算的工作线程。
#[derive(Clone, Default)]
pub struct DiagnosticsSink {
    events: Arc<Mutex<Vec<DiagnosticEvent>>>,
}

impl DiagnosticsSink {
    /// 创建空的收集器
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入事件
    pub fn push(&self, event: DiagnosticEvent) {
        match event.severity {
            DiagnosticSeverity::Warning => tracing::warn!("{}", event),
            DiagnosticSeverity::Error => tracing::error!("{}", event),
        }
        self.events.lock().push(event);
    }

    /// 批量写入事件
    pub fn extend(&self, events: impl IntoIterator<Item = DiagnosticEvent>) {
        for event in events {
            self.push(event);
        }
    }

    /// 写入警告
    pub fn warning(&self, phase: DiagnosticPhase, message: impl Into<String>) {
        self.push(DiagnosticEvent::warning(phase, message));
    }

    /// 写入错误
    pub fn error(&self, phase: DiagnosticPhase, message: impl Into<String>) {
        self.push(DiagnosticEvent::error(phase, message));
    }

    /// 取出自上次 flush 以来的全部事件并清空
    pub fn flush(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// 当前事件数量
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// 是否没有事件
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// 是否包含错误事件
    pub fn has_errors(&self) -> bool {
        self.events.lock().iter().any(DiagnosticEvent::is_error)
    }
}

impl fmt::Debug for DiagnosticsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsSink")
            .field("pending", &self.len())
            .finish()
    }
}
