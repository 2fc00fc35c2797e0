// crates/dk_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `DkError` 枚举和 `DkResult` 类型别名。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，构建/模型/计算错误在各自层中定义
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **可追溯**: 支持错误链
//!
//! # 示例
//!
//! ```
//! use dk_foundation::error::{DkError, DkResult};
//!
//! fn check_failure_number(value: f64) -> DkResult<()> {
//!     DkError::check_range("failure_number", value, 0.0, f64::MAX)
//! }
//!
//! assert!(check_failure_number(1.0).is_ok());
//! assert!(check_failure_number(-1.0).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type DkResult<T> = Result<T, DkError>;

/// DikeKernel 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DkError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 验证失败
    #[error("验证失败: {0}")]
    Validation(String),

    /// 计算错误
    #[error("计算错误: {0}")]
    Computation(String),

    /// 任务取消
    #[error("计算已取消")]
    Cancelled,

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl DkError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 验证失败
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 计算错误
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 检查值是否在范围内（NaN 视为越界）
    #[inline]
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> DkResult<()> {
        if value.is_nan() || value < min || value > max {
            Err(Self::out_of_range(field, value, min, max))
        } else {
            Ok(())
        }
    }
}
