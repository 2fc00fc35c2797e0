// crates/dk_workflow/src/error.rs

//! 计算引擎错误类型

use dk_foundation::DkError;
use thiserror::Error;

/// 启动计算时的错误（此时尚未进行任何计算）
#[derive(Debug, Error)]
pub enum CalculatorError {
    /// 并行时段计算与有状态模型冲突
    #[error("位置 {locations:?} 使用有状态模型，不能并行计算时段")]
    StatefulParallelIntervals {
        /// 有状态模型的位置序号
        locations: Vec<usize>,
    },

    /// 配置无效
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] DkError),

    /// 线程池创建失败
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// 工作线程启动失败
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(String),
}

impl CalculatorError {
    /// 是否为配置类错误
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::StatefulParallelIntervals { .. } | Self::InvalidConfig(_)
        )
    }
}

impl From<CalculatorError> for DkError {
    fn from(err: CalculatorError) -> Self {
        match &err {
            CalculatorError::InvalidConfig(inner) => inner.clone(),
            CalculatorError::StatefulParallelIntervals { .. } => DkError::config(err.to_string()),
            CalculatorError::ThreadPool(_) | CalculatorError::Spawn(_) => {
                DkError::internal(err.to_string())
            }
        }
    }
}
