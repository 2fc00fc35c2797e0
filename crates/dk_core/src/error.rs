// crates/dk_core/src/error.rs

//! 核心层错误类型
//!
//! - [`BuildError`]: 输入构建失败（结构性错误）
//! - [`ModelError`]: 模型初始化或单时段计算失败

use crate::geometry::CharacteristicPointType;
use dk_foundation::{DiagnosticEvent, DkError};
use thiserror::Error;

/// 构建错误
#[derive(Debug, Error)]
pub enum BuildError {
    /// 同一类型的特征点被重复添加
    #[error("特征点重复: {0}")]
    DuplicateCharacteristicPoint(CharacteristicPointType),

    /// 结构验证失败，携带全部诊断事件
    #[error("输入构建失败: {} 个错误", error_count(.events))]
    Invalid {
        /// 构建阶段产生的事件
        events: Vec<DiagnosticEvent>,
    },
}

fn error_count(events: &[DiagnosticEvent]) -> usize {
    events.iter().filter(|e| e.is_error()).count()
}

impl BuildError {
    /// 构建阶段的诊断事件
    pub fn events(&self) -> &[DiagnosticEvent] {
        match self {
            Self::Invalid { events } => events,
            Self::DuplicateCharacteristicPoint(_) => &[],
        }
    }
}

/// 模型错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// 计算位置不在剖面上
    #[error("位置 x={0} 不在剖面范围内")]
    OutsideProfile(f64),

    /// 有状态模型缺少时段起始损伤
    #[error("模型 {0} 需要时段起始累计损伤")]
    MissingDamageAtStart(&'static str),

    /// 数值计算失败
    #[error("数值计算失败: {0}")]
    Numeric(String),
}

impl From<BuildError> for DkError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::DuplicateCharacteristicPoint(_) => DkError::invalid_input(err.to_string()),
            BuildError::Invalid { .. } => DkError::validation(err.to_string()),
        }
    }
}

impl From<ModelError> for DkError {
    fn from(err: ModelError) -> Self {
        DkError::computation(err.to_string())
    }
}
