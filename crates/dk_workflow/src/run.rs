// crates/dk_workflow/src/run.rs

//! 计算运行标识与状态

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 计算运行唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// 创建新的运行ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 从UUID创建
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 获取内部UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 运行状态
///
/// ```text
/// NotStarted -> Running -> FinishedSuccessfully
///                       -> FinishedWithFailure
///                       -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// 尚未开始
    NotStarted,
    /// 运行中
    Running,
    /// 全部位置计算成功
    FinishedSuccessfully,
    /// 至少一个位置计算失败
    FinishedWithFailure,
    /// 被调用方取消
    Cancelled,
}

impl RunState {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FinishedSuccessfully | Self::FinishedWithFailure | Self::Cancelled
        )
    }

    /// 是否成功结束
    pub fn is_success(&self) -> bool {
        matches!(self, Self::FinishedSuccessfully)
    }

    /// 状态转换是否合法
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Running)
                | (Self::Running, Self::FinishedSuccessfully)
                | (Self::Running, Self::FinishedWithFailure)
                | (Self::Running, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NotStarted",
            Self::Running => "Running",
            Self::FinishedSuccessfully => "FinishedSuccessfully",
            Self::FinishedWithFailure => "FinishedWithFailure",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_roundtrip_str() {
        let id = RunId::new();
        let parsed: RunId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_state_transitions() {
        assert!(RunState::NotStarted.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::FinishedWithFailure));
        assert!(!RunState::NotStarted.can_transition_to(RunState::FinishedSuccessfully));
        assert!(!RunState::FinishedSuccessfully.can_transition_to(RunState::Running));
        assert!(RunState::Cancelled.is_terminal());
        assert!(!RunState::Running.is_terminal());
    }
}
