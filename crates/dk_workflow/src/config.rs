// crates/dk_workflow/src/config.rs

//! 计算引擎配置

use crate::error::CalculatorError;
use dk_foundation::DkError;
use serde::{Deserialize, Serialize};

/// 并发模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concurrency {
    /// 顺序执行
    #[default]
    Sequential,
    /// 并行执行
    Parallel,
}

impl Concurrency {
    /// 是否并行
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel)
    }
}

impl std::fmt::Display for Concurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for Concurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            other => Err(format!("未知并发模式: {}", other)),
        }
    }
}

/// 计算引擎配置
///
/// 时段并发是整个运行的统一设置，对所有位置生效。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// 位置级并发
    #[serde(default = "default_location_concurrency")]
    pub location_concurrency: Concurrency,

    /// 时段级并发（仅对无状态模型有效）
    #[serde(default)]
    pub interval_concurrency: Concurrency,

    /// 线程数（0 = 自动）
    #[serde(default)]
    pub num_threads: usize,

    /// 每完成 N 个位置-时段发送一次进度事件（0 = 禁用）
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

fn default_location_concurrency() -> Concurrency { Concurrency::Parallel }
fn default_progress_interval() -> usize { 100 }

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            location_concurrency: default_location_concurrency(),
            interval_concurrency: Concurrency::Sequential,
            num_threads: 0,
            progress_interval: default_progress_interval(),
        }
    }
}

impl CalculatorConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 完全顺序执行
    pub fn sequential() -> Self {
        Self {
            location_concurrency: Concurrency::Sequential,
            interval_concurrency: Concurrency::Sequential,
            ..Default::default()
        }
    }

    /// 设置位置级并发
    pub fn with_location_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.location_concurrency = concurrency;
        self
    }

    /// 设置时段级并发
    pub fn with_interval_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.interval_concurrency = concurrency;
        self
    }

    /// 设置线程数
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// 设置进度事件间隔
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), CalculatorError> {
        const MAX_THREADS: usize = 1024;
        DkError::check_range("num_threads", self.num_threads as f64, 0.0, MAX_THREADS as f64)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CalculatorConfig::default();
        assert_eq!(config.location_concurrency, Concurrency::Parallel);
        assert_eq!(config.interval_concurrency, Concurrency::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CalculatorConfig =
            serde_json::from_str(r#"{ "interval_concurrency": "parallel" }"#).unwrap();
        assert_eq!(config.interval_concurrency, Concurrency::Parallel);
        assert_eq!(config.location_concurrency, Concurrency::Parallel);
        assert_eq!(config.progress_interval, 100);
    }

    #[test]
    fn test_invalid_thread_count() {
        let config = CalculatorConfig::new().with_num_threads(100_000);
        assert!(matches!(
            config.validate(),
            Err(CalculatorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_concurrency_from_str() {
        assert_eq!("Parallel".parse::<Concurrency>(), Ok(Concurrency::Parallel));
        assert_eq!("seq".parse::<Concurrency>(), Ok(Concurrency::Sequential));
        assert!("both".parse::<Concurrency>().is_err());
    }
}
