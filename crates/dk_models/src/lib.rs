// crates/dk_models/src/lib.rs

//! DikeKernel Revetment Models (Layer 2)
//!
//! 具体护面损伤模型，每类护面一个模块，均实现 `dk_core` 的能力接口：
//!
//! | 模块 | 护面 | 时段计算 |
//! |------|------|----------|
//! | [`natural_stone`] | 块石 | 有状态，必须顺序 |
//! | [`grass_wave_impact`] | 草皮（波浪冲击） | 无状态，可并行 |
//! | [`asphalt_wave_impact`] | 沥青（波浪冲击疲劳） | 无状态，可并行 |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod asphalt_wave_impact;
pub mod common;
pub mod grass_wave_impact;
pub mod natural_stone;

pub use asphalt_wave_impact::{AsphaltWaveImpactLocation, AsphaltWaveImpactProperties};
pub use grass_wave_impact::{GrassWaveImpactLocation, GrassWaveImpactProperties};
pub use natural_stone::{NaturalStoneLocation, NaturalStoneProperties};

use dk_core::{DamageModel, LocationProperties};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 护面类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevetmentKind {
    /// 块石
    NaturalStone,
    /// 草皮波浪冲击
    GrassWaveImpact,
    /// 沥青波浪冲击
    AsphaltWaveImpact,
}

impl RevetmentKind {
    /// 全部护面类型
    pub const ALL: [RevetmentKind; 3] = [
        Self::NaturalStone,
        Self::GrassWaveImpact,
        Self::AsphaltWaveImpact,
    ];

    /// 模型名称
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::NaturalStone => natural_stone::MODEL_NAME,
            Self::GrassWaveImpact => grass_wave_impact::MODEL_NAME,
            Self::AsphaltWaveImpact => asphalt_wave_impact::MODEL_NAME,
        }
    }

    /// 简要说明
    pub fn description(&self) -> &'static str {
        match self {
            Self::NaturalStone => "块石护面，损伤按非线性退化累积",
            Self::GrassWaveImpact => "草皮护面，波浪冲击时间线",
            Self::AsphaltWaveImpact => "沥青护面，Miner 疲劳累积",
        }
    }

    /// 时段是否必须顺序计算
    pub fn is_stateful(&self) -> bool {
        matches!(self, Self::NaturalStone)
    }

    /// 以默认构造参数创建计算位置
    pub fn create_location(&self, location: LocationProperties) -> Box<dyn DamageModel> {
        match self {
            Self::NaturalStone => Box::new(NaturalStoneLocation::new(
                location,
                NaturalStoneProperties::default(),
            )),
            Self::GrassWaveImpact => Box::new(GrassWaveImpactLocation::new(
                location,
                GrassWaveImpactProperties::default(),
            )),
            Self::AsphaltWaveImpact => Box::new(AsphaltWaveImpactLocation::new(
                location,
                AsphaltWaveImpactProperties::default(),
            )),
        }
    }
}

impl fmt::Display for RevetmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_name())
    }
}

impl FromStr for RevetmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.model_name() == normalized)
            .ok_or_else(|| format!("未知护面类型: {}", s))
    }
}

/// 计算位置配置（带类型标签，可从 JSON 反序列化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationConfig {
    /// 块石
    NaturalStone {
        /// 位置通用属性
        location: LocationProperties,
        /// 构造参数
        #[serde(default)]
        construction: NaturalStoneProperties,
    },
    /// 草皮波浪冲击
    GrassWaveImpact {
        /// 位置通用属性
        location: LocationProperties,
        /// 构造参数
        #[serde(default)]
        construction: GrassWaveImpactProperties,
    },
    /// 沥青波浪冲击
    AsphaltWaveImpact {
        /// 位置通用属性
        location: LocationProperties,
        /// 构造参数
        #[serde(default)]
        construction: AsphaltWaveImpactProperties,
    },
}

impl LocationConfig {
    /// 转换为计算位置
    pub fn into_model(self) -> Box<dyn DamageModel> {
        match self {
            Self::NaturalStone {
                location,
                construction,
            } => Box::new(NaturalStoneLocation::new(location, construction)),
            Self::GrassWaveImpact {
                location,
                construction,
            } => Box::new(GrassWaveImpactLocation::new(location, construction)),
            Self::AsphaltWaveImpact {
                location,
                construction,
            } => Box::new(AsphaltWaveImpactLocation::new(location, construction)),
        }
    }
}
