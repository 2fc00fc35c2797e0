// crates/dk_core/src/lib.rs

//! DikeKernel Core Layer (Layer 1)
//!
//! 核心层：剖面几何、载荷时段、损伤模型能力接口、计算输入构建与校验，
//! 以及位置结果与失效时刻推导。
//!
//! # 数据流
//!
//! ```text
//! CalculationInputBuilder --build--> CalculationInput --validate--> ValidationOutcome
//!                                          |
//!                                  (dk_workflow 计算引擎)
//!                                          v
//!                                   LocationResult --> FailureInstant
//! ```
//!
//! 本层不包含任何具体护面公式，具体模型位于 `dk_models`。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod input;
pub mod load;
pub mod model;
pub mod result;
pub mod validator;

pub use error::{BuildError, ModelError};
pub use geometry::{
    CharacteristicPoint, CharacteristicPointType, Foreshore, ProfileGeometry, ProfilePoint,
    ProfileSegment,
};
pub use input::{CalculationInput, CalculationInputBuilder};
pub use load::LoadInterval;
pub use model::{
    DamageModel, InitializedModel, IntervalContext, IntervalDetails, IntervalResult,
    LocationProperties,
};
pub use result::{FailureInstant, LocationResult, LocationSummary};
pub use validator::{validate, ValidationOutcome};

/// Prelude 模块
pub mod prelude {
    pub use crate::error::{BuildError, ModelError};
    pub use crate::geometry::{CharacteristicPointType, ProfileGeometry, ProfilePoint};
    pub use crate::input::{CalculationInput, CalculationInputBuilder};
    pub use crate::load::LoadInterval;
    pub use crate::model::{
        DamageModel, InitializedModel, IntervalContext, IntervalDetails, IntervalResult,
        LocationProperties,
    };
    pub use crate::result::{FailureInstant, LocationResult};
    pub use crate::validator::{validate, ValidationOutcome};
}
