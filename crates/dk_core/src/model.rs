// crates/dk_core/src/model.rs

//! 护面损伤模型能力接口
//!
//! 每类护面（块石、草皮、沥青……）实现一组固定能力，计算引擎只依赖这些 trait：
//!
//! | 能力 | 接口 |
//! |------|------|
//! | 业务规则校验 | [`DamageModel::validate`] |
//! | 派生状态初始化（一次） | [`DamageModel::initialize`] |
//! | 是否要求顺序计算时段 | [`DamageModel::requires_sequential_intervals`] |
//! | 单时段计算 | [`InitializedModel::compute_interval`] |
//! | 时段内失效历时 | [`IntervalDetails::failure_duration`] |
//!
//! # 两阶段生命周期
//!
//! ```text
//! DamageModel (Uninitialized) --initialize(geometry)--> Box<dyn InitializedModel> (Initialized)
//! ```
//!
//! 只有 `initialize` 能产出 [`InitializedModel`]，因此在派生状态写入之前
//! 无法调用 `compute_interval`。派生状态只写一次，之后通过 `&self` 只读共享。

use crate::error::ModelError;
use crate::geometry::ProfileGeometry;
use crate::load::LoadInterval;
use dk_foundation::ValidationReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 计算位置的通用属性
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationProperties {
    /// 剖面上的水平位置 [m]
    pub x: f64,
    /// 初始损伤
    #[serde(default)]
    pub initial_damage: f64,
    /// 失效损伤值
    #[serde(default = "default_failure_number")]
    pub failure_number: f64,
}

fn default_failure_number() -> f64 {
    1.0
}

impl LocationProperties {
    /// 创建属性（初始损伤 0，失效值 1）
    pub fn new(x: f64) -> Self {
        Self {
            x,
            initial_damage: 0.0,
            failure_number: default_failure_number(),
        }
    }

    /// 设置初始损伤
    pub fn with_initial_damage(mut self, initial_damage: f64) -> Self {
        self.initial_damage = initial_damage;
        self
    }

    /// 设置失效损伤值
    pub fn with_failure_number(mut self, failure_number: f64) -> Self {
        self.failure_number = failure_number;
        self
    }
}

/// 损伤模型（未初始化状态）
pub trait DamageModel: Send + Sync + fmt::Debug {
    /// 模型名称
    fn name(&self) -> &'static str;

    /// 位置通用属性
    fn properties(&self) -> &LocationProperties;

    /// 单时段计算是否依赖此前累计的损伤（有状态模型）
    fn requires_sequential_intervals(&self) -> bool;

    /// 业务规则校验，结果写入报告
    fn validate(&self, index: usize, geometry: &ProfileGeometry, report: &mut ValidationReport);

    /// 由剖面几何计算派生状态，每个位置只调用一次
    fn initialize(&self, geometry: &ProfileGeometry) -> Result<Box<dyn InitializedModel>, ModelError>;
}

/// 单时段计算的上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalContext {
    /// 时段序号
    pub index: usize,
    /// 时段起始累计损伤（并行计算无状态模型时为 None）
    pub damage_at_start: Option<f64>,
    /// 上一时段的原始增量损伤（可能为 NaN）
    pub previous_increment: Option<f64>,
}

impl IntervalContext {
    /// 顺序计算上下文
    pub fn sequential(index: usize, damage_at_start: f64, previous_increment: Option<f64>) -> Self {
        Self {
            index,
            damage_at_start: Some(damage_at_start),
            previous_increment,
        }
    }

    /// 并行计算上下文（无累计损伤信息）
    pub fn independent(index: usize) -> Self {
        Self {
            index,
            damage_at_start: None,
            previous_increment: None,
        }
    }
}

/// 已初始化的损伤模型，持有只读派生状态
pub trait InitializedModel: Send + Sync + fmt::Debug {
    /// 计算位置的高程 [m]
    fn z(&self) -> f64;

    /// 计算单个时段的增量损伤
    fn compute_interval(
        &self,
        interval: &LoadInterval,
        context: IntervalContext,
    ) -> Result<IntervalResult, ModelError>;
}

/// 单时段的模型专有诊断量
pub trait IntervalDetails: Send + Sync + fmt::Debug {
    /// 诊断字段（名称, 值）
    fn fields(&self) -> Vec<(&'static str, f64)>;

    /// 从时段开始到损伤达到 `failure_number` 的历时 [s]
    ///
    /// 只使用本时段保存的诊断量，按模型自身的退化关系反算。
    fn failure_duration(&self, damage_at_start: f64, failure_number: f64) -> f64;
}

/// 单位置单时段的计算结果（生成后不可变）
#[derive(Debug, Clone)]
pub struct IntervalResult {
    /// 增量损伤，NaN 表示本时段未加载
    pub increment_damage: f64,
    /// 模型专有诊断量
    pub details: Arc<dyn IntervalDetails>,
}

impl IntervalResult {
    /// 创建结果
    pub fn new(increment_damage: f64, details: impl IntervalDetails + 'static) -> Self {
        Self {
            increment_damage,
            details: Arc::new(details),
        }
    }

    /// 未加载时段
    pub fn not_loaded(details: impl IntervalDetails + 'static) -> Self {
        Self::new(dk_foundation::float::NOT_LOADED, details)
    }

    /// 本时段是否对护面加载
    pub fn is_loaded(&self) -> bool {
        !self.increment_damage.is_nan()
    }

    /// 诊断字段
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        self.details.fields()
    }
}
