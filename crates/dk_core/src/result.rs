// crates/dk_core/src/result.rs

//! 位置计算结果与失效时刻推导
//!
//! [`LocationResult`] 保存一个位置全部时段的结果（按时段序号排列）和推导
//! 累计损伤、失效时刻所需的静态信息。
//!
//! # 失效时刻状态机
//!
//! ```text
//! 任一累计损伤为 NaN           -> Indeterminate
//! 存在首个 i: D_start(i) < Df <= D_end(i)
//!                             -> FailedAt(begin(i) + 模型反算历时)
//! 否则                         -> NoFailure
//! ```

use crate::load::LoadInterval;
use crate::model::{IntervalResult, LocationProperties};
use dk_foundation::float::contribution;
use serde::Serialize;

/// 失效时刻推导结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "time", rename_all = "snake_case")]
pub enum FailureInstant {
    /// 模拟时段内未失效
    NoFailure,
    /// 在给定时刻失效 [s]
    FailedAt(f64),
    /// 累计损伤序列中存在 NaN，无法推导
    Indeterminate,
}

impl FailureInstant {
    /// 失效时刻（未失效或不可推导时为 None）
    pub fn time(&self) -> Option<f64> {
        match self {
            Self::FailedAt(t) => Some(*t),
            Self::NoFailure | Self::Indeterminate => None,
        }
    }

    /// 是否失效
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::FailedAt(_))
    }
}

/// 按时段累加增量损伤，得到各时段结束时的累计损伤
///
/// `damage[i] = damage[i-1] + (NaN ? 0 : increment[i])`，`damage[-1] = initial_damage`。
pub fn accumulate_damage(initial_damage: f64, increments: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut damage = initial_damage;
    increments
        .into_iter()
        .map(|increment| {
            damage += contribution(increment);
            damage
        })
        .collect()
}

/// 失效时刻推导
///
/// - `bounds[i]`: 第 i 个时段的 (开始, 结束) 时间
/// - `damages[i]`: 第 i 个时段结束时的累计损伤
/// - `duration(i, damage_at_start)`: 模型反算的时段内失效历时
pub fn derive_failure_instant<F>(
    initial_damage: f64,
    failure_number: f64,
    bounds: &[(f64, f64)],
    damages: &[f64],
    duration: F,
) -> FailureInstant
where
    F: Fn(usize, f64) -> f64,
{
    if initial_damage.is_nan() || damages.iter().any(|d| d.is_nan()) {
        return FailureInstant::Indeterminate;
    }

    let mut damage_at_start = initial_damage;
    for (i, (&damage_at_end, &(begin_time, _))) in damages.iter().zip(bounds).enumerate() {
        if damage_at_start < failure_number && failure_number <= damage_at_end {
            let elapsed = duration(i, damage_at_start);
            if !elapsed.is_finite() {
                return FailureInstant::Indeterminate;
            }
            return FailureInstant::FailedAt(begin_time + elapsed);
        }
        damage_at_start = damage_at_end;
    }

    FailureInstant::NoFailure
}

/// 单个位置的计算结果（不可变）
#[derive(Debug, Clone)]
pub struct LocationResult {
    index: usize,
    model_name: &'static str,
    properties: LocationProperties,
    z: f64,
    interval_results: Vec<IntervalResult>,
    damages: Vec<f64>,
    bounds: Vec<(f64, f64)>,
}

impl LocationResult {
    /// 由按序排列的时段结果组装
    pub fn new(
        index: usize,
        model_name: &'static str,
        properties: LocationProperties,
        z: f64,
        intervals: &[LoadInterval],
        interval_results: Vec<IntervalResult>,
    ) -> Self {
        let damages = accumulate_damage(
            properties.initial_damage,
            interval_results.iter().map(|r| r.increment_damage),
        );
        let bounds = intervals
            .iter()
            .map(|i| (i.begin_time, i.end_time))
            .collect();
        Self {
            index,
            model_name,
            properties,
            z,
            interval_results,
            damages,
            bounds,
        }
    }

    /// 位置序号
    pub fn index(&self) -> usize {
        self.index
    }

    /// 模型名称
    pub fn model_name(&self) -> &'static str {
        self.model_name
    }

    /// 位置属性
    pub fn properties(&self) -> &LocationProperties {
        &self.properties
    }

    /// 位置高程 [m]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// 各时段结果
    pub fn interval_results(&self) -> &[IntervalResult] {
        &self.interval_results
    }

    /// 各时段结束时的累计损伤
    pub fn cumulative_damages(&self) -> &[f64] {
        &self.damages
    }

    /// 第 i 个时段开始时的累计损伤
    pub fn damage_at_start(&self, i: usize) -> Option<f64> {
        match i {
            0 => Some(self.properties.initial_damage),
            _ => self.damages.get(i - 1).copied(),
        }
    }

    /// 最终累计损伤
    pub fn final_damage(&self) -> f64 {
        self.damages
            .last()
            .copied()
            .unwrap_or(self.properties.initial_damage)
    }

    /// 失效时刻
    pub fn failure_instant(&self) -> FailureInstant {
        derive_failure_instant(
            self.properties.initial_damage,
            self.properties.failure_number,
            &self.bounds,
            &self.damages,
            |i, damage_at_start| {
                self.interval_results[i]
                    .details
                    .failure_duration(damage_at_start, self.properties.failure_number)
            },
        )
    }

    /// 失效时刻（未失效或不可推导时为 None）
    pub fn get_failure_instant(&self) -> Option<f64> {
        self.failure_instant().time()
    }

    /// 输出摘要
    pub fn summary(&self) -> LocationSummary {
        let failure = self.failure_instant();
        LocationSummary {
            index: self.index,
            model: self.model_name,
            x: self.properties.x,
            z: self.z,
            initial_damage: self.properties.initial_damage,
            final_damage: self.final_damage(),
            failure_number: self.properties.failure_number,
            failed: failure.is_failed(),
            failure,
        }
    }
}

/// 位置结果摘要（供输出前端序列化）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    /// 位置序号
    pub index: usize,
    /// 模型名称
    pub model: &'static str,
    /// 水平位置 [m]
    pub x: f64,
    /// 高程 [m]
    pub z: f64,
    /// 初始损伤
    pub initial_damage: f64,
    /// 最终累计损伤
    pub final_damage: f64,
    /// 失效损伤值
    pub failure_number: f64,
    /// 是否失效
    pub failed: bool,
    /// 失效时刻推导结果
    pub failure: FailureInstant,
}
