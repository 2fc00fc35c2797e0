// crates/dk_workflow/tests/common/mod.rs

//! 集成测试共用的剖面、风暴过程和测试模型

#![allow(dead_code)]

use dk_core::{
    CalculationInput, CalculationInputBuilder, CharacteristicPointType, DamageModel,
    InitializedModel, IntervalContext, IntervalDetails, IntervalResult, LoadInterval,
    LocationProperties, ModelError, ProfileGeometry,
};
use dk_foundation::{DiagnosticsSink, ValidationReport};
use std::time::Duration;

// ============================================================
// 剖面与载荷
// ============================================================

/// 1:4 外坡，坡脚 x=0，堤顶 x=30 (z=7.5)
pub fn dike_builder() -> CalculationInputBuilder {
    CalculationInputBuilder::new()
        .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
        .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
        .unwrap()
        .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
        .unwrap()
}

/// 水位从 1.5 m 涨到 3.5 m 再回落的风暴过程，每小时一个时段
pub fn storm(builder: CalculationInputBuilder, hours: usize) -> CalculationInputBuilder {
    let times: Vec<f64> = (0..=hours).map(|h| h as f64 * 3600.0).collect();
    let loads: Vec<(f64, f64, f64, f64)> = (0..hours)
        .map(|h| {
            let phase = h as f64 / hours.max(1) as f64 * std::f64::consts::PI;
            let surge = phase.sin();
            (1.5 + 2.0 * surge, 0.5 + 1.0 * surge, 4.0 + 2.0 * surge, 10.0 * h as f64 % 60.0)
        })
        .collect();
    builder.add_load_series(&times, &loads)
}

/// 构建输入（失败时 panic）
pub fn build(builder: CalculationInputBuilder) -> CalculationInput {
    builder.build(&DiagnosticsSink::new()).unwrap()
}

// ============================================================
// 测试模型
// ============================================================

#[derive(Debug)]
pub struct Fixed;

impl IntervalDetails for Fixed {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }

    fn failure_duration(&self, _: f64, _: f64) -> f64 {
        0.0
    }
}

/// 行为可配置的测试模型
#[derive(Debug)]
pub struct ScriptedModel {
    pub properties: LocationProperties,
    pub stateful: bool,
    /// 每个时段的增量（循环使用）
    pub increments: Vec<f64>,
    /// 在该时段返回模型错误
    pub fail_at: Option<usize>,
    /// 在该时段 panic
    pub panic_at: Option<usize>,
    /// 每个时段的计算耗时
    pub delay: Duration,
}

impl ScriptedModel {
    pub fn new(x: f64, increments: Vec<f64>) -> Self {
        Self {
            properties: LocationProperties::new(x),
            stateful: false,
            increments,
            fail_at: None,
            panic_at: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing_at(mut self, interval: usize) -> Self {
        self.fail_at = Some(interval);
        self
    }

    pub fn panicking_at(mut self, interval: usize) -> Self {
        self.panic_at = Some(interval);
        self
    }

    pub fn stateful(mut self) -> Self {
        self.stateful = true;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl DamageModel for ScriptedModel {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn properties(&self) -> &LocationProperties {
        &self.properties
    }

    fn requires_sequential_intervals(&self) -> bool {
        self.stateful
    }

    fn validate(&self, _: usize, _: &ProfileGeometry, _: &mut ValidationReport) {}

    fn initialize(&self, geometry: &ProfileGeometry) -> Result<Box<dyn InitializedModel>, ModelError> {
        let z = geometry
            .vertical_height(self.properties.x)
            .ok_or(ModelError::OutsideProfile(self.properties.x))?;
        Ok(Box::new(InitializedScripted {
            z,
            stateful: self.stateful,
            increments: self.increments.clone(),
            fail_at: self.fail_at,
            panic_at: self.panic_at,
            delay: self.delay,
        }))
    }
}

#[derive(Debug)]
struct InitializedScripted {
    z: f64,
    stateful: bool,
    increments: Vec<f64>,
    fail_at: Option<usize>,
    panic_at: Option<usize>,
    delay: Duration,
}

impl InitializedModel for InitializedScripted {
    fn z(&self) -> f64 {
        self.z
    }

    fn compute_interval(
        &self,
        _: &LoadInterval,
        context: IntervalContext,
    ) -> Result<IntervalResult, ModelError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.stateful && context.damage_at_start.is_none() {
            return Err(ModelError::MissingDamageAtStart("scripted"));
        }
        if self.fail_at == Some(context.index) {
            return Err(ModelError::Numeric(format!("scripted failure at {}", context.index)));
        }
        if self.panic_at == Some(context.index) {
            panic!("scripted panic at {}", context.index);
        }
        let increment = self.increments[context.index % self.increments.len()];
        Ok(IntervalResult::new(increment, Fixed))
    }
}
