// crates/dk_models/src/grass_wave_impact.rs

//! 草皮护面波浪冲击损伤模型（无状态）
//!
//! ```text
//! 冲击波高  H  = γβ · Hs
//! 时间线    tL = clamp(ln((H - c) / a) / b, t_min, t_max)
//! 增量损伤  ΔD = Δt / tL
//! ```
//!
//! 单时段增量与此前累计损伤无关，时段可以并行计算。

use crate::common::{check_on_outer_slope, in_loading_zone, wave_angle_impact};
use dk_core::{
    DamageModel, InitializedModel, IntervalContext, IntervalDetails, IntervalResult, LoadInterval,
    LocationProperties, ModelError, ProfileGeometry,
};
use dk_foundation::validation::{check_positive, check_range};
use dk_foundation::{ValidationIssue, ValidationReport};
use serde::{Deserialize, Serialize};

/// 模型名称
pub const MODEL_NAME: &str = "grass_wave_impact";

/// 草皮护面构造参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrassWaveImpactProperties {
    /// 时间线系数 a [m]
    #[serde(default = "default_time_line_a")]
    pub time_line_a: f64,

    /// 时间线系数 b [1/s]
    #[serde(default = "default_time_line_b")]
    pub time_line_b: f64,

    /// 时间线系数 c [m]
    #[serde(default = "default_time_line_c")]
    pub time_line_c: f64,

    /// 时间线下限 [s]
    #[serde(default = "default_min_time")]
    pub min_time: f64,

    /// 时间线上限 [s]
    #[serde(default = "default_max_time")]
    pub max_time: f64,

    /// 受力区下限系数（水位以下 ×Hs）
    #[serde(default = "default_lower_limit")]
    pub lower_limit_factor: f64,

    /// 受力区上限系数（水位以上 ×Hs）
    #[serde(default)]
    pub upper_limit_factor: f64,

    /// 斜向入射最大角度 [°]
    #[serde(default = "default_max_wave_angle")]
    pub max_wave_angle: f64,

    /// 斜向入射折减指数
    #[serde(default = "default_wave_angle_exponent")]
    pub wave_angle_exponent: f64,
}

fn default_time_line_a() -> f64 { 1.0 }
fn default_time_line_b() -> f64 { -0.000009722 }
fn default_time_line_c() -> f64 { 0.25 }
fn default_min_time() -> f64 { 3.6 }
fn default_max_time() -> f64 { 1e6 }
fn default_lower_limit() -> f64 { 0.5 }
fn default_max_wave_angle() -> f64 { 90.0 }
fn default_wave_angle_exponent() -> f64 { 1.0 }

impl Default for GrassWaveImpactProperties {
    fn default() -> Self {
        Self {
            time_line_a: default_time_line_a(),
            time_line_b: default_time_line_b(),
            time_line_c: default_time_line_c(),
            min_time: default_min_time(),
            max_time: default_max_time(),
            lower_limit_factor: default_lower_limit(),
            upper_limit_factor: 0.0,
            max_wave_angle: default_max_wave_angle(),
            wave_angle_exponent: default_wave_angle_exponent(),
        }
    }
}

impl GrassWaveImpactProperties {
    /// 冲击波高 H 对应的时间线 [s]
    ///
    /// H 不超过 c 时草皮不会破坏，取上限。
    pub fn time_line(&self, wave_height_impact: f64) -> f64 {
        let ratio = (wave_height_impact - self.time_line_c) / self.time_line_a;
        if ratio <= 0.0 {
            return self.max_time;
        }
        let t = ratio.ln() / self.time_line_b;
        if t.is_nan() {
            self.max_time
        } else {
            t.clamp(self.min_time, self.max_time)
        }
    }
}

/// 草皮护面计算位置
#[derive(Debug, Clone)]
pub struct GrassWaveImpactLocation {
    location: LocationProperties,
    construction: GrassWaveImpactProperties,
}

impl GrassWaveImpactLocation {
    /// 创建位置
    pub fn new(location: LocationProperties, construction: GrassWaveImpactProperties) -> Self {
        Self {
            location,
            construction,
        }
    }

    /// 使用默认构造参数
    pub fn with_defaults(x: f64) -> Self {
        Self::new(LocationProperties::new(x), GrassWaveImpactProperties::default())
    }
}

impl DamageModel for GrassWaveImpactLocation {
    fn name(&self) -> &'static str {
        MODEL_NAME
    }

    fn properties(&self) -> &LocationProperties {
        &self.location
    }

    fn requires_sequential_intervals(&self) -> bool {
        false
    }

    fn validate(&self, index: usize, geometry: &ProfileGeometry, report: &mut ValidationReport) {
        let c = &self.construction;
        let id = Some(index);
        check_positive(report, "time_line_a", id, c.time_line_a);
        if !(c.time_line_b < 0.0) {
            report.add_error(ValidationIssue::new(
                id,
                format!("字段time_line_b={} 必须小于 0", c.time_line_b),
            ));
        }
        check_range(report, "time_line_c", id, c.time_line_c, 0.0, f64::MAX);
        if check_positive(report, "min_time", id, c.min_time) && !(c.min_time < c.max_time) {
            report.add_error(ValidationIssue::new(
                id,
                format!("时间线下限 {} 必须小于上限 {}", c.min_time, c.max_time),
            ));
        }
        check_range(report, "lower_limit_factor", id, c.lower_limit_factor, 0.0, f64::MAX);
        check_range(report, "upper_limit_factor", id, c.upper_limit_factor, 0.0, f64::MAX);
        check_range(report, "max_wave_angle", id, c.max_wave_angle, 0.0, 90.0);
        check_on_outer_slope(self, index, geometry, report);
    }

    fn initialize(&self, geometry: &ProfileGeometry) -> Result<Box<dyn InitializedModel>, ModelError> {
        let x = self.location.x;
        let z = geometry
            .vertical_height(x)
            .ok_or(ModelError::OutsideProfile(x))?;

        Ok(Box::new(InitializedGrass {
            construction: self.construction.clone(),
            z,
            orientation: geometry.orientation(),
        }))
    }
}

#[derive(Debug)]
struct InitializedGrass {
    construction: GrassWaveImpactProperties,
    z: f64,
    orientation: f64,
}

impl InitializedModel for InitializedGrass {
    fn z(&self) -> f64 {
        self.z
    }

    fn compute_interval(
        &self,
        interval: &LoadInterval,
        _context: IntervalContext,
    ) -> Result<IntervalResult, ModelError> {
        let c = &self.construction;
        let angle_impact = wave_angle_impact(
            interval.wave_angle(self.orientation),
            c.max_wave_angle,
            c.wave_angle_exponent,
        );
        let wave_height_impact = angle_impact * interval.wave_height;

        let loading = interval.wave_height > 0.0
            && in_loading_zone(
                self.z,
                interval.water_level,
                interval.wave_height,
                c.lower_limit_factor,
                c.upper_limit_factor,
            );

        if !loading {
            return Ok(IntervalResult::not_loaded(GrassWaveImpactDetails {
                loading,
                wave_angle_impact: angle_impact,
                wave_height_impact,
                time_line: f64::NAN,
            }));
        }

        let time_line = c.time_line(wave_height_impact);
        Ok(IntervalResult::new(
            interval.duration() / time_line,
            GrassWaveImpactDetails {
                loading,
                wave_angle_impact: angle_impact,
                wave_height_impact,
                time_line,
            },
        ))
    }
}

/// 草皮护面单时段诊断量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrassWaveImpactDetails {
    /// 本时段是否受力
    pub loading: bool,
    /// 斜向入射折减系数 γβ
    pub wave_angle_impact: f64,
    /// 冲击波高 H [m]
    pub wave_height_impact: f64,
    /// 时间线 [s]
    pub time_line: f64,
}

impl IntervalDetails for GrassWaveImpactDetails {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("loading", if self.loading { 1.0 } else { 0.0 }),
            ("wave_angle_impact", self.wave_angle_impact),
            ("wave_height_impact", self.wave_height_impact),
            ("time_line", self.time_line),
        ]
    }

    fn failure_duration(&self, damage_at_start: f64, failure_number: f64) -> f64 {
        (failure_number - damage_at_start) * self.time_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_foundation::float::approx_eq;
    use dk_core::{CalculationInputBuilder, CharacteristicPointType};
    use dk_foundation::DiagnosticsSink;

    fn geometry() -> ProfileGeometry {
        CalculationInputBuilder::new()
            .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
            .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
            .unwrap()
            .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
            .unwrap()
            .add_load_interval(LoadInterval::new(0.0, 1.0, 0.0, 0.0, 0.0, 0.0))
            .add_location(GrassWaveImpactLocation::with_defaults(10.0))
            .build(&DiagnosticsSink::new())
            .unwrap()
            .geometry()
            .clone()
    }

    #[test]
    fn test_time_line() {
        let props = GrassWaveImpactProperties::default();
        // ln(0.75) / -9.722e-6 ≈ 29591 s
        assert!(approx_eq(props.time_line(1.0), 29591.0, 1.0));
        assert_eq!(props.time_line(0.2), props.max_time);
        assert_eq!(props.time_line(1e6), props.min_time);
    }

    #[test]
    fn test_increment_is_duration_over_time_line() {
        let model = GrassWaveImpactLocation::with_defaults(10.0)
            .initialize(&geometry())
            .unwrap();
        // z = 2.5，受力区 [wl - 0.5, wl]
        let interval = LoadInterval::new(0.0, 3600.0, 2.6, 1.0, 5.0, 0.0);
        let result = model
            .compute_interval(&interval, IntervalContext::independent(3))
            .unwrap();

        let time_line = GrassWaveImpactProperties::default().time_line(1.0);
        assert!(approx_eq(result.increment_damage, 3600.0 / time_line, 1e-12));
        assert!(approx_eq(result.details.failure_duration(0.5, 0.6), 0.1 * time_line, 1e-9));
    }

    #[test]
    fn test_stateless_result_ignores_context() {
        let model = GrassWaveImpactLocation::with_defaults(10.0)
            .initialize(&geometry())
            .unwrap();
        let interval = LoadInterval::new(0.0, 3600.0, 2.6, 1.0, 5.0, 30.0);

        let a = model
            .compute_interval(&interval, IntervalContext::independent(0))
            .unwrap();
        let b = model
            .compute_interval(&interval, IntervalContext::sequential(0, 0.7, Some(0.1)))
            .unwrap();
        assert_eq!(a.increment_damage.to_bits(), b.increment_damage.to_bits());
    }

    #[test]
    fn test_above_water_level_not_loaded() {
        let model = GrassWaveImpactLocation::with_defaults(10.0)
            .initialize(&geometry())
            .unwrap();
        let interval = LoadInterval::new(0.0, 3600.0, 2.0, 1.0, 5.0, 0.0);
        let result = model
            .compute_interval(&interval, IntervalContext::independent(0))
            .unwrap();
        assert!(!result.is_loaded());
    }

    #[test]
    fn test_validate_time_line_bounds() {
        let construction = GrassWaveImpactProperties {
            min_time: 10.0,
            max_time: 5.0,
            ..Default::default()
        };
        let model = GrassWaveImpactLocation::new(LocationProperties::new(10.0), construction);
        let mut report = ValidationReport::new();
        model.validate(0, &geometry(), &mut report);
        assert_eq!(report.errors.len(), 1);
    }
}
