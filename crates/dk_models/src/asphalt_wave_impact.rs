// crates/dk_models/src/asphalt_wave_impact.rs

//! 沥青护面波浪冲击疲劳模型（无状态，Miner 线性累积）
//!
//! ```text
//! 冲击压力  p  = ρw · g · γβ · Hs
//! 弯拉应力  σ  = k · p · (Hs / h)²
//! 单波损伤  d  = 10^(-α) · (σ / σb)^β
//! 增量损伤  ΔD = (Δt / T) · d
//! ```

use crate::common::{
    check_on_outer_slope, in_loading_zone, wave_angle_impact, GRAVITY, WATER_DENSITY,
};
use dk_core::{
    DamageModel, InitializedModel, IntervalContext, IntervalDetails, IntervalResult, LoadInterval,
    LocationProperties, ModelError, ProfileGeometry,
};
use dk_foundation::validation::{check_positive, check_range};
use dk_foundation::ValidationReport;
use serde::{Deserialize, Serialize};

/// 模型名称
pub const MODEL_NAME: &str = "asphalt_wave_impact";

/// 沥青护面构造参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsphaltWaveImpactProperties {
    /// 弯拉强度 σb [MPa]
    #[serde(default = "default_failure_tension")]
    pub failure_tension: f64,

    /// 沥青层厚度 h [m]
    #[serde(default = "default_thickness")]
    pub thickness: f64,

    /// 疲劳系数 α
    #[serde(default = "default_fatigue_alpha")]
    pub fatigue_alpha: f64,

    /// 疲劳指数 β
    #[serde(default = "default_fatigue_beta")]
    pub fatigue_beta: f64,

    /// 应力系数 k
    #[serde(default = "default_stress_factor")]
    pub stress_factor: f64,

    /// 受力区下限系数（水位以下 ×Hs）
    #[serde(default = "default_lower_limit")]
    pub lower_limit_factor: f64,

    /// 受力区上限系数（水位以上 ×Hs）
    #[serde(default = "default_upper_limit")]
    pub upper_limit_factor: f64,

    /// 斜向入射最大角度 [°]
    #[serde(default = "default_max_wave_angle")]
    pub max_wave_angle: f64,
}

fn default_failure_tension() -> f64 { 1.6 }
fn default_thickness() -> f64 { 0.2 }
fn default_fatigue_alpha() -> f64 { 0.42 }
fn default_fatigue_beta() -> f64 { 4.76 }
fn default_stress_factor() -> f64 { 0.75 }
fn default_lower_limit() -> f64 { 1.0 }
fn default_upper_limit() -> f64 { 0.5 }
fn default_max_wave_angle() -> f64 { 78.0 }

impl Default for AsphaltWaveImpactProperties {
    fn default() -> Self {
        Self {
            failure_tension: default_failure_tension(),
            thickness: default_thickness(),
            fatigue_alpha: default_fatigue_alpha(),
            fatigue_beta: default_fatigue_beta(),
            stress_factor: default_stress_factor(),
            lower_limit_factor: default_lower_limit(),
            upper_limit_factor: default_upper_limit(),
            max_wave_angle: default_max_wave_angle(),
        }
    }
}

impl AsphaltWaveImpactProperties {
    /// 单个波浪的疲劳损伤
    pub fn damage_per_wave(&self, wave_height: f64, angle_impact: f64) -> f64 {
        let pressure = WATER_DENSITY * GRAVITY * angle_impact * wave_height;
        let stress = self.stress_factor * pressure * (wave_height / self.thickness).powi(2) / 1e6;
        10f64.powf(-self.fatigue_alpha) * (stress / self.failure_tension).powf(self.fatigue_beta)
    }
}

/// 沥青护面计算位置
#[derive(Debug, Clone)]
pub struct AsphaltWaveImpactLocation {
    location: LocationProperties,
    construction: AsphaltWaveImpactProperties,
}

impl AsphaltWaveImpactLocation {
    /// 创建位置
    pub fn new(location: LocationProperties, construction: AsphaltWaveImpactProperties) -> Self {
        Self {
            location,
            construction,
        }
    }

    /// 使用默认构造参数
    pub fn with_defaults(x: f64) -> Self {
        Self::new(LocationProperties::new(x), AsphaltWaveImpactProperties::default())
    }
}

impl DamageModel for AsphaltWaveImpactLocation {
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
        check_positive(report, "failure_tension", id, c.failure_tension);
        check_positive(report, "thickness", id, c.thickness);
        check_positive(report, "fatigue_beta", id, c.fatigue_beta);
        check_positive(report, "stress_factor", id, c.stress_factor);
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

        Ok(Box::new(InitializedAsphalt {
            construction: self.construction.clone(),
            z,
            orientation: geometry.orientation(),
        }))
    }
}

#[derive(Debug)]
struct InitializedAsphalt {
    construction: AsphaltWaveImpactProperties,
    z: f64,
    orientation: f64,
}

impl InitializedModel for InitializedAsphalt {
    fn z(&self) -> f64 {
        self.z
    }

    fn compute_interval(
        &self,
        interval: &LoadInterval,
        context: IntervalContext,
    ) -> Result<IntervalResult, ModelError> {
        let c = &self.construction;
        let angle_impact = wave_angle_impact(
            interval.wave_angle(self.orientation),
            c.max_wave_angle,
            1.0,
        );

        let loading = interval.wave_height > 0.0
            && interval.wave_period > 0.0
            && in_loading_zone(
                self.z,
                interval.water_level,
                interval.wave_height,
                c.lower_limit_factor,
                c.upper_limit_factor,
            );
        if !loading {
            return Ok(IntervalResult::not_loaded(AsphaltWaveImpactDetails {
                loading,
                wave_angle_impact: angle_impact,
                number_of_waves: 0.0,
                damage_per_wave: 0.0,
                wave_period: interval.wave_period,
            }));
        }

        let number_of_waves = interval.duration() / interval.wave_period;
        let damage_per_wave = c.damage_per_wave(interval.wave_height, angle_impact);
        if !damage_per_wave.is_finite() {
            return Err(ModelError::Numeric(format!(
                "时段{}: 单波疲劳损伤非有限值",
                context.index
            )));
        }

        Ok(IntervalResult::new(
            number_of_waves * damage_per_wave,
            AsphaltWaveImpactDetails {
                loading,
                wave_angle_impact: angle_impact,
                number_of_waves,
                damage_per_wave,
                wave_period: interval.wave_period,
            },
        ))
    }
}

/// 沥青护面单时段诊断量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsphaltWaveImpactDetails {
    /// 本时段是否受力
    pub loading: bool,
    /// 斜向入射折减系数 γβ
    pub wave_angle_impact: f64,
    /// 波数
    pub number_of_waves: f64,
    /// 单波疲劳损伤
    pub damage_per_wave: f64,
    /// 波周期 [s]
    pub wave_period: f64,
}

impl IntervalDetails for AsphaltWaveImpactDetails {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("loading", if self.loading { 1.0 } else { 0.0 }),
            ("wave_angle_impact", self.wave_angle_impact),
            ("number_of_waves", self.number_of_waves),
            ("damage_per_wave", self.damage_per_wave),
        ]
    }

    fn failure_duration(&self, damage_at_start: f64, failure_number: f64) -> f64 {
        (failure_number - damage_at_start) / self.damage_per_wave * self.wave_period
    }
}
