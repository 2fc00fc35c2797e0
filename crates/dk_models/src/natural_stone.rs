// crates/dk_models/src/natural_stone.rs

//! 块石护面损伤模型（有状态）
//!
//! # 公式
//!
//! ```text
//! 水力载荷  H     = γβ · Hs / (A · ξ^N)          (ξ < ξb 取卷破系数，否则取激破系数)
//! 抗力      R     = Δ · D
//! 参考时间  t_ref = 1000 · T · (D_start · R / H)^10
//! 累计损伤  D(t)  = (H / R) · ((t_ref + t) / (1000 · T))^0.1
//! ```
//!
//! 时段增量依赖时段起始累计损伤，因此必须按时段顺序计算。
//! 位置不在受力区或无波浪时，本时段未加载（增量为 NaN）。

use crate::common::{check_on_outer_slope, in_loading_zone, surf_similarity, wave_angle_impact};
use dk_core::{
    DamageModel, InitializedModel, IntervalContext, IntervalDetails, IntervalResult, LoadInterval,
    LocationProperties, ModelError, ProfileGeometry,
};
use dk_foundation::validation::{check_positive, check_range};
use dk_foundation::ValidationReport;
use serde::{Deserialize, Serialize};

/// 模型名称
pub const MODEL_NAME: &str = "natural_stone";

// ============================================================================
// 构造参数
// ============================================================================

/// 块石护面构造参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturalStoneProperties {
    /// 相对密度 Δ
    #[serde(default = "default_relative_density")]
    pub relative_density: f64,

    /// 护面层厚度 D [m]
    #[serde(default = "default_thickness")]
    pub thickness_top_layer: f64,

    /// 卷破系数 A
    #[serde(default = "default_plunging_a")]
    pub plunging_a: f64,

    /// 卷破指数 N
    #[serde(default = "default_plunging_n")]
    pub plunging_n: f64,

    /// 激破系数 A
    #[serde(default = "default_surging_a")]
    pub surging_a: f64,

    /// 激破指数 N
    #[serde(default = "default_surging_n")]
    pub surging_n: f64,

    /// 卷破与激破的分界 ξb
    #[serde(default = "default_xib")]
    pub xib: f64,

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

fn default_relative_density() -> f64 { 1.65 }
fn default_thickness() -> f64 { 0.3 }
fn default_plunging_a() -> f64 { 4.0 }
fn default_plunging_n() -> f64 { -0.9 }
fn default_surging_a() -> f64 { 0.8 }
fn default_surging_n() -> f64 { 0.6 }
fn default_xib() -> f64 { 2.9 }
fn default_lower_limit() -> f64 { 1.5 }
fn default_upper_limit() -> f64 { 0.5 }
fn default_max_wave_angle() -> f64 { 78.0 }

impl Default for NaturalStoneProperties {
    fn default() -> Self {
        Self {
            relative_density: default_relative_density(),
            thickness_top_layer: default_thickness(),
            plunging_a: default_plunging_a(),
            plunging_n: default_plunging_n(),
            surging_a: default_surging_a(),
            surging_n: default_surging_n(),
            xib: default_xib(),
            lower_limit_factor: default_lower_limit(),
            upper_limit_factor: default_upper_limit(),
            max_wave_angle: default_max_wave_angle(),
        }
    }
}

impl NaturalStoneProperties {
    /// 抗力 R = Δ·D
    pub fn resistance(&self) -> f64 {
        self.relative_density * self.thickness_top_layer
    }
}

// ============================================================================
// 位置模型
// ============================================================================

/// 块石护面计算位置
#[derive(Debug, Clone)]
pub struct NaturalStoneLocation {
    location: LocationProperties,
    construction: NaturalStoneProperties,
}

impl NaturalStoneLocation {
    /// 创建位置
    pub fn new(location: LocationProperties, construction: NaturalStoneProperties) -> Self {
        Self {
            location,
            construction,
        }
    }

    /// 使用默认构造参数
    pub fn with_defaults(x: f64) -> Self {
        Self::new(LocationProperties::new(x), NaturalStoneProperties::default())
    }

    /// 构造参数
    pub fn construction(&self) -> &NaturalStoneProperties {
        &self.construction
    }
}

impl DamageModel for NaturalStoneLocation {
    fn name(&self) -> &'static str {
        MODEL_NAME
    }

    fn properties(&self) -> &LocationProperties {
        &self.location
    }

    fn requires_sequential_intervals(&self) -> bool {
        true
    }

    fn validate(&self, index: usize, geometry: &ProfileGeometry, report: &mut ValidationReport) {
        let c = &self.construction;
        let id = Some(index);
        check_positive(report, "relative_density", id, c.relative_density);
        check_positive(report, "thickness_top_layer", id, c.thickness_top_layer);
        check_positive(report, "plunging_a", id, c.plunging_a);
        check_positive(report, "surging_a", id, c.surging_a);
        check_positive(report, "xib", id, c.xib);
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
        let slope = geometry.slope_at(x).ok_or(ModelError::OutsideProfile(x))?;

        tracing::trace!("natural_stone at x={}: z={:.3}, tanα={:.4}", x, z, slope);

        Ok(Box::new(InitializedNaturalStone {
            construction: self.construction.clone(),
            z,
            slope,
            resistance: self.construction.resistance(),
            orientation: geometry.orientation(),
        }))
    }
}

// ============================================================================
// 已初始化状态
// ============================================================================

#[derive(Debug)]
struct InitializedNaturalStone {
    construction: NaturalStoneProperties,
    z: f64,
    slope: f64,
    resistance: f64,
    orientation: f64,
}

impl InitializedNaturalStone {
    fn hydraulic_load(&self, wave_height: f64, surf_similarity: f64, angle_impact: f64) -> f64 {
        let c = &self.construction;
        let (a, n) = if surf_similarity < c.xib {
            (c.plunging_a, c.plunging_n)
        } else {
            (c.surging_a, c.surging_n)
        };
        angle_impact * wave_height / (a * surf_similarity.powf(n))
    }
}

impl InitializedModel for InitializedNaturalStone {
    fn z(&self) -> f64 {
        self.z
    }

    fn compute_interval(
        &self,
        interval: &LoadInterval,
        context: IntervalContext,
    ) -> Result<IntervalResult, ModelError> {
        let damage_at_start = context
            .damage_at_start
            .ok_or(ModelError::MissingDamageAtStart(MODEL_NAME))?;

        let c = &self.construction;
        let xi = surf_similarity(self.slope, interval.wave_height, interval.wave_period);
        let angle_impact = wave_angle_impact(
            interval.wave_angle(self.orientation),
            c.max_wave_angle,
            2.0 / 3.0,
        );

        let mut details = NaturalStoneDetails {
            loading: false,
            surf_similarity: xi,
            wave_angle_impact: angle_impact,
            hydraulic_load: 0.0,
            resistance: self.resistance,
            wave_period: interval.wave_period,
            reference_time: f64::NAN,
        };

        let in_zone = in_loading_zone(
            self.z,
            interval.water_level,
            interval.wave_height,
            c.lower_limit_factor,
            c.upper_limit_factor,
        );
        if !in_zone || !xi.is_finite() || xi <= 0.0 {
            return Ok(IntervalResult::not_loaded(details));
        }

        let load = self.hydraulic_load(interval.wave_height, xi, angle_impact);
        if !load.is_finite() || load <= 0.0 {
            return Ok(IntervalResult::not_loaded(details));
        }

        details.loading = true;
        details.hydraulic_load = load;
        details.reference_time = details.reference_time_for(damage_at_start);

        let damage_at_end = details.damage_after(details.reference_time + interval.duration());
        let increment = damage_at_end - damage_at_start;
        if !increment.is_finite() {
            return Err(ModelError::Numeric(format!(
                "时段{}: 增量损伤非有限值 (H={}, R={})",
                context.index, load, self.resistance
            )));
        }

        Ok(IntervalResult::new(increment, details))
    }
}

// ============================================================================
// 时段诊断量
// ============================================================================

/// 块石护面单时段诊断量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalStoneDetails {
    /// 本时段是否受力
    pub loading: bool,
    /// 破波相似参数 ξ
    pub surf_similarity: f64,
    /// 斜向入射折减系数 γβ
    pub wave_angle_impact: f64,
    /// 水力载荷 H
    pub hydraulic_load: f64,
    /// 抗力 R
    pub resistance: f64,
    /// 波周期 T [s]
    pub wave_period: f64,
    /// 参考时间 t_ref [s]
    pub reference_time: f64,
}

impl NaturalStoneDetails {
    fn time_scale(&self) -> f64 {
        1000.0 * self.wave_period
    }

    /// 达到给定损伤所需的等效时间
    fn reference_time_for(&self, damage: f64) -> f64 {
        self.time_scale() * (damage * self.resistance / self.hydraulic_load).powi(10)
    }

    /// 等效时间 t 时的累计损伤
    fn damage_after(&self, t: f64) -> f64 {
        self.hydraulic_load / self.resistance * (t / self.time_scale()).powf(0.1)
    }
}

impl IntervalDetails for NaturalStoneDetails {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("loading", if self.loading { 1.0 } else { 0.0 }),
            ("surf_similarity", self.surf_similarity),
            ("wave_angle_impact", self.wave_angle_impact),
            ("hydraulic_load", self.hydraulic_load),
            ("resistance", self.resistance),
            ("reference_time", self.reference_time),
        ]
    }

    fn failure_duration(&self, damage_at_start: f64, failure_number: f64) -> f64 {
        if !self.loading {
            return f64::NAN;
        }
        self.reference_time_for(failure_number) - self.reference_time_for(damage_at_start)
    }
}
