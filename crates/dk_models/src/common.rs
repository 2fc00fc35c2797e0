// crates/dk_models/src/common.rs

//! 各类护面共用的水力学辅助函数

use dk_core::{DamageModel, ProfileGeometry};
use dk_foundation::{ValidationIssue, ValidationReport};
use std::f64::consts::PI;

/// 重力加速度 [m/s²]
pub const GRAVITY: f64 = 9.81;

/// 海水密度 [kg/m³]
pub const WATER_DENSITY: f64 = 1025.0;

/// 破波相似参数 ξ = tanα / √(2πHs / (g·T²))
///
/// 波高或周期不为正时返回 NaN。
pub fn surf_similarity(slope: f64, wave_height: f64, wave_period: f64) -> f64 {
    if wave_height <= 0.0 || wave_period <= 0.0 {
        return f64::NAN;
    }
    let steepness = 2.0 * PI * wave_height / (GRAVITY * wave_period * wave_period);
    slope / steepness.sqrt()
}

/// 斜向入射折减系数 γβ = cos(min(|β|, β_max))^n
pub fn wave_angle_impact(wave_angle: f64, max_angle: f64, exponent: f64) -> f64 {
    let beta = wave_angle.abs().min(max_angle).to_radians();
    beta.cos().max(0.0).powf(exponent)
}

/// 位置高程是否在水位附近的受力区内
///
/// 受力区为 `[wl - lower·Hs, wl + upper·Hs]`。
pub fn in_loading_zone(
    z: f64,
    water_level: f64,
    wave_height: f64,
    lower_factor: f64,
    upper_factor: f64,
) -> bool {
    let lower = water_level - lower_factor * wave_height;
    let upper = water_level + upper_factor * wave_height;
    lower <= z && z <= upper
}

/// 检查位置落在剖面上，且局部坡度为正
pub(crate) fn check_on_outer_slope(
    model: &dyn DamageModel,
    index: usize,
    geometry: &ProfileGeometry,
    report: &mut ValidationReport,
) {
    let x = model.properties().x;
    match geometry.slope_at(x) {
        None => report.add_error(ValidationIssue::new(
            Some(index),
            format!("{}: x={} 不在剖面上", model.name(), x),
        )),
        Some(slope) if slope <= 0.0 => report.add_warning(ValidationIssue::new(
            Some(index),
            format!("{}: x={} 处坡度 {} 不为正，该位置不会受力", model.name(), x, slope),
        )),
        Some(_) => {}
    }
}
