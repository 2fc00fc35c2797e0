// crates/dk_foundation/src/float.rs

//! 浮点数辅助函数
//!
//! 损伤累加中 NaN 是一等值：表示"本时段未对护面产生载荷"，
//! 累加时贡献 0，但保留在结果中供诊断使用。

/// "未加载"哨兵值
pub const NOT_LOADED: f64 = f64::NAN;

/// 单个增量对累计值的贡献（NaN 贡献 0）
#[inline]
pub fn contribution(increment: f64) -> f64 {
    if increment.is_nan() {
        0.0
    } else {
        increment
    }
}

/// 近似相等（绝对或相对误差）
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= epsilon || diff <= epsilon * a.abs().max(b.abs())
}
