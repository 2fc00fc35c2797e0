// crates/dk_core/src/load.rs

//! 水力载荷时段
//!
//! 每个时段内水位、波高、波周期和波向保持不变。
//! 时段序列必须首尾相接：`intervals[i].end_time == intervals[i + 1].begin_time`。

use serde::{Deserialize, Serialize};

/// 单个载荷时段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadInterval {
    /// 开始时间 [s]
    pub begin_time: f64,
    /// 结束时间 [s]
    pub end_time: f64,
    /// 水位 [m]
    pub water_level: f64,
    /// 有效波高 Hs [m]
    pub wave_height: f64,
    /// 波周期 Tm-1,0 [s]
    pub wave_period: f64,
    /// 波向（来向方位角）[°]
    pub wave_direction: f64,
}

impl LoadInterval {
    /// 创建时段
    pub fn new(
        begin_time: f64,
        end_time: f64,
        water_level: f64,
        wave_height: f64,
        wave_period: f64,
        wave_direction: f64,
    ) -> Self {
        Self {
            begin_time,
            end_time,
            water_level,
            wave_height,
            wave_period,
            wave_direction,
        }
    }

    /// 时段长度 [s]
    pub fn duration(&self) -> f64 {
        self.end_time - self.begin_time
    }

    /// 相对堤轴法向的入射角 [°]，归一化到 (-180, 180]
    pub fn wave_angle(&self, orientation: f64) -> f64 {
        let mut angle = (self.wave_direction - orientation) % 360.0;
        if angle > 180.0 {
            angle -= 360.0;
        } else if angle <= -180.0 {
            angle += 360.0;
        }
        angle
    }
}

/// 检查两个相邻时段是否首尾相接
#[inline]
pub fn is_contiguous(previous: &LoadInterval, next: &LoadInterval) -> bool {
    previous.end_time == next.begin_time
}
