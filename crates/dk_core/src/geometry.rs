// crates/dk_core/src/geometry.rs

//! 堤防剖面几何
//!
//! 剖面由首尾相连、x 单调递增的线段链组成，附带特征点、前滩描述和堤轴方位角。
//! 几何对象由 [`CalculationInputBuilder`](crate::input::CalculationInputBuilder)
//! 构建并校验，构建完成后只读，可在所有计算线程间共享。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 剖面上的点 (x 为水平位置, z 为高程)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// 水平位置 [m]
    pub x: f64,
    /// 高程 [m]
    pub z: f64,
}

impl ProfilePoint {
    /// 创建点
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// 剖面线段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSegment {
    /// 起点
    pub start: ProfilePoint,
    /// 终点
    pub end: ProfilePoint,
    /// 糙率系数
    pub roughness: f64,
}

impl ProfileSegment {
    /// 创建线段
    pub fn new(start: ProfilePoint, end: ProfilePoint, roughness: f64) -> Self {
        Self {
            start,
            end,
            roughness,
        }
    }

    /// 坡度 tan(α)
    pub fn slope(&self) -> f64 {
        (self.end.z - self.start.z) / (self.end.x - self.start.x)
    }

    /// 水平长度
    pub fn horizontal_length(&self) -> f64 {
        self.end.x - self.start.x
    }

    /// x 是否落在线段水平投影内（含端点）
    pub fn contains(&self, x: f64) -> bool {
        self.start.x <= x && x <= self.end.x
    }

    /// 线段上 x 处的高程
    pub fn height_at(&self, x: f64) -> f64 {
        self.start.z + self.slope() * (x - self.start.x)
    }
}

/// 特征点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicPointType {
    /// 外坡坡脚
    OuterToe,
    /// 外坡平台顶
    CrestOuterBerm,
    /// 外坡平台内折点
    NotchOuterBerm,
    /// 外坡堤顶
    OuterCrest,
    /// 内坡堤顶
    InnerCrest,
    /// 内坡坡脚
    InnerToe,
}

impl fmt::Display for CharacteristicPointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OuterToe => "OuterToe",
            Self::CrestOuterBerm => "CrestOuterBerm",
            Self::NotchOuterBerm => "NotchOuterBerm",
            Self::OuterCrest => "OuterCrest",
            Self::InnerCrest => "InnerCrest",
            Self::InnerToe => "InnerToe",
        };
        write!(f, "{}", s)
    }
}

/// 特征点，引用剖面上的具体线段端点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicPoint {
    /// 类型
    pub kind: CharacteristicPointType,
    /// 对应的线段端点
    pub point: ProfilePoint,
}

/// 前滩描述
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Foreshore {
    /// 前滩坡度
    pub slope: f64,
    /// 前滩底高程 [m]
    pub bottom_z: f64,
}

/// 堤防剖面几何（不可变）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileGeometry {
    segments: Vec<ProfileSegment>,
    characteristic_points: Vec<CharacteristicPoint>,
    foreshore: Option<Foreshore>,
    orientation: f64,
    outer_toe: ProfilePoint,
    outer_crest: ProfilePoint,
}

impl ProfileGeometry {
    /// 仅供构建器在校验通过后调用
    pub(crate) fn new(
        segments: Vec<ProfileSegment>,
        characteristic_points: Vec<CharacteristicPoint>,
        foreshore: Option<Foreshore>,
        orientation: f64,
        outer_toe: ProfilePoint,
        outer_crest: ProfilePoint,
    ) -> Self {
        Self {
            segments,
            characteristic_points,
            foreshore,
            orientation,
            outer_toe,
            outer_crest,
        }
    }

    /// 线段列表
    pub fn segments(&self) -> &[ProfileSegment] {
        &self.segments
    }

    /// 特征点列表
    pub fn characteristic_points(&self) -> &[CharacteristicPoint] {
        &self.characteristic_points
    }

    /// 前滩
    pub fn foreshore(&self) -> Option<&Foreshore> {
        self.foreshore.as_ref()
    }

    /// 堤轴法向方位角 [°]
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// 外坡坡脚
    pub fn outer_toe(&self) -> ProfilePoint {
        self.outer_toe
    }

    /// 外坡堤顶
    pub fn outer_crest(&self) -> ProfilePoint {
        self.outer_crest
    }

    /// 按类型查找特征点
    pub fn characteristic_point(&self, kind: CharacteristicPointType) -> Option<ProfilePoint> {
        self.characteristic_points
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.point)
    }

    /// x 所在线段（位于两段交点时取前一段）
    pub fn segment_at(&self, x: f64) -> Option<&ProfileSegment> {
        self.segments.iter().find(|s| s.contains(x))
    }

    /// x 处的剖面高程
    pub fn vertical_height(&self, x: f64) -> Option<f64> {
        self.segment_at(x).map(|s| s.height_at(x))
    }

    /// x 处的局部坡度 tan(α)
    pub fn slope_at(&self, x: f64) -> Option<f64> {
        self.segment_at(x).map(ProfileSegment::slope)
    }

    /// 坡脚到堤顶的平均外坡坡度
    pub fn outer_slope(&self) -> f64 {
        (self.outer_crest.z - self.outer_toe.z) / (self.outer_crest.x - self.outer_toe.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_foundation::float::approx_eq;

    fn sample() -> ProfileGeometry {
        let a = ProfilePoint::new(0.0, 0.0);
        let b = ProfilePoint::new(10.0, 2.5);
        let c = ProfilePoint::new(20.0, 7.5);
        ProfileGeometry::new(
            vec![
                ProfileSegment::new(a, b, 1.0),
                ProfileSegment::new(b, c, 0.9),
            ],
            vec![
                CharacteristicPoint {
                    kind: CharacteristicPointType::OuterToe,
                    point: a,
                },
                CharacteristicPoint {
                    kind: CharacteristicPointType::OuterCrest,
                    point: c,
                },
            ],
            None,
            0.0,
            a,
            c,
        )
    }

    #[test]
    fn test_vertical_height() {
        let g = sample();
        assert_eq!(g.vertical_height(4.0), Some(1.0));
        assert_eq!(g.vertical_height(15.0), Some(5.0));
        assert_eq!(g.vertical_height(25.0), None);
    }

    #[test]
    fn test_slope_at_joint_uses_lower_segment() {
        let g = sample();
        assert_eq!(g.slope_at(10.0), Some(0.25));
        assert_eq!(g.slope_at(10.1), Some(0.5));
    }

    #[test]
    fn test_characteristic_point_lookup() {
        let g = sample();
        assert_eq!(
            g.characteristic_point(CharacteristicPointType::OuterCrest),
            Some(ProfilePoint::new(20.0, 7.5))
        );
        assert!(g
            .characteristic_point(CharacteristicPointType::NotchOuterBerm)
            .is_none());
        assert!(approx_eq(g.outer_slope(), 0.375, 1e-12));
    }
}
