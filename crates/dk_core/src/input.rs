// crates/dk_core/src/input.rs

//! 计算输入与构建器
//!
//! [`CalculationInputBuilder`] 只做累积，所有结构性校验集中在
//! [`CalculationInputBuilder::build`]：校验失败时返回携带诊断事件的
//! [`BuildError::Invalid`]，永远不会产出不可运行的 [`CalculationInput`]。
//!
//! # 示例
//!
//! ```ignore
//! let sink = DiagnosticsSink::new();
//! let input = CalculationInputBuilder::new()
//!     .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
//!     .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)?
//!     .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)?
//!     .add_load_interval(LoadInterval::new(0.0, 3600.0, 3.0, 1.2, 5.0, 0.0))
//!     .add_location(model)
//!     .build(&sink)?;
//! ```

use crate::error::BuildError;
use crate::geometry::{
    CharacteristicPoint, CharacteristicPointType, Foreshore, ProfileGeometry, ProfilePoint,
    ProfileSegment,
};
use crate::load::{is_contiguous, LoadInterval};
use crate::model::DamageModel;
use dk_foundation::{DiagnosticPhase, DiagnosticsSink, ValidationIssue, ValidationReport};

/// 剖面连接点的位置容差 [m]
const CONNECTION_TOLERANCE: f64 = 1e-9;

/// 计算输入（已通过结构校验）
#[derive(Debug)]
pub struct CalculationInput {
    geometry: ProfileGeometry,
    intervals: Vec<LoadInterval>,
    locations: Vec<Box<dyn DamageModel>>,
}

impl CalculationInput {
    /// 剖面几何
    pub fn geometry(&self) -> &ProfileGeometry {
        &self.geometry
    }

    /// 载荷时段序列
    pub fn intervals(&self) -> &[LoadInterval] {
        &self.intervals
    }

    /// 计算位置
    pub fn locations(&self) -> &[Box<dyn DamageModel>] {
        &self.locations
    }

    /// 是否存在有状态模型
    pub fn has_stateful_locations(&self) -> bool {
        self.locations
            .iter()
            .any(|l| l.requires_sequential_intervals())
    }

    /// 有状态模型的位置序号
    pub fn stateful_locations(&self) -> Vec<usize> {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, l)| l.requires_sequential_intervals())
            .map(|(i, _)| i)
            .collect()
    }

    /// 模拟时段 (开始, 结束)
    pub fn time_horizon(&self) -> (f64, f64) {
        let begin = self.intervals.first().map_or(0.0, |i| i.begin_time);
        let end = self.intervals.last().map_or(0.0, |i| i.end_time);
        (begin, end)
    }
}

/// 计算输入构建器
#[derive(Debug, Default)]
pub struct CalculationInputBuilder {
    segments: Vec<ProfileSegment>,
    characteristic_points: Vec<(f64, CharacteristicPointType)>,
    foreshore: Option<Foreshore>,
    orientation: f64,
    intervals: Vec<LoadInterval>,
    locations: Vec<Box<dyn DamageModel>>,
}

impl CalculationInputBuilder {
    /// 创建空构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加剖面线段
    pub fn add_profile_segment(
        mut self,
        start_x: f64,
        start_z: f64,
        end_x: f64,
        end_z: f64,
        roughness: f64,
    ) -> Self {
        self.segments.push(ProfileSegment::new(
            ProfilePoint::new(start_x, start_z),
            ProfilePoint::new(end_x, end_z),
            roughness,
        ));
        self
    }

    /// 添加特征点（同类型重复添加立即失败）
    pub fn add_characteristic_point(
        mut self,
        x: f64,
        kind: CharacteristicPointType,
    ) -> Result<Self, BuildError> {
        if self.characteristic_points.iter().any(|(_, k)| *k == kind) {
            return Err(BuildError::DuplicateCharacteristicPoint(kind));
        }
        self.characteristic_points.push((x, kind));
        Ok(self)
    }

    /// 设置前滩
    pub fn with_foreshore(mut self, slope: f64, bottom_z: f64) -> Self {
        self.foreshore = Some(Foreshore { slope, bottom_z });
        self
    }

    /// 设置堤轴法向方位角 [°]
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    /// 追加载荷时段
    pub fn add_load_interval(mut self, interval: LoadInterval) -> Self {
        self.intervals.push(interval);
        self
    }

    /// 按时间节点追加一串首尾相接的时段
    ///
    /// `times` 长度必须比 `loads` 多 1，`loads` 为 (水位, 波高, 波周期, 波向)。
    pub fn add_load_series(mut self, times: &[f64], loads: &[(f64, f64, f64, f64)]) -> Self {
        for (window, &(water_level, wave_height, wave_period, wave_direction)) in
            times.windows(2).zip(loads)
        {
            self.intervals.push(LoadInterval::new(
                window[0],
                window[1],
                water_level,
                wave_height,
                wave_period,
                wave_direction,
            ));
        }
        self
    }

    /// 添加计算位置
    pub fn add_location(mut self, model: impl DamageModel + 'static) -> Self {
        self.locations.push(Box::new(model));
        self
    }

    /// 添加已装箱的计算位置
    pub fn add_boxed_location(mut self, model: Box<dyn DamageModel>) -> Self {
        self.locations.push(model);
        self
    }

    /// 结构校验并构建输入
    ///
    /// 全部错误和警告都写入 `sink`（阶段 Build）；存在错误时返回
    /// [`BuildError::Invalid`]。
    pub fn build(self, sink: &DiagnosticsSink) -> Result<CalculationInput, BuildError> {
        let mut report = ValidationReport::new();

        self.check_segments(&mut report);
        let points = self.resolve_characteristic_points(&mut report);
        let toe = find_point(&points, CharacteristicPointType::OuterToe);
        let crest = find_point(&points, CharacteristicPointType::OuterCrest);
        self.check_mandatory_points(&points, toe, crest, &mut report);
        self.check_foreshore_and_orientation(&mut report);
        self.check_intervals(&mut report);
        self.check_locations(toe, crest, &mut report);

        report.publish(sink, DiagnosticPhase::Build);

        match (report.is_valid(), toe, crest) {
            (true, Some(toe), Some(crest)) => {
                tracing::debug!(
                    "Calculation input built: {} segments, {} intervals, {} locations",
                    self.segments.len(),
                    self.intervals.len(),
                    self.locations.len()
                );
                Ok(CalculationInput {
                    geometry: ProfileGeometry::new(
                        self.segments,
                        points,
                        self.foreshore,
                        self.orientation,
                        toe,
                        crest,
                    ),
                    intervals: self.intervals,
                    locations: self.locations,
                })
            }
            _ => Err(BuildError::Invalid {
                events: report.to_events(DiagnosticPhase::Build),
            }),
        }
    }

    fn check_segments(&self, report: &mut ValidationReport) {
        if self.segments.is_empty() {
            report.add_error(ValidationIssue::new(None, "剖面至少需要一条线段"));
            return;
        }

        for (i, segment) in self.segments.iter().enumerate() {
            let coords = [segment.start.x, segment.start.z, segment.end.x, segment.end.z];
            if coords.iter().any(|c| !c.is_finite()) {
                report.add_error(ValidationIssue::new(
                    None,
                    format!("线段{}: 坐标必须为有限值", i),
                ));
                continue;
            }
            if segment.start.x >= segment.end.x {
                report.add_error(ValidationIssue::new(
                    None,
                    format!(
                        "线段{}: x 必须单调递增 ({} -> {})",
                        i, segment.start.x, segment.end.x
                    ),
                ));
            }
            if !segment.roughness.is_finite() || segment.roughness <= 0.0 {
                report.add_error(ValidationIssue::new(
                    None,
                    format!("线段{}: 糙率系数 {} 必须大于 0", i, segment.roughness),
                ));
            }
        }

        for (i, pair) in self.segments.windows(2).enumerate() {
            let (previous, next) = (&pair[0], &pair[1]);
            let dx = (previous.end.x - next.start.x).abs();
            let dz = (previous.end.z - next.start.z).abs();
            if dx > CONNECTION_TOLERANCE || dz > CONNECTION_TOLERANCE {
                report.add_error(ValidationIssue::new(
                    None,
                    format!("线段{}与线段{}不相连", i, i + 1),
                ));
            }
        }
    }

    /// 把特征点的 x 解析为对应的线段端点
    fn resolve_characteristic_points(
        &self,
        report: &mut ValidationReport,
    ) -> Vec<CharacteristicPoint> {
        let endpoints: Vec<ProfilePoint> = self
            .segments
            .first()
            .map(|s| s.start)
            .into_iter()
            .chain(self.segments.iter().map(|s| s.end))
            .collect();

        self.characteristic_points
            .iter()
            .filter_map(|&(x, kind)| {
                let point = endpoints
                    .iter()
                    .find(|p| (p.x - x).abs() <= CONNECTION_TOLERANCE)
                    .copied();
                if point.is_none() {
                    report.add_error(ValidationIssue::new(
                        None,
                        format!("特征点 {} (x={}) 不是剖面线段端点", kind, x),
                    ));
                }
                point.map(|point| CharacteristicPoint { kind, point })
            })
            .collect()
    }

    fn check_mandatory_points(
        &self,
        points: &[CharacteristicPoint],
        toe: Option<ProfilePoint>,
        crest: Option<ProfilePoint>,
        report: &mut ValidationReport,
    ) {
        let declared = |kind: CharacteristicPointType| {
            self.characteristic_points.iter().any(|(_, k)| *k == kind)
        };

        for kind in [CharacteristicPointType::OuterToe, CharacteristicPointType::OuterCrest] {
            if !declared(kind) {
                report.add_error(ValidationIssue::new(
                    None,
                    format!("缺少必需的特征点 {}", kind),
                ));
            }
        }

        if let (Some(toe), Some(crest)) = (toe, crest) {
            if toe.x >= crest.x {
                report.add_error(ValidationIssue::new(
                    None,
                    format!("外坡坡脚 x={} 必须位于外坡堤顶 x={} 之前", toe.x, crest.x),
                ));
            }
        }

        let berm_crest = find_point(points, CharacteristicPointType::CrestOuterBerm);
        let berm_notch = find_point(points, CharacteristicPointType::NotchOuterBerm);
        match (berm_crest, berm_notch) {
            (Some(c), Some(n)) if c.x >= n.x => {
                report.add_error(ValidationIssue::new(
                    None,
                    "外坡平台顶必须位于平台内折点之前",
                ));
            }
            (Some(_), None) | (None, Some(_)) => {
                report.add_error(ValidationIssue::new(
                    None,
                    "外坡平台顶与平台内折点必须同时给出",
                ));
            }
            _ => {}
        }
    }

    fn check_foreshore_and_orientation(&self, report: &mut ValidationReport) {
        if let Some(foreshore) = &self.foreshore {
            if !foreshore.slope.is_finite() || !foreshore.bottom_z.is_finite() {
                report.add_error(ValidationIssue::new(None, "前滩坡度和底高程必须为有限值"));
            }
        }
        if !(0.0..=360.0).contains(&self.orientation) {
            report.add_error(ValidationIssue::new(
                None,
                format!("堤轴方位角 {} 超出范围[0, 360]", self.orientation),
            ));
        }
    }

    fn check_intervals(&self, report: &mut ValidationReport) {
        if self.intervals.is_empty() {
            report.add_error(ValidationIssue::new(None, "至少需要一个载荷时段"));
            return;
        }

        for (i, interval) in self.intervals.iter().enumerate() {
            let values = [
                interval.begin_time,
                interval.end_time,
                interval.water_level,
                interval.wave_height,
                interval.wave_period,
                interval.wave_direction,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                report.add_error(ValidationIssue::new(
                    None,
                    format!("时段{}: 载荷参数必须为有限值", i),
                ));
            }
            if interval.begin_time >= interval.end_time {
                report.add_error(ValidationIssue::new(
                    None,
                    format!(
                        "时段{}: 开始时间 {} 必须早于结束时间 {}",
                        i, interval.begin_time, interval.end_time
                    ),
                ));
            }
        }

        for (i, pair) in self.intervals.windows(2).enumerate() {
            if !is_contiguous(&pair[0], &pair[1]) {
                report.add_error(ValidationIssue::new(
                    None,
                    format!(
                        "时段{}结束时间 {} 与时段{}开始时间 {} 不相接",
                        i,
                        pair[0].end_time,
                        i + 1,
                        pair[1].begin_time
                    ),
                ));
            }
        }
    }

    fn check_locations(
        &self,
        toe: Option<ProfilePoint>,
        crest: Option<ProfilePoint>,
        report: &mut ValidationReport,
    ) {
        if self.locations.is_empty() {
            report.add_error(ValidationIssue::new(None, "至少需要一个计算位置"));
            return;
        }

        let (Some(toe), Some(crest)) = (toe, crest) else {
            return;
        };
        for (i, location) in self.locations.iter().enumerate() {
            let x = location.properties().x;
            if !(toe.x..=crest.x).contains(&x) {
                report.add_error(ValidationIssue::new(
                    Some(i),
                    format!(
                        "位置 x={} 不在外坡坡脚 {} 与堤顶 {} 之间",
                        x, toe.x, crest.x
                    ),
                ));
            }
        }
    }
}

fn find_point(points: &[CharacteristicPoint], kind: CharacteristicPointType) -> Option<ProfilePoint> {
    points.iter().find(|p| p.kind == kind).map(|p| p.point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::{InitializedModel, LocationProperties};

    #[derive(Debug)]
    struct StubModel {
        properties: LocationProperties,
        stateful: bool,
    }

    impl StubModel {
        fn at(x: f64) -> Self {
            Self {
                properties: LocationProperties::new(x),
                stateful: false,
            }
        }
    }

    impl DamageModel for StubModel {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn properties(&self) -> &LocationProperties {
            &self.properties
        }

        fn requires_sequential_intervals(&self) -> bool {
            self.stateful
        }

        fn validate(&self, _: usize, _: &ProfileGeometry, _: &mut ValidationReport) {}

        fn initialize(
            &self,
            _: &ProfileGeometry,
        ) -> Result<Box<dyn InitializedModel>, ModelError> {
            Err(ModelError::Numeric("stub".into()))
        }
    }

    fn profile() -> CalculationInputBuilder {
        CalculationInputBuilder::new()
            .add_profile_segment(0.0, 0.0, 10.0, 2.5, 1.0)
            .add_profile_segment(10.0, 2.5, 30.0, 7.5, 1.0)
            .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
            .unwrap()
            .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
            .unwrap()
    }

    fn valid_builder() -> CalculationInputBuilder {
        profile()
            .add_load_series(
                &[0.0, 100.0, 600.0],
                &[(2.0, 1.0, 4.0, 0.0), (2.5, 1.2, 4.5, 10.0)],
            )
            .add_location(StubModel::at(12.0))
    }

    #[test]
    fn test_build_valid_input() {
        let sink = DiagnosticsSink::new();
        let input = valid_builder().build(&sink).unwrap();

        assert_eq!(input.intervals().len(), 2);
        assert_eq!(input.locations().len(), 1);
        assert_eq!(input.time_horizon(), (0.0, 600.0));
        assert!(!input.has_stateful_locations());
        assert_eq!(input.geometry().outer_crest(), ProfilePoint::new(30.0, 7.5));
        assert!(sink.flush().is_empty());
    }

    #[test]
    fn test_duplicate_characteristic_point_fails_fast() {
        let result = profile().add_characteristic_point(10.0, CharacteristicPointType::OuterToe);
        assert!(matches!(
            result,
            Err(BuildError::DuplicateCharacteristicPoint(
                CharacteristicPointType::OuterToe
            ))
        ));
    }

    #[test]
    fn test_non_contiguous_intervals_rejected() {
        let sink = DiagnosticsSink::new();
        let result = profile()
            .add_load_interval(LoadInterval::new(0.0, 100.0, 2.0, 1.0, 4.0, 0.0))
            .add_load_interval(LoadInterval::new(150.0, 600.0, 2.0, 1.0, 4.0, 0.0))
            .add_location(StubModel::at(12.0))
            .build(&sink);

        let err = result.unwrap_err();
        assert!(err.events().iter().any(|e| e.is_error()));
        assert!(sink.has_errors());
    }

    #[test]
    fn test_zero_locations_rejected() {
        let sink = DiagnosticsSink::new();
        let result = profile()
            .add_load_interval(LoadInterval::new(0.0, 100.0, 2.0, 1.0, 4.0, 0.0))
            .build(&sink);

        assert!(result.is_err());
        let events = sink.flush();
        assert!(events.iter().any(|e| e.message.contains("计算位置")));
    }

    #[test]
    fn test_disconnected_segments_rejected() {
        let sink = DiagnosticsSink::new();
        let result = CalculationInputBuilder::new()
            .add_profile_segment(0.0, 0.0, 10.0, 2.5, 1.0)
            .add_profile_segment(11.0, 2.5, 30.0, 7.5, 1.0)
            .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
            .unwrap()
            .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
            .unwrap()
            .add_load_interval(LoadInterval::new(0.0, 100.0, 2.0, 1.0, 4.0, 0.0))
            .add_location(StubModel::at(12.0))
            .build(&sink);

        assert!(result.is_err());
    }

    #[test]
    fn test_characteristic_point_must_be_endpoint() {
        let sink = DiagnosticsSink::new();
        let result = CalculationInputBuilder::new()
            .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
            .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
            .unwrap()
            .add_characteristic_point(25.0, CharacteristicPointType::OuterCrest)
            .unwrap()
            .add_load_interval(LoadInterval::new(0.0, 100.0, 2.0, 1.0, 4.0, 0.0))
            .add_location(StubModel::at(12.0))
            .build(&sink);

        let err = result.unwrap_err();
        assert!(err.events().iter().any(|e| e.message.contains("端点")));
    }

    #[test]
    fn test_location_outside_outer_slope_rejected() {
        let sink = DiagnosticsSink::new();
        let err = profile()
            .add_load_interval(LoadInterval::new(0.0, 100.0, 2.0, 1.0, 4.0, 0.0))
            .add_location(StubModel::at(35.0))
            .build(&sink)
            .unwrap_err();

        assert!(err.events().iter().any(|e| e.location == Some(0)));
    }

    #[test]
    fn test_missing_outer_crest_rejected() {
        let sink = DiagnosticsSink::new();
        let result = CalculationInputBuilder::new()
            .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
            .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
            .unwrap()
            .add_load_interval(LoadInterval::new(0.0, 100.0, 2.0, 1.0, 4.0, 0.0))
            .add_location(StubModel::at(12.0))
            .build(&sink);

        assert!(result.is_err());
        assert!(sink
            .flush()
            .iter()
            .any(|e| e.message.contains("OuterCrest")));
    }

    #[test]
    fn test_stateful_locations_reported() {
        let sink = DiagnosticsSink::new();
        let input = valid_builder()
            .add_location(StubModel {
                properties: LocationProperties::new(20.0),
                stateful: true,
            })
            .build(&sink)
            .unwrap();

        assert!(input.has_stateful_locations());
        assert_eq!(input.stateful_locations(), vec![1]);
    }
}
