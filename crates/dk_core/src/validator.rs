// crates/dk_core/src/validator.rs

//! 业务规则校验
//!
//! 结构校验在构建时完成；这里检查物理合理性（非负波高、正波周期……）
//! 并调用每个位置模型的 [`DamageModel::validate`](crate::model::DamageModel::validate)。
//! 警告不会导致校验失败。

use crate::input::CalculationInput;
use dk_foundation::validation::{check_finite, check_positive, check_range};
use dk_foundation::{DiagnosticPhase, DiagnosticsSink, ValidationIssue, ValidationReport};
use std::fmt;

/// 校验结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// 无错误（可能有警告）
    Successful,
    /// 至少一个错误
    Failed,
}

impl ValidationOutcome {
    /// 是否通过
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Successful => write!(f, "Successful"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// 校验计算输入，所有问题写入 `sink`（阶段 Validate）
pub fn validate(input: &CalculationInput, sink: &DiagnosticsSink) -> ValidationOutcome {
    let report = build_report(input);
    report.publish(sink, DiagnosticPhase::Validate);

    tracing::debug!(
        "Validation finished: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );

    if report.has_errors() {
        ValidationOutcome::Failed
    } else {
        ValidationOutcome::Successful
    }
}

/// 生成校验报告（不写入 sink）
pub fn build_report(input: &CalculationInput) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (i, interval) in input.intervals().iter().enumerate() {
        if interval.wave_height < 0.0 {
            report.add_error(ValidationIssue::new(
                None,
                format!("时段{}: 波高 {} 不能为负", i, interval.wave_height),
            ));
        }
        if interval.wave_height > 0.0 && interval.wave_period <= 0.0 {
            report.add_error(ValidationIssue::new(
                None,
                format!("时段{}: 有波浪时波周期 {} 必须大于 0", i, interval.wave_period),
            ));
        }
        if !(0.0..=360.0).contains(&interval.wave_direction) {
            report.add_error(ValidationIssue::new(
                None,
                format!("时段{}: 波向 {} 超出范围[0, 360]", i, interval.wave_direction),
            ));
        }
    }

    let geometry = input.geometry();
    for (i, location) in input.locations().iter().enumerate() {
        let props = location.properties();
        let location_id = Some(i);

        check_range(
            &mut report,
            "initial_damage",
            location_id,
            props.initial_damage,
            0.0,
            f64::MAX,
        );
        let failure_number = props.failure_number;
        let failure_ok = check_finite(&mut report, "failure_number", location_id, failure_number)
            && check_positive(&mut report, "failure_number", location_id, failure_number);

        if failure_ok && props.failure_number <= props.initial_damage {
            report.add_warning(ValidationIssue::new(
                location_id,
                format!(
                    "初始损伤 {} 已达到失效值 {}，不会再推导失效时刻",
                    props.initial_damage, props.failure_number
                ),
            ));
        }

        location.validate(i, geometry, &mut report);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::geometry::{CharacteristicPointType, ProfileGeometry};
    use crate::input::CalculationInputBuilder;
    use crate::load::LoadInterval;
    use crate::model::{DamageModel, InitializedModel, LocationProperties};

    #[derive(Debug)]
    struct Checked {
        properties: LocationProperties,
        coefficient: f64,
    }

    impl DamageModel for Checked {
        fn name(&self) -> &'static str {
            "checked"
        }

        fn properties(&self) -> &LocationProperties {
            &self.properties
        }

        fn requires_sequential_intervals(&self) -> bool {
            false
        }

        fn validate(&self, index: usize, _: &ProfileGeometry, report: &mut ValidationReport) {
            check_positive(report, "coefficient", Some(index), self.coefficient);
        }

        fn initialize(
            &self,
            _: &ProfileGeometry,
        ) -> Result<Box<dyn InitializedModel>, ModelError> {
            Err(ModelError::Numeric("not used".into()))
        }
    }

    fn input(properties: LocationProperties, coefficient: f64, hs: f64) -> CalculationInput {
        CalculationInputBuilder::new()
            .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
            .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
            .unwrap()
            .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
            .unwrap()
            .add_load_interval(LoadInterval::new(0.0, 3600.0, 3.0, hs, 5.0, 0.0))
            .add_location(Checked {
                properties,
                coefficient,
            })
            .build(&DiagnosticsSink::new())
            .unwrap()
    }

    #[test]
    fn test_valid_input() {
        let sink = DiagnosticsSink::new();
        let outcome = validate(&input(LocationProperties::new(10.0), 1.0, 1.0), &sink);
        assert_eq!(outcome, ValidationOutcome::Successful);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_model_hook_contributes_errors() {
        let sink = DiagnosticsSink::new();
        let outcome = validate(&input(LocationProperties::new(10.0), -2.0, 1.0), &sink);
        assert_eq!(outcome, ValidationOutcome::Failed);

        let events = sink.flush();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, DiagnosticPhase::Validate);
        assert_eq!(events[0].location, Some(0));
    }

    #[test]
    fn test_negative_wave_height_fails() {
        let sink = DiagnosticsSink::new();
        let outcome = validate(&input(LocationProperties::new(10.0), 1.0, -0.5), &sink);
        assert!(!outcome.is_successful());
    }

    #[test]
    fn test_initial_damage_above_failure_number_warns() {
        let sink = DiagnosticsSink::new();
        let props = LocationProperties::new(10.0)
            .with_initial_damage(1.5)
            .with_failure_number(1.0);
        let outcome = validate(&input(props, 1.0, 1.0), &sink);

        assert_eq!(outcome, ValidationOutcome::Successful);
        let events = sink.flush();
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_error());
    }

    #[test]
    fn test_non_positive_failure_number_fails() {
        let sink = DiagnosticsSink::new();
        let props = LocationProperties::new(10.0).with_failure_number(0.0);
        assert_eq!(validate(&input(props, 1.0, 1.0), &sink), ValidationOutcome::Failed);
    }

    #[test]
    fn test_infinite_failure_number_fails() {
        let sink = DiagnosticsSink::new();
        let props = LocationProperties::new(10.0).with_failure_number(f64::INFINITY);
        assert_eq!(validate(&input(props, 1.0, 1.0), &sink), ValidationOutcome::Failed);

        let events = sink.flush();
        assert_eq!(events.len(), 1);
        assert!(events[0].message.contains("failure_number"));
    }
}
