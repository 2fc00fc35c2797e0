// crates/dk_models/tests/failure_instant.rs

//! 护面模型与失效时刻推导的集成测试

use dk_core::{
    CalculationInput, CalculationInputBuilder, CharacteristicPointType, DamageModel,
    FailureInstant, IntervalContext, LoadInterval, LocationProperties, LocationResult,
};
use dk_foundation::float::{approx_eq, contribution};
use dk_foundation::DiagnosticsSink;
use dk_models::{
    AsphaltWaveImpactLocation, AsphaltWaveImpactProperties, GrassWaveImpactLocation,
    GrassWaveImpactProperties, NaturalStoneLocation, NaturalStoneProperties,
};

fn constant_storm(
    model: impl DamageModel + 'static,
    step: f64,
    count: usize,
    water_level: f64,
) -> CalculationInput {
    let times: Vec<f64> = (0..=count).map(|i| i as f64 * step).collect();
    let loads = vec![(water_level, 1.0, 4.0, 0.0); count];
    CalculationInputBuilder::new()
        .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
        .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
        .unwrap()
        .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
        .unwrap()
        .add_load_series(&times, &loads)
        .add_location(model)
        .build(&DiagnosticsSink::new())
        .unwrap()
}

/// 顺序计算单个位置
fn run_sequential(input: &CalculationInput) -> LocationResult {
    let location = &input.locations()[0];
    let model = location.initialize(input.geometry()).unwrap();

    let mut damage = location.properties().initial_damage;
    let mut previous = None;
    let mut results = Vec::new();
    for (i, interval) in input.intervals().iter().enumerate() {
        let result = model
            .compute_interval(interval, IntervalContext::sequential(i, damage, previous))
            .unwrap();
        damage += contribution(result.increment_damage);
        previous = Some(result.increment_damage);
        results.push(result);
    }

    LocationResult::new(
        0,
        location.name(),
        *location.properties(),
        model.z(),
        input.intervals(),
        results,
    )
}

#[test]
fn grass_fails_at_time_line() {
    let input = constant_storm(GrassWaveImpactLocation::with_defaults(10.0), 3600.0, 10, 2.6);
    let result = run_sequential(&input);

    let time_line = GrassWaveImpactProperties::default().time_line(1.0);
    let t = result.get_failure_instant().unwrap();
    assert!(approx_eq(t, time_line, 1e-6));
}

#[test]
fn asphalt_fails_after_miner_sum() {
    let location = AsphaltWaveImpactLocation::new(
        LocationProperties::new(10.0).with_failure_number(0.05),
        AsphaltWaveImpactProperties::default(),
    );
    let input = constant_storm(location, 3600.0, 10, 2.5);
    let result = run_sequential(&input);

    let per_wave = AsphaltWaveImpactProperties::default().damage_per_wave(1.0, 1.0);
    let expected = 0.05 / per_wave * 4.0;
    let t = result.get_failure_instant().unwrap();
    assert!(approx_eq(t, expected, 1e-6));
}

#[test]
fn natural_stone_inverts_nonlinear_degradation() {
    let location = NaturalStoneLocation::new(
        LocationProperties::new(10.0).with_failure_number(0.6),
        NaturalStoneProperties::default(),
    );
    let input = constant_storm(location, 600.0, 10, 2.5);
    let result = run_sequential(&input);

    // 恒定载荷下 D(t) = (H/R)·(t/4000)^0.1，反算 t = 4000·(Df·R/H)^10
    let first = result.interval_results()[0].details.fields();
    let load = first.iter().find(|(k, _)| *k == "hydraulic_load").unwrap().1;
    let resistance = NaturalStoneProperties::default().resistance();
    let expected = 4000.0 * (0.6 * resistance / load).powi(10);

    match result.failure_instant() {
        FailureInstant::FailedAt(t) => {
            assert!(approx_eq(t, expected, 1e-6));
            assert!(t > 3000.0 && t < 3600.0);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn unloaded_location_never_fails() {
    let input = constant_storm(GrassWaveImpactLocation::with_defaults(10.0), 3600.0, 3, 0.0);
    let result = run_sequential(&input);

    assert!(result
        .interval_results()
        .iter()
        .all(|r| !r.is_loaded()));
    assert_eq!(result.final_damage(), 0.0);
    assert_eq!(result.failure_instant(), FailureInstant::NoFailure);
}

// ============================================================================
// 第二时段内失效：t = 100 + 模型反算历时
// ============================================================================

/// 两个时段 [0,100) 与 [100,600)，载荷相同
fn two_intervals(model: impl DamageModel + 'static, water_level: f64) -> CalculationInput {
    CalculationInputBuilder::new()
        .add_profile_segment(0.0, 0.0, 30.0, 7.5, 1.0)
        .add_characteristic_point(0.0, CharacteristicPointType::OuterToe)
        .unwrap()
        .add_characteristic_point(30.0, CharacteristicPointType::OuterCrest)
        .unwrap()
        .add_load_series(&[0.0, 100.0, 600.0], &[(water_level, 1.0, 4.0, 0.0); 2])
        .add_location(model)
        .build(&DiagnosticsSink::new())
        .unwrap()
}

fn assert_crosses_second_interval(result: &LocationResult, failure_number: f64) {
    let damages = result.cumulative_damages();
    assert_eq!(damages.len(), 2);
    assert!(damages[0] < failure_number);
    assert!(failure_number <= damages[1]);
}

#[test]
fn grass_fails_inside_second_interval() {
    // H = Hs = 1，tL = ln((1 - 0.25) / 1) / -0.000009722
    let time_line = (0.75f64).ln() / -0.000009722;
    let failure_number = 0.01;
    let damage_after_first = 100.0 / time_line;
    let expected = (failure_number - damage_after_first) * time_line;
    assert!(expected > 0.0);

    let location = GrassWaveImpactLocation::new(
        LocationProperties::new(10.0).with_failure_number(failure_number),
        GrassWaveImpactProperties::default(),
    );
    let result = run_sequential(&two_intervals(location, 2.6));
    assert_crosses_second_interval(&result, failure_number);

    match result.failure_instant() {
        FailureInstant::FailedAt(t) => assert!(approx_eq(t, 100.0 + expected, 1e-9)),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn asphalt_fails_inside_second_interval() {
    // 周期 4s：第一时段 25 个波，第二时段 125 个波
    let per_wave = AsphaltWaveImpactProperties::default().damage_per_wave(1.0, 1.0);
    assert!(per_wave > 0.0);
    let failure_number = 100.0 * per_wave;
    let damage_after_first = 25.0 * per_wave;
    let expected = (failure_number - damage_after_first) / per_wave * 4.0;
    assert!(approx_eq(expected, 300.0, 1e-9));

    let location = AsphaltWaveImpactLocation::new(
        LocationProperties::new(10.0).with_failure_number(failure_number),
        AsphaltWaveImpactProperties::default(),
    );
    let result = run_sequential(&two_intervals(location, 2.5));
    assert_crosses_second_interval(&result, failure_number);

    match result.failure_instant() {
        FailureInstant::FailedAt(t) => assert!(approx_eq(t, 100.0 + expected, 1e-9)),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn natural_stone_fails_inside_second_interval() {
    // 载荷 H 与失效值无关，先以默认失效值取出
    let unbounded = run_sequential(&two_intervals(
        NaturalStoneLocation::new(LocationProperties::new(10.0), NaturalStoneProperties::default()),
        2.5,
    ));
    let fields = unbounded.interval_results()[0].details.fields();
    let load = fields.iter().find(|(k, _)| *k == "hydraulic_load").unwrap().1;
    assert!(load > 0.0);

    // D(t) = (H/R)·(t/4000)^0.1，T = 4
    let resistance = NaturalStoneProperties::default().resistance();
    let damage_at = |t: f64| load / resistance * (t / 4000.0).powf(0.1);
    let damage_after_first = damage_at(100.0);
    let failure_number = 0.5 * (damage_after_first + damage_at(600.0));
    let expected = 4000.0
        * ((failure_number * resistance / load).powi(10)
            - (damage_after_first * resistance / load).powi(10));
    assert!(expected > 0.0 && expected < 500.0);

    let location = NaturalStoneLocation::new(
        LocationProperties::new(10.0).with_failure_number(failure_number),
        NaturalStoneProperties::default(),
    );
    let result = run_sequential(&two_intervals(location, 2.5));
    assert_crosses_second_interval(&result, failure_number);

    match result.failure_instant() {
        FailureInstant::FailedAt(t) => assert!(approx_eq(t, 100.0 + expected, 1e-9)),
        other => panic!("unexpected outcome {:?}", other),
    }
}
