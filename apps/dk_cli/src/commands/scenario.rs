// apps/dk_cli/src/commands/scenario.rs

//! 示例场景：带平台的堤防剖面与正弦形风暴过程

use anyhow::{bail, Result};
use clap::Args;
use dk_core::{
    CalculationInput, CalculationInputBuilder, CharacteristicPointType, LocationProperties,
};
use dk_foundation::DiagnosticsSink;
use dk_models::RevetmentKind;
use std::f64::consts::PI;
use tracing::info;

/// 场景参数
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// 护面类型，可重复指定 (natural-stone, grass-wave-impact, asphalt-wave-impact)
    #[arg(short, long = "revetment", default_value = "natural-stone")]
    pub revetments: Vec<RevetmentKind>,

    /// 每种护面的计算位置数（沿外坡均匀分布）
    #[arg(short = 'n', long, default_value = "5")]
    pub locations: usize,

    /// 失效损伤值
    #[arg(long, default_value = "1.0")]
    pub failure_number: f64,

    /// 初始损伤
    #[arg(long, default_value = "0.0")]
    pub initial_damage: f64,

    /// 风暴历时 [h]，每小时一个载荷时段
    #[arg(long, default_value = "36")]
    pub hours: usize,

    /// 起始水位 [m]
    #[arg(long, default_value = "1.0")]
    pub base_water_level: f64,

    /// 峰值水位 [m]
    #[arg(long, default_value = "4.0")]
    pub peak_water_level: f64,

    /// 峰值波高 [m]
    #[arg(long, default_value = "1.5")]
    pub peak_wave_height: f64,

    /// 峰值波周期 [s]
    #[arg(long, default_value = "6.0")]
    pub peak_wave_period: f64,

    /// 波向 [°]
    #[arg(long, default_value = "0.0")]
    pub wave_direction: f64,

    /// 堤轴法向方位角 [°]
    #[arg(long, default_value = "0.0")]
    pub orientation: f64,
}

/// 外坡坡脚、平台和堤顶的 x 坐标
const OUTER_TOE: f64 = 0.0;
const BERM_CREST: f64 = 12.0;
const BERM_NOTCH: f64 = 18.0;
const OUTER_CREST: f64 = 30.0;

impl ScenarioArgs {
    /// 构建计算输入，结构诊断写入 `sink`
    pub fn build(&self, sink: &DiagnosticsSink) -> Result<CalculationInput> {
        if self.locations == 0 || self.revetments.is_empty() {
            bail!("至少需要一个计算位置");
        }

        let mut builder = self.profile()?.with_orientation(self.orientation);
        builder = self.add_storm(builder);

        for kind in &self.revetments {
            for x in self.location_positions() {
                let location = LocationProperties::new(x)
                    .with_initial_damage(self.initial_damage)
                    .with_failure_number(self.failure_number);
                builder = builder.add_boxed_location(kind.create_location(location));
            }
        }

        let input = builder.build(sink)?;

        info!(
            "场景: {} 个位置, {} 个时段, 时段范围 {:?}",
            input.locations().len(),
            input.intervals().len(),
            input.time_horizon()
        );
        Ok(input)
    }

    fn profile(&self) -> Result<CalculationInputBuilder> {
        let builder = CalculationInputBuilder::new()
            .add_profile_segment(OUTER_TOE, 0.0, BERM_CREST, 3.0, 1.0)
            .add_profile_segment(BERM_CREST, 3.0, BERM_NOTCH, 3.0, 1.0)
            .add_profile_segment(BERM_NOTCH, 3.0, OUTER_CREST, 6.0, 1.0)
            .add_profile_segment(OUTER_CREST, 6.0, 33.0, 6.0, 1.0)
            .add_profile_segment(33.0, 6.0, 45.0, 0.0, 1.0)
            .with_foreshore(0.004, -1.0)
            .add_characteristic_point(OUTER_TOE, CharacteristicPointType::OuterToe)?
            .add_characteristic_point(BERM_CREST, CharacteristicPointType::CrestOuterBerm)?
            .add_characteristic_point(BERM_NOTCH, CharacteristicPointType::NotchOuterBerm)?
            .add_characteristic_point(OUTER_CREST, CharacteristicPointType::OuterCrest)?
            .add_characteristic_point(33.0, CharacteristicPointType::InnerCrest)?
            .add_characteristic_point(45.0, CharacteristicPointType::InnerToe)?;
        Ok(builder)
    }

    /// 正弦形风暴：水位、波高和周期在中点达到峰值
    fn add_storm(&self, builder: CalculationInputBuilder) -> CalculationInputBuilder {
        let hours = self.hours.max(1);
        let times: Vec<f64> = (0..=hours).map(|h| h as f64 * 3600.0).collect();
        let loads: Vec<(f64, f64, f64, f64)> = (0..hours)
            .map(|h| {
                let surge = ((h as f64 + 0.5) / hours as f64 * PI).sin();
                let water_level =
                    self.base_water_level + (self.peak_water_level - self.base_water_level) * surge;
                let wave_height = self.peak_wave_height * surge;
                let wave_period = self.peak_wave_period * (0.5 + 0.5 * surge);
                (water_level, wave_height, wave_period, self.wave_direction)
            })
            .collect();
        builder.add_load_series(&times, &loads)
    }

    /// 在坡脚和堤顶之间均匀分布（不含端点）
    fn location_positions(&self) -> Vec<f64> {
        let step = (OUTER_CREST - OUTER_TOE) / (self.locations + 1) as f64;
        (1..=self.locations)
            .map(|i| OUTER_TOE + step * i as f64)
            .collect()
    }
}
