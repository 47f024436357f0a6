use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::{
    core::{horizon::Horizon, solver::Trajectory},
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        rate::KilowattHourRate,
    },
};

/// One decoded schedule row, serialized under the published column names.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ScheduleRow {
    #[serde(skip)]
    pub period: usize,

    #[serde(rename = "datetime")]
    pub start: DateTime<Tz>,

    #[serde(rename = "Load")]
    pub load: Kilowatts,

    #[serde(rename = "PV")]
    pub production: Kilowatts,

    /// Net battery power, positive is charging.
    #[serde(rename = "ESS")]
    pub ess_power: Kilowatts,

    #[serde(rename = "ESS_SoC")]
    pub soc_percent: f64,

    #[serde(rename = "PCC_Export")]
    pub export: Kilowatts,

    #[serde(rename = "PCC_Import")]
    pub import: Kilowatts,

    /// Net power at the coupling point, positive is import.
    #[serde(rename = "PCC")]
    pub pcc: Kilowatts,

    #[serde(rename = "SpotPrice")]
    pub spot_price: KilowattHourRate,

    #[serde(rename = "GridTariff")]
    pub grid_tariff: KilowattHourRate,

    /// Realized cost of this slot, for the diagnostic table only.
    #[serde(skip)]
    pub cost: Cost,
}

/// Baseline versus optimized totals, for the comparison log line.
#[derive(Clone, Copy, Debug)]
pub struct CostSummary {
    pub baseline_cost: Cost,
    pub baseline_energy: KilowattHours,
    pub optimized_cost: Cost,
    pub optimized_energy: KilowattHours,
}

impl CostSummary {
    /// How much the schedule saves over leaving the battery idle.
    pub fn savings(&self) -> Cost {
        self.baseline_cost - self.optimized_cost
    }
}

/// The actionable dispatch schedule.
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,
    pub summary: CostSummary,
}

impl Schedule {
    /// Decode the solved trajectory into the published table.
    pub fn decode(
        horizon: &Horizon,
        trajectory: &Trajectory,
        degradation_rate: KilowattHourRate,
    ) -> Self {
        let duration = horizon.slot_duration();
        let mut optimized_cost = Cost::ZERO;
        let mut optimized_energy = KilowattHours::ZERO;

        let rows = horizon
            .slots()
            .iter()
            .zip(&trajectory.slots)
            .enumerate()
            .map(|(period, (slot, decision))| {
                let cost = decision.import * duration * (slot.spot_price + slot.grid_tariff)
                    - decision.export * duration * slot.spot_price
                    + decision.charge * duration * degradation_rate;
                optimized_cost += cost;
                optimized_energy += (decision.import - decision.export) * duration;

                ScheduleRow {
                    period,
                    start: slot.start,
                    load: slot.consumption,
                    production: slot.production,
                    ess_power: decision.ess_power,
                    soc_percent: decision.soc_percent,
                    export: decision.export,
                    import: decision.import,
                    pcc: decision.import - decision.export,
                    spot_price: slot.spot_price,
                    grid_tariff: slot.grid_tariff,
                    cost,
                }
            })
            .collect();

        Self {
            rows,
            summary: CostSummary {
                baseline_cost: horizon.baseline_cost(),
                baseline_energy: horizon.baseline_energy(),
                optimized_cost,
                optimized_energy,
            },
        }
    }
}
