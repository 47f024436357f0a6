use std::time::{Duration, Instant};

use good_lp::{ResolutionError, Solution, SolverModel, microlp};

use crate::{
    core::{error::DispatchError, model::DispatchModel},
    prelude::*,
    quantity::power::Kilowatts,
};

/// Solved decision values for one slot.
#[derive(Copy, Clone, Debug)]
pub struct SlotDecision {
    pub import: Kilowatts,
    pub export: Kilowatts,
    pub charge: Kilowatts,
    pub discharge: Kilowatts,
    pub ess_power: Kilowatts,
    pub soc_percent: f64,
}

/// The optimal trajectory extracted from a solved model.
#[derive(Debug)]
pub struct Trajectory {
    pub slots: Vec<SlotDecision>,
}

/// Submit the model to the MILP solver, once, and classify the outcome.
///
/// No retries here: a caller wanting to relax the constraints or to extend
/// the time budget re-invokes the pipeline with different parameters.
#[instrument(skip_all, fields(time_limit = ?time_limit))]
pub fn solve(model: DispatchModel, time_limit: Duration) -> Result<Trajectory, DispatchError> {
    let DispatchModel { variables, objective, constraints, slots, initial_soc, target_soc } =
        model;
    debug!(initial_soc, target_soc, "submitting");

    let mut problem = variables.minimise(objective).using(microlp);
    for constraint in constraints {
        problem = problem.with(constraint);
    }

    let start_instant = Instant::now();
    match problem.solve() {
        Ok(solution) => {
            info!(elapsed = ?start_instant.elapsed(), "solved");
            let slots = slots
                .iter()
                .map(|slot| SlotDecision {
                    import: Kilowatts::from(solution.value(slot.import)),
                    export: Kilowatts::from(solution.value(slot.export)),
                    charge: Kilowatts::from(solution.value(slot.charge)),
                    discharge: Kilowatts::from(solution.value(slot.discharge)),
                    ess_power: Kilowatts::from(solution.value(slot.ess_power)),
                    soc_percent: solution.value(slot.soc),
                })
                .collect();
            Ok(Trajectory { slots })
        }
        Err(error) => Err(classify(&error, time_limit)),
    }
}

fn classify(error: &ResolutionError, limit: Duration) -> DispatchError {
    let report = error.to_string();
    if matches!(error, ResolutionError::Infeasible | ResolutionError::Unbounded) {
        return DispatchError::Infeasible { report };
    }
    if report.to_ascii_lowercase().contains("time limit") {
        DispatchError::Timeout { limit, report }
    } else {
        DispatchError::SolverUnavailable { report }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Tallinn;

    use super::*;
    use crate::{
        cli::{BatteryArgs, GridArgs},
        core::{
            horizon::{Horizon, Slot},
            model::DispatchModel,
        },
        quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    };

    const EPSILON: f64 = 1e-6;

    fn grid() -> GridArgs {
        GridArgs {
            import_limit: Kilowatts::from(20.0),
            export_limit: Kilowatts::from(-15.0),
            day_tariff: KilowattHourRate::from(0.07),
            night_tariff: KilowattHourRate::from(0.05),
            night_from_hour: 22,
            night_until_hour: 7,
            degradation_rate: KilowattHourRate::from(0.139),
        }
    }

    fn hourly_slots(inputs: &[(f64, f64, f64)], tariff: f64) -> Horizon {
        let slots = inputs
            .iter()
            .enumerate()
            .map(|(index, (consumption, production, spot_price))| {
                let pcc = consumption + production;
                let rate =
                    if pcc < 0.0 { *spot_price } else { spot_price + tariff };
                Slot {
                    start: Tallinn.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()
                        + TimeDelta::hours(i64::try_from(index).unwrap()),
                    consumption: Kilowatts::from(*consumption),
                    production: Kilowatts::from(*production),
                    spot_price: KilowattHourRate::from(*spot_price),
                    grid_tariff: KilowattHourRate::from(tariff),
                    baseline_cost: Cost::from(pcc * rate),
                }
            })
            .collect();
        Horizon::new(slots, TimeDelta::hours(1))
    }

    fn solve_horizon(horizon: &Horizon, battery: BatteryArgs) -> Result<Trajectory, DispatchError> {
        let model = DispatchModel::formulate()
            .horizon(horizon)
            .battery(battery)
            .grid(grid())
            .call()
            .unwrap();
        solve(model, Duration::from_secs(300))
    }

    fn realized_cost(horizon: &Horizon, trajectory: &Trajectory) -> f64 {
        horizon
            .slots()
            .iter()
            .zip(&trajectory.slots)
            .map(|(slot, decision)| {
                decision.import.0 * (slot.spot_price.0 + slot.grid_tariff.0)
                    - decision.export.0 * slot.spot_price.0
                    + decision.charge.0 * 0.139
            })
            .sum()
    }

    /// Flat prices, no production: the battery cannot beat the baseline, so
    /// the optimum is to stay idle and pay exactly the uncontrolled cost.
    #[test]
    fn test_flat_prices_match_baseline() {
        let horizon = hourly_slots(
            &[(10.0, 0.0, 0.1), (10.0, 0.0, 0.1), (10.0, 0.0, 0.1), (10.0, 0.0, 0.1)],
            0.07,
        );
        let battery = BatteryArgs {
            power: Kilowatts::from(5.0),
            capacity: KilowattHours::from(20.0),
            residual_energy: KilowattHours::from(10.0),
            target_energy: KilowattHours::from(10.0),
            min_soc_percent: 0.0,
            max_soc_percent: 0.0,
            safe_soc_margin_percent: 0.1,
        };

        let trajectory = solve_horizon(&horizon, battery).unwrap();

        assert_abs_diff_eq!(
            realized_cost(&horizon, &trajectory),
            4.0 * 10.0 * 0.17,
            epsilon = EPSILON,
        );
        for decision in &trajectory.slots {
            assert_abs_diff_eq!(decision.charge.0, 0.0, epsilon = EPSILON);
            assert_abs_diff_eq!(decision.discharge.0, 0.0, epsilon = EPSILON);
            assert_abs_diff_eq!(decision.import.0, 10.0, epsilon = EPSILON);
        }
    }

    /// A cheap slot followed by an expensive one: charge early, sell late.
    #[test]
    fn test_arbitrage() {
        let horizon = hourly_slots(&[(0.0, 0.0, 0.01), (0.0, 0.0, 1.0)], 0.05);
        let battery = BatteryArgs {
            power: Kilowatts::from(5.0),
            capacity: KilowattHours::from(10.0),
            residual_energy: KilowattHours::from(0.0),
            target_energy: KilowattHours::from(0.0),
            min_soc_percent: 0.0,
            max_soc_percent: 0.0,
            safe_soc_margin_percent: 0.1,
        };

        let trajectory = solve_horizon(&horizon, battery).unwrap();
        let slots = &trajectory.slots;

        assert_abs_diff_eq!(slots[0].charge.0, 5.0, epsilon = EPSILON);
        assert_abs_diff_eq!(slots[0].import.0, 5.0, epsilon = EPSILON);
        assert_abs_diff_eq!(slots[1].discharge.0, 5.0, epsilon = EPSILON);
        assert_abs_diff_eq!(slots[1].export.0, 5.0, epsilon = EPSILON);

        // Charged 5 kWh into a 10 kWh battery:
        assert_abs_diff_eq!(slots[0].soc_percent, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(slots[1].soc_percent, 50.0, epsilon = EPSILON);

        // 5 kWh in at (0.01 + 0.05) plus wear, 5 kWh out at 1.00:
        assert_abs_diff_eq!(
            realized_cost(&horizon, &trajectory),
            5.0 * 0.06 + 5.0 * 0.139 - 5.0,
            epsilon = EPSILON,
        );
    }

    /// The physical invariants must hold for every solved slot.
    #[test]
    fn test_solution_invariants() {
        let horizon = hourly_slots(
            &[(4.0, -1.0, 0.02), (6.0, -2.0, 0.4), (8.0, 0.0, 0.9), (2.0, -7.0, 0.3)],
            0.07,
        );
        let battery = BatteryArgs {
            power: Kilowatts::from(5.0),
            capacity: KilowattHours::from(20.0),
            residual_energy: KilowattHours::from(4.0),
            target_energy: KilowattHours::from(4.0),
            min_soc_percent: 0.0,
            max_soc_percent: 0.0,
            safe_soc_margin_percent: 0.1,
        };

        let trajectory = solve_horizon(&horizon, battery).unwrap();

        for (slot, decision) in horizon.slots().iter().zip(&trajectory.slots) {
            // Complementarity:
            assert_abs_diff_eq!(decision.charge.0 * decision.discharge.0, 0.0, epsilon = EPSILON);
            assert_abs_diff_eq!(decision.import.0 * decision.export.0, 0.0, epsilon = EPSILON);
            // Power balance at the coupling point:
            assert_abs_diff_eq!(
                decision.import.0 - decision.export.0,
                slot.pcc_power().0 + decision.ess_power.0,
                epsilon = EPSILON,
            );
            // Net battery power decomposition:
            assert_abs_diff_eq!(
                decision.ess_power.0,
                decision.charge.0 - decision.discharge.0,
                epsilon = EPSILON,
            );
            // State-of-charge bounds:
            assert!((-EPSILON..=100.0 + EPSILON).contains(&decision.soc_percent));
        }

        // The recurrence ties consecutive slots together:
        for pair in trajectory.slots.windows(2) {
            assert_abs_diff_eq!(
                pair[1].soc_percent,
                pair[0].soc_percent + pair[0].ess_power.0 / 20.0 * 100.0,
                epsilon = EPSILON,
            );
        }

        // And the final projected state meets the target:
        let last = trajectory.slots.last().unwrap();
        assert_abs_diff_eq!(
            last.soc_percent + last.ess_power.0 / 20.0 * 100.0,
            20.0,
            epsilon = EPSILON,
        );
    }

    /// Two independent runs must agree on the objective value.
    #[test]
    fn test_objective_is_reproducible() {
        let horizon = hourly_slots(&[(5.0, -1.0, 0.05), (5.0, 0.0, 0.6)], 0.07);
        let battery = BatteryArgs {
            power: Kilowatts::from(3.0),
            capacity: KilowattHours::from(10.0),
            residual_energy: KilowattHours::from(5.0),
            target_energy: KilowattHours::from(5.0),
            min_soc_percent: 0.0,
            max_soc_percent: 0.0,
            safe_soc_margin_percent: 0.1,
        };

        let first = solve_horizon(&horizon, battery).unwrap();
        let second = solve_horizon(&horizon, battery).unwrap();
        assert_abs_diff_eq!(
            realized_cost(&horizon, &first),
            realized_cost(&horizon, &second),
            epsilon = EPSILON,
        );
    }

    /// An end target beyond what the power limit allows must be reported as
    /// infeasible, never silently clamped.
    #[test]
    fn test_unreachable_target_is_infeasible() {
        let horizon = hourly_slots(&[(0.0, 0.0, 0.1)], 0.07);
        let battery = BatteryArgs {
            power: Kilowatts::from(5.0),
            capacity: KilowattHours::from(20.0),
            residual_energy: KilowattHours::from(0.0),
            target_energy: KilowattHours::from(20.0),
            min_soc_percent: 0.0,
            max_soc_percent: 0.0,
            safe_soc_margin_percent: 0.1,
        };

        let error = solve_horizon(&horizon, battery).unwrap_err();
        assert!(matches!(error, DispatchError::Infeasible { .. }), "got: {error:?}");
    }
}
