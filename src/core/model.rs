use bon::bon;
use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};
use itertools::Itertools;

use crate::{
    cli::{BatteryArgs, GridArgs},
    core::horizon::Horizon,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// Decision variables of one scheduling slot.
///
/// The binary gates are not kept: once solved, the continuous variables alone
/// describe the dispatch.
#[derive(Copy, Clone)]
pub struct SlotVariables {
    /// Power drawn from the grid (kW).
    pub import: Variable,

    /// Power fed into the grid (kW).
    pub export: Variable,

    /// Battery charging power (kW).
    pub charge: Variable,

    /// Battery discharging power (kW).
    pub discharge: Variable,

    /// Net battery power (kW, positive is charging).
    pub ess_power: Variable,

    /// Effective state of charge at slot start (%).
    pub soc: Variable,
}

/// The assembled mixed-integer program, ready to hand to the solver.
pub struct DispatchModel {
    pub(crate) variables: ProblemVariables,
    pub(crate) objective: Expression,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) slots: Vec<SlotVariables>,
    pub(crate) initial_soc: f64,
    pub(crate) target_soc: f64,
}

#[bon]
impl DispatchModel {
    /// Formulate the dispatch program for the horizon.
    ///
    /// Construction failures are configuration or programming errors and
    /// propagate with context; they are never converted into an empty result.
    #[builder]
    pub fn formulate(horizon: &Horizon, battery: BatteryArgs, grid: GridArgs) -> Result<Self> {
        ensure!(!horizon.is_empty(), "cannot formulate a model over an empty horizon");

        let capacity = battery.capacity;
        ensure!(capacity > KilowattHours::ZERO, "battery capacity must be positive: {capacity}");
        let power_limit = battery.power;
        ensure!(power_limit >= Kilowatts::ZERO, "battery power must not be negative: {power_limit}");
        ensure!(
            grid.import_limit >= Kilowatts::ZERO,
            "the import limit must not be negative: {}",
            grid.import_limit,
        );
        ensure!(
            grid.export_limit <= Kilowatts::ZERO,
            "the export limit must not be positive: {}",
            grid.export_limit,
        );

        let hours = horizon.hours_per_slot();

        // Sensors occasionally report slightly negative residual energy, and
        // an over-full reading would contradict the variable bounds, hence
        // the clamping. The target is deliberately left unclamped: reaching
        // an impossible target must show up as infeasibility.
        let initial_soc = (battery.residual_energy / capacity * 100.0).clamp(0.0, 100.0);
        let target_soc = battery.target_energy / capacity * 100.0;

        let mut variables = ProblemVariables::new();
        let mut constraints = Vec::new();
        let mut objective = Expression::default();
        let mut slots = Vec::with_capacity(horizon.len());

        for slot in horizon.slots() {
            let import = variables.add(variable().min(0.0));
            let export = variables.add(variable().min(0.0));
            let import_on = variables.add(variable().binary());
            let export_on = variables.add(variable().binary());
            let charge = variables.add(variable().min(0.0));
            let discharge = variables.add(variable().min(0.0));
            let charge_on = variables.add(variable().binary());
            let discharge_on = variables.add(variable().binary());
            let ess_power = variables.add(variable().min(-power_limit.0).max(power_limit.0));
            let soc = variables.add(variable().min(0.0).max(100.0));

            // A relaxed model could net opposite flows within a slot, which
            // the hardware cannot do; the gates forbid the combination.
            constraints.push(constraint!(import_on + export_on <= 1));
            constraints.push(constraint!(charge_on + discharge_on <= 1));
            constraints.push(constraint!(import <= grid.import_limit.0 * import_on));
            constraints.push(constraint!(export <= grid.export_limit.abs().0 * export_on));
            constraints.push(constraint!(charge <= power_limit.0 * charge_on));
            constraints.push(constraint!(discharge <= power_limit.0 * discharge_on));
            constraints.push(constraint!(ess_power == charge - discharge));

            // Net grid exchange covers the site load plus the battery flow:
            let pcc_power = slot.pcc_power();
            constraints.push(constraint!(import - export - ess_power == pcc_power.0));

            let import_rate = slot.spot_price + slot.grid_tariff;
            objective += import * (hours * import_rate.0);
            objective -= export * (hours * slot.spot_price.0);
            objective += charge * (hours * grid.degradation_rate.0);

            slots.push(SlotVariables { import, export, charge, discharge, ess_power, soc });
        }

        // The state of charge threads the slots together:
        let soc_step = 100.0 * hours / capacity.0;
        constraints.push(constraint!(slots[0].soc == initial_soc));
        for (previous, current) in slots.iter().tuple_windows() {
            constraints
                .push(constraint!(current.soc == soc_step * previous.ess_power + previous.soc));
        }
        let last = slots[slots.len() - 1];
        constraints.push(constraint!(soc_step * last.ess_power + last.soc == target_soc));

        debug!(initial_soc, target_soc, n_constraints = constraints.len(), "formulated");
        Ok(Self { variables, objective, constraints, slots, initial_soc, target_soc })
    }
}
