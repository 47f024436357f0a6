use chrono::{DateTime, Utc};

use crate::{
    cli::PlanArgs,
    core::{
        aligner::Aligner,
        error::DispatchError,
        model::DispatchModel,
        schedule::Schedule,
        solver::solve,
        tariff::TariffSchedule,
    },
    input::read_series,
    prelude::*,
    tables::{build_schedule_table, build_summary_table},
};

/// Run the full pipeline: align, formulate, solve, decode, render, export.
#[instrument(skip_all)]
pub fn plan(args: &PlanArgs, now: DateTime<Utc>) -> Result {
    let production = read_series(&args.forecasts.production)?;
    let consumption = read_series(&args.forecasts.consumption)?;
    let spot_prices = read_series(&args.forecasts.spot_prices)?;
    info!(
        n_production = production.len(),
        n_consumption = consumption.len(),
        n_spot_prices = spot_prices.len(),
        "loaded the forecasts",
    );
    info!(
        battery_power = %args.battery.power,
        battery_capacity = %args.battery.capacity,
        residual_energy = %args.battery.residual_energy,
        target_energy = %args.battery.target_energy,
        min_soc_percent = args.battery.min_soc_percent,
        max_soc_percent = args.battery.max_soc_percent,
        safe_soc_margin_percent = args.battery.safe_soc_margin_percent,
        import_limit = %args.grid.import_limit,
        export_limit = %args.grid.export_limit,
        day_tariff = %args.grid.day_tariff,
        night_tariff = %args.grid.night_tariff,
        degradation_cost = %args.grid.degradation_rate,
        time_zone = %args.horizon.time_zone,
        "planning",
    );

    let horizon = Aligner::builder()
        .production(&production)
        .consumption(&consumption)
        .spot_prices(&spot_prices)
        .maybe_current_spot_price(args.forecasts.current_spot_price)
        .tariffs(TariffSchedule::from(&args.grid))
        .now(now)
        .start_time(args.horizon.start_time.unwrap_or(now))
        .horizon(args.horizon.horizon())
        .slot_duration(args.horizon.slot_duration())
        .time_zone(args.horizon.time_zone)
        .align()
        // Alignment failures are not recoverable within this round:
        .map_err(DispatchError::from)?;
    info!(n_slots = horizon.len(), baseline_cost = %horizon.baseline_cost(), "aligned");

    let model = DispatchModel::formulate()
        .horizon(&horizon)
        .battery(args.battery)
        .grid(args.grid)
        .call()?;

    match solve(model, args.solver.time_limit()) {
        Ok(trajectory) => {
            let schedule = Schedule::decode(&horizon, &trajectory, args.grid.degradation_rate);
            info!(
                baseline_cost = %schedule.summary.baseline_cost,
                baseline_energy = %schedule.summary.baseline_energy,
                optimized_cost = %schedule.summary.optimized_cost,
                optimized_energy = %schedule.summary.optimized_energy,
                savings = %schedule.summary.savings(),
                "solved",
            );
            println!("{}", build_schedule_table(&schedule));
            println!("{}", build_summary_table(&schedule.summary));
            if let Some(path) = &args.output {
                let json = serde_json::to_string_pretty(&schedule.rows)?;
                std::fs::write(path, json)
                    .with_context(|| format!("failed to write `{}`", path.display()))?;
                info!(path = %path.display(), "exported the schedule");
            }
        }
        Err(error @ DispatchError::SolverUnavailable { .. }) => return Err(error.into()),
        Err(error) => {
            // A bad solve must not take down a rolling scheduler; this round
            // simply produces no schedule.
            error!(%error, "no schedule produced");
        }
    }

    Ok(())
}
