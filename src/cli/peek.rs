use chrono::{DateTime, Utc};

use crate::{
    cli::PeekArgs,
    core::{aligner::Aligner, error::DispatchError, tariff::TariffSchedule},
    input::read_series,
    prelude::*,
    tables::build_horizon_table,
};

/// Align the forecasts and show the baseline horizon without solving.
#[instrument(skip_all)]
pub fn peek(args: &PeekArgs, now: DateTime<Utc>) -> Result {
    let production = read_series(&args.forecasts.production)?;
    let consumption = read_series(&args.forecasts.consumption)?;
    let spot_prices = read_series(&args.forecasts.spot_prices)?;

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
        .map_err(DispatchError::from)?;

    println!("{}", build_horizon_table(&horizon));
    info!(
        n_slots = horizon.len(),
        baseline_cost = %horizon.baseline_cost(),
        baseline_energy = %horizon.baseline_energy(),
        "aligned",
    );
    Ok(())
}
