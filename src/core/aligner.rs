use bon::Builder;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::{
    core::{
        error::AlignmentError,
        horizon::{Horizon, Slot},
        series::Series,
        tariff::TariffSchedule,
    },
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

/// Merges the raw forecast series onto the spot-price grid.
///
/// Spot-price instants are the authoritative grid; production and consumption
/// are carried forward onto them, the tariff is selected per local time, and
/// the uncontrolled baseline cost is attached to every slot.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Aligner<'a> {
    production: &'a Series<Kilowatts>,
    consumption: &'a Series<Kilowatts>,
    spot_prices: &'a Series<KilowattHourRate>,

    /// Live price for the running hour, overriding the stale forecast value.
    current_spot_price: Option<KilowattHourRate>,

    tariffs: TariffSchedule,

    /// Wall-clock time of the scheduling request.
    now: DateTime<Utc>,

    /// First instant of the scheduling window.
    start_time: DateTime<Utc>,

    horizon: TimeDelta,
    slot_duration: TimeDelta,
    time_zone: Tz,
}

impl<'a, S: aligner_builder::IsComplete> AlignerBuilder<'a, S> {
    pub fn align(self) -> Result<Horizon, AlignmentError> {
        self.build().align()
    }
}

impl Aligner<'_> {
    #[instrument(
        skip_all,
        fields(start_time = %self.start_time, time_zone = %self.time_zone),
    )]
    fn align(self) -> Result<Horizon, AlignmentError> {
        for (name, is_empty) in [
            ("production", self.production.is_empty()),
            ("consumption", self.consumption.is_empty()),
            ("spot price", self.spot_prices.is_empty()),
        ] {
            if is_empty {
                return Err(AlignmentError::EmptySeries(name));
            }
        }
        let Some(first_consumption) = self.consumption.first_time() else {
            return Err(AlignmentError::EmptySeries("consumption"));
        };

        let mut spot_prices = self.spot_prices.clone();
        if let Some(price) = self.current_spot_price
            && let Ok(current_hour) = self.now.duration_trunc(TimeDelta::hours(1))
        {
            // The day-ahead forecast is stale for the hour that already runs.
            spot_prices.upsert(current_hour, price);
        }

        let end_time = self.start_time + self.horizon;
        let mut carried_production = self.production.carry_forward();
        let mut carried_consumption = self.consumption.carry_forward();

        let mut slots = Vec::with_capacity(spot_prices.len());
        let mut n_skipped = 0_usize;
        for (time, spot_price) in spot_prices.iter() {
            if time < first_consumption || time < self.start_time || time >= end_time {
                n_skipped += 1;
                continue;
            }
            let (Some(consumption), Some(production)) =
                (carried_consumption.value_at(time), carried_production.value_at(time))
            else {
                n_skipped += 1;
                continue;
            };

            let local_time = time.with_timezone(&self.time_zone);
            let grid_tariff = self.tariffs.rate_at(&local_time);
            let pcc_energy = (consumption + production) * self.slot_duration;
            let baseline_cost = if pcc_energy < KilowattHours::ZERO {
                // Exports are credited at the spot price alone:
                pcc_energy * spot_price
            } else {
                pcc_energy * (spot_price + grid_tariff)
            };

            slots.push(Slot {
                start: local_time,
                consumption,
                production,
                spot_price,
                grid_tariff,
                baseline_cost,
            });
        }

        if slots.is_empty() {
            return Err(AlignmentError::EmptyHorizon);
        }
        debug!(n_slots = slots.len(), n_skipped, "aligned");
        Ok(Horizon::new(slots, self.slot_duration))
    }
}
