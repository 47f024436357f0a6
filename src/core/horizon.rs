use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::quantity::{
    cost::Cost,
    energy::KilowattHours,
    power::Kilowatts,
    rate::KilowattHourRate,
};

/// One scheduling slot with the aligned inputs it was derived from.
#[derive(Clone, Copy, Debug)]
pub struct Slot {
    /// Slot start in the configured local time zone.
    pub start: DateTime<Tz>,

    /// Consumption forecast (kW).
    pub consumption: Kilowatts,

    /// Production forecast (kW, negative means generation).
    pub production: Kilowatts,

    pub spot_price: KilowattHourRate,
    pub grid_tariff: KilowattHourRate,

    /// Net grid cost of this slot with the battery idle.
    pub baseline_cost: Cost,
}

impl Slot {
    /// Net power at the point of common coupling, battery aside.
    pub fn pcc_power(self) -> Kilowatts {
        self.consumption + self.production
    }
}

/// The aligned scheduling window.
#[derive(Clone, Debug)]
pub struct Horizon {
    slots: Vec<Slot>,
    slot_duration: TimeDelta,
}

impl Horizon {
    pub(crate) fn new(slots: Vec<Slot>, slot_duration: TimeDelta) -> Self {
        Self { slots, slot_duration }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub const fn slot_duration(&self) -> TimeDelta {
        self.slot_duration
    }

    /// Slot length in hours: the power-to-energy conversion factor.
    pub fn hours_per_slot(&self) -> f64 {
        self.slot_duration.as_seconds_f64() / 3600.0
    }

    /// Total grid cost over the horizon with the battery idle.
    pub fn baseline_cost(&self) -> Cost {
        self.slots.iter().map(|slot| slot.baseline_cost).sum()
    }

    /// Net grid energy over the horizon with the battery idle.
    pub fn baseline_energy(&self) -> KilowattHours {
        self.slots.iter().map(|slot| slot.pcc_power() * self.slot_duration).sum()
    }
}
