use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};

use crate::{cli::GridArgs, quantity::rate::KilowattHourRate};

/// Time-of-use grid tariff: cheaper on weekends and within the night window.
#[derive(Copy, Clone, Debug)]
pub struct TariffSchedule {
    pub day: KilowattHourRate,
    pub night: KilowattHourRate,

    /// Local hour at which the night window opens.
    pub night_from_hour: u32,

    /// Local hour at which the night window closes.
    pub night_until_hour: u32,
}

impl TariffSchedule {
    /// Tariff for the instant, which must already be in the local time zone.
    pub fn rate_at<Tz: TimeZone>(&self, local_time: &DateTime<Tz>) -> KilowattHourRate {
        if self.is_night(local_time) { self.night } else { self.day }
    }

    fn is_night<Tz: TimeZone>(&self, local_time: &DateTime<Tz>) -> bool {
        matches!(local_time.weekday(), Weekday::Sat | Weekday::Sun)
            || local_time.hour() >= self.night_from_hour
            || local_time.hour() < self.night_until_hour
    }
}

impl From<&GridArgs> for TariffSchedule {
    fn from(grid: &GridArgs) -> Self {
        Self {
            day: grid.day_tariff,
            night: grid.night_tariff,
            night_from_hour: grid.night_from_hour,
            night_until_hour: grid.night_until_hour,
        }
    }
}
