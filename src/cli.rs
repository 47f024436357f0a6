pub mod peek;
pub mod plan;

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};

use crate::quantity::{energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Align the forecasts, solve the dispatch program, and print the schedule.
    Plan(Box<PlanArgs>),

    /// Align the forecasts and show the baseline horizon without solving.
    Peek(Box<PeekArgs>),
}

#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub forecasts: ForecastArgs,

    #[clap(flatten)]
    pub horizon: HorizonArgs,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub grid: GridArgs,

    #[clap(flatten)]
    pub solver: SolverArgs,

    /// Write the schedule as JSON for the publishing step.
    #[clap(long, env = "SCHEDULE_OUTPUT_PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct PeekArgs {
    #[clap(flatten)]
    pub forecasts: ForecastArgs,

    #[clap(flatten)]
    pub horizon: HorizonArgs,

    #[clap(flatten)]
    pub grid: GridArgs,
}

#[derive(Clone, Parser)]
pub struct ForecastArgs {
    /// Production forecast file (kW, negative values are generation).
    #[clap(long = "production", env = "PRODUCTION_PATH")]
    pub production: PathBuf,

    /// Consumption forecast file (kW).
    #[clap(long = "consumption", env = "CONSUMPTION_PATH")]
    pub consumption: PathBuf,

    /// Day-ahead spot price forecast file (EUR/kWh).
    #[clap(long = "spot-prices", env = "SPOT_PRICES_PATH")]
    pub spot_prices: PathBuf,

    /// Live spot price of the running hour (EUR/kWh), overriding the forecast.
    #[clap(long = "current-spot-price", env = "CURRENT_SPOT_PRICE")]
    pub current_spot_price: Option<KilowattHourRate>,
}

#[derive(Copy, Clone, Parser)]
pub struct HorizonArgs {
    /// First instant of the scheduling window; defaults to the current time.
    #[clap(long = "start-time", env = "START_TIME")]
    pub start_time: Option<DateTime<Utc>>,

    /// Scheduling window length in seconds.
    #[clap(long = "horizon-seconds", default_value = "86400", env = "HORIZON_SECONDS")]
    pub horizon_seconds: i64,

    /// Scheduling slot length in seconds.
    #[clap(long = "interval-seconds", default_value = "900", env = "INTERVAL_SECONDS")]
    pub interval_seconds: i64,

    /// Local time zone for tariff selection and display.
    #[clap(long = "time-zone", default_value = "Europe/Tallinn", env = "TIME_ZONE")]
    pub time_zone: Tz,
}

impl HorizonArgs {
    pub fn horizon(&self) -> TimeDelta {
        TimeDelta::seconds(self.horizon_seconds)
    }

    pub fn slot_duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.interval_seconds)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Power limit in kilowatts, symmetric for charging and discharging.
    #[clap(long = "battery-power", env = "BATTERY_POWER")]
    pub power: Kilowatts,

    /// Rated energy capacity in kilowatt-hours.
    #[clap(long = "battery-capacity", env = "BATTERY_CAPACITY")]
    pub capacity: KilowattHours,

    /// Currently stored energy in kilowatt-hours.
    ///
    /// Upstream sensors occasionally report slightly negative values; those
    /// count as an empty battery.
    #[clap(
        long = "battery-residual-energy",
        env = "BATTERY_RESIDUAL_ENERGY",
        allow_negative_numbers = true
    )]
    pub residual_energy: KilowattHours,

    /// Stored energy to reach by the end of the horizon, in kilowatt-hours.
    #[clap(long = "battery-target-energy", default_value = "10", env = "BATTERY_TARGET_ENERGY")]
    pub target_energy: KilowattHours,

    /// Minimal state-of-charge percent.
    #[clap(long = "min-soc-percent", default_value = "0", env = "MIN_SOC_PERCENT")]
    pub min_soc_percent: f64,

    /// Maximal state-of-charge percent.
    #[clap(long = "max-soc-percent", default_value = "0", env = "MAX_SOC_PERCENT")]
    pub max_soc_percent: f64,

    /// Safe state-of-charge margin percent.
    #[clap(
        long = "safe-soc-margin-percent",
        default_value = "0.1",
        env = "SAFE_SOC_MARGIN_PERCENT"
    )]
    pub safe_soc_margin_percent: f64,
}

#[derive(Copy, Clone, Parser)]
pub struct GridArgs {
    /// Maximal import power at the point of common coupling, in kilowatts.
    #[clap(long = "import-limit", default_value = "20", env = "IMPORT_LIMIT")]
    pub import_limit: Kilowatts,

    /// Maximal export power at the point of common coupling, in kilowatts
    /// (non-positive).
    #[clap(
        long = "export-limit",
        default_value = "-15",
        env = "EXPORT_LIMIT",
        allow_negative_numbers = true
    )]
    pub export_limit: Kilowatts,

    /// Grid tariff on working-day imports, in EUR/kWh.
    #[clap(long = "day-tariff", default_value = "0.07", env = "DAY_TARIFF")]
    pub day_tariff: KilowattHourRate,

    /// Grid tariff on night and weekend imports, in EUR/kWh.
    #[clap(long = "night-tariff", default_value = "0.05", env = "NIGHT_TARIFF")]
    pub night_tariff: KilowattHourRate,

    /// Local hour at which the night tariff starts.
    #[clap(
        long = "night-from-hour",
        default_value = "22",
        env = "NIGHT_FROM_HOUR",
        value_parser = clap::value_parser!(u32).range(0..24),
    )]
    pub night_from_hour: u32,

    /// Local hour at which the night tariff ends.
    #[clap(
        long = "night-until-hour",
        default_value = "7",
        env = "NIGHT_UNTIL_HOUR",
        value_parser = clap::value_parser!(u32).range(0..24),
    )]
    pub night_until_hour: u32,

    /// Battery wear cost per charged kilowatt-hour, in EUR/kWh.
    #[clap(long = "degradation-cost", default_value = "0.139", env = "DEGRADATION_COST")]
    pub degradation_rate: KilowattHourRate,
}

#[derive(Copy, Clone, Parser)]
pub struct SolverArgs {
    /// Wall-clock limit for the MILP solver, in seconds.
    #[clap(long = "solver-time-limit", default_value = "300", env = "SOLVER_TIME_LIMIT")]
    pub time_limit_seconds: u64,
}

impl SolverArgs {
    pub const fn time_limit(self) -> Duration {
        Duration::from_secs(self.time_limit_seconds)
    }
}
