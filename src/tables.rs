use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::{
        horizon::Horizon,
        schedule::{CostSummary, Schedule},
    },
    quantity::{cost::Cost, power::Kilowatts, rate::KilowattHourRate},
};

fn median_rate(rates: impl Iterator<Item = KilowattHourRate>) -> KilowattHourRate {
    let sorted = rates.map(|rate| OrderedFloat(rate.0)).sorted().collect_vec();
    sorted.get(sorted.len() / 2).map_or(KilowattHourRate::ZERO, |rate| {
        KilowattHourRate::from(rate.0)
    })
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn spot_cell(rate: KilowattHourRate, median: KilowattHourRate) -> Cell {
    Cell::new(rate).fg(if rate >= median { Color::Red } else { Color::Green })
}

pub fn build_schedule_table(schedule: &Schedule) -> Table {
    let median = median_rate(schedule.rows.iter().map(|row| row.spot_price));

    let mut table = new_table();
    table.set_header(vec![
        "#", "Start", "Load", "PV", "ESS", "SoC", "Import", "Export", "PCC", "Spot", "Tariff",
        "Cost",
    ]);
    for row in &schedule.rows {
        table.add_row(vec![
            Cell::new(row.period).add_attribute(Attribute::Dim),
            Cell::new(row.start.format("%b %d %H:%M")),
            Cell::new(row.load).set_alignment(CellAlignment::Right),
            Cell::new(row.production).set_alignment(CellAlignment::Right).fg(
                if row.production < Kilowatts::ZERO { Color::Green } else { Color::Reset },
            ),
            Cell::new(row.ess_power).set_alignment(CellAlignment::Right).fg(
                if row.ess_power > Kilowatts::ZERO {
                    Color::Green
                } else if row.ess_power < Kilowatts::ZERO {
                    Color::Red
                } else {
                    Color::Reset
                },
            ),
            Cell::new(format!("{:.1} %", row.soc_percent)).set_alignment(CellAlignment::Right),
            Cell::new(row.import).set_alignment(CellAlignment::Right),
            Cell::new(row.export).set_alignment(CellAlignment::Right),
            Cell::new(row.pcc).set_alignment(CellAlignment::Right),
            spot_cell(row.spot_price, median),
            Cell::new(row.grid_tariff).add_attribute(Attribute::Dim),
            Cell::new(row.cost)
                .set_alignment(CellAlignment::Right)
                .fg(if row.cost >= Cost::ONE_CENT { Color::Red } else { Color::Green }),
        ]);
    }
    table
}

pub fn build_horizon_table(horizon: &Horizon) -> Table {
    let median = median_rate(horizon.slots().iter().map(|slot| slot.spot_price));

    let mut table = new_table();
    table.set_header(vec!["Start", "Load", "PV", "PCC", "Spot", "Tariff", "Baseline"]);
    for slot in horizon.slots() {
        table.add_row(vec![
            Cell::new(slot.start.format("%b %d %H:%M")),
            Cell::new(slot.consumption).set_alignment(CellAlignment::Right),
            Cell::new(slot.production).set_alignment(CellAlignment::Right).fg(
                if slot.production < Kilowatts::ZERO { Color::Green } else { Color::Reset },
            ),
            Cell::new(slot.pcc_power()).set_alignment(CellAlignment::Right),
            spot_cell(slot.spot_price, median),
            Cell::new(slot.grid_tariff).add_attribute(Attribute::Dim),
            Cell::new(slot.baseline_cost)
                .set_alignment(CellAlignment::Right)
                .fg(if slot.baseline_cost >= Cost::ONE_CENT { Color::Red } else { Color::Green }),
        ]);
    }
    table
}

pub fn build_summary_table(summary: &CostSummary) -> Table {
    let mut table = new_table();
    table
        .set_header(vec![
            Cell::from("Baseline cost"),
            Cell::from("Baseline energy"),
            Cell::from("Optimized cost"),
            Cell::from("Optimized energy"),
            Cell::from("Savings"),
        ])
        .add_row(vec![
            Cell::new(summary.baseline_cost),
            Cell::new(summary.baseline_energy),
            Cell::new(summary.optimized_cost),
            Cell::new(summary.optimized_energy),
            Cell::new(summary.savings()).add_attribute(Attribute::Bold).fg(
                if summary.savings() >= Cost::ZERO { Color::Green } else { Color::Red },
            ),
        ]);
    table
}
