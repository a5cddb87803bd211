//! Savings estimate for adding a variable frequency drive to one motor.
//!
//! Power fraction at part load comes from a fixed fan/pump curve; savings are
//! the drop in power draw over the motor's operating hours, with an optional
//! utility rebate taken off the implementation cost.

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::{CompileError, Result};
use crate::util::{format_currency, format_int, format_number, round_half_even};

const KW_PER_HP: f64 = 0.746;

/// Motor load (%) at which each `VFD_POWER_FRACTION` entry applies.
const LOAD_POINTS: [f64; 17] = [
    20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0, 85.0, 90.0,
    95.0, 100.0,
];
/// Input power (% of full load) drawn through a VFD.
const VFD_POWER_FRACTION: [f64; 17] = [
    5.0, 6.0, 8.0, 11.0, 14.0, 17.0, 21.0, 26.0, 32.0, 38.0, 44.0, 50.0, 57.0, 64.0, 73.0, 86.0,
    105.0,
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VfdInput {
    /// Motor size in horsepower.
    pub horsepower: f64,
    /// Average load, % of rated.
    pub load_factor: f64,
    /// Efficiency of the existing motor, %.
    pub existing_efficiency: f64,
    /// Efficiency of the motor with a drive, %.
    pub proposed_efficiency: f64,
    pub hours_per_day: f64,
    pub days_per_week: f64,
    pub weeks_per_year: f64,
    /// Share of the saved load coincident with the monthly peak, %.
    pub coincidence_factor: f64,
    pub vfd_cost: f64,
    pub installation_cost: f64,
    /// $/kWh
    pub electricity_rate: f64,
    /// $/kW per month
    pub demand_rate: f64,
    /// Utility incentive in $/kWh saved. Zero disables the rebate.
    #[serde(default)]
    pub rebate_rate: f64,
    /// Rebate cap as a fraction of implementation cost.
    #[serde(default = "default_rebate_cap")]
    pub rebate_cap: f64,
}

fn default_rebate_cap() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VfdResult {
    pub operating_hours: f64,
    pub power_fraction: f64,
    pub current_power_kw: f64,
    pub proposed_power_kw: f64,
    pub energy_savings_kwh: f64,
    pub demand_savings_kw: f64,
    pub energy_cost_savings: f64,
    pub demand_cost_savings: f64,
    pub annual_cost_savings: f64,
    pub implementation_cost: f64,
    pub rebate_enabled: bool,
    pub rebate: f64,
    pub net_implementation_cost: f64,
    pub payback_years: f64,
}

#[derive(Debug, Clone, Tabled)]
pub struct VfdRow {
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Linear interpolation of the VFD curve, clamped to its end points.
pub fn power_fraction(load_factor: f64) -> f64 {
    if load_factor <= LOAD_POINTS[0] {
        return VFD_POWER_FRACTION[0];
    }
    let last = LOAD_POINTS.len() - 1;
    if load_factor >= LOAD_POINTS[last] {
        return VFD_POWER_FRACTION[last];
    }
    let idx = LOAD_POINTS
        .windows(2)
        .position(|w| load_factor >= w[0] && load_factor <= w[1])
        .unwrap_or(last - 1);
    let (x0, x1) = (LOAD_POINTS[idx], LOAD_POINTS[idx + 1]);
    let (y0, y1) = (VFD_POWER_FRACTION[idx], VFD_POWER_FRACTION[idx + 1]);
    y0 + (y1 - y0) * (load_factor - x0) / (x1 - x0)
}

pub fn calculate(input: &VfdInput) -> Result<VfdResult> {
    if input.existing_efficiency <= 0.0 || input.proposed_efficiency <= 0.0 {
        return Err(CompileError::Config(
            "motor efficiencies must be positive".to_string(),
        ));
    }

    let operating_hours = input.hours_per_day * input.days_per_week * input.weeks_per_year;
    let power_fraction = round_half_even(power_fraction(input.load_factor));
    let current_power_kw =
        round_half_even(input.horsepower * KW_PER_HP / (input.existing_efficiency / 100.0));
    let proposed_power_kw = round_half_even(
        input.horsepower * KW_PER_HP * (power_fraction / 100.0) / (input.proposed_efficiency / 100.0),
    );

    let saved_kw = current_power_kw - proposed_power_kw;
    let energy_savings_kwh = saved_kw * operating_hours;
    let demand_savings_kw = saved_kw * (input.coincidence_factor / 100.0) * 12.0;
    let energy_cost_savings = round_half_even(energy_savings_kwh * input.electricity_rate);
    let demand_cost_savings = round_half_even(demand_savings_kw * input.demand_rate);
    let annual_cost_savings = energy_cost_savings + demand_cost_savings;
    let implementation_cost = input.vfd_cost + input.installation_cost;

    let rebate_enabled = input.rebate_rate > 0.0;
    let rebate = if rebate_enabled {
        round_half_even(energy_savings_kwh * input.rebate_rate)
            .min(round_half_even(implementation_cost * input.rebate_cap))
            .max(0.0)
    } else {
        0.0
    };
    let net_implementation_cost = implementation_cost - rebate;

    if annual_cost_savings == 0.0 {
        return Err(CompileError::DivisionByZero {
            context: "VFD recommendation".to_string(),
        });
    }

    Ok(VfdResult {
        operating_hours,
        power_fraction,
        current_power_kw,
        proposed_power_kw,
        energy_savings_kwh,
        demand_savings_kw,
        energy_cost_savings,
        demand_cost_savings,
        annual_cost_savings,
        implementation_cost,
        rebate_enabled,
        rebate,
        net_implementation_cost,
        payback_years: net_implementation_cost / annual_cost_savings,
    })
}

/// Display rows for the console preview.
pub fn display_rows(result: &VfdResult, symbol: &str) -> Vec<VfdRow> {
    let row = |item: &str, value: String| VfdRow {
        item: item.to_string(),
        value,
    };
    let mut rows = vec![
        row("Operating hours", format_int(result.operating_hours as i64)),
        row("Power fraction (%)", format_int(result.power_fraction as i64)),
        row("Current draw (kW)", format_int(result.current_power_kw as i64)),
        row("Proposed draw (kW)", format_int(result.proposed_power_kw as i64)),
        row("Energy savings (kWh)", format_number(result.energy_savings_kwh, 0)),
        row("Demand savings (kW)", format_number(result.demand_savings_kw, 0)),
        row("Energy cost savings", format_currency(result.energy_cost_savings, 0, symbol)),
        row("Demand cost savings", format_currency(result.demand_cost_savings, 0, symbol)),
        row("Annual cost savings", format_currency(result.annual_cost_savings, 0, symbol)),
        row("Implementation cost", format_currency(result.implementation_cost, 0, symbol)),
    ];
    if result.rebate_enabled {
        rows.push(row("Rebate", format_currency(result.rebate, 0, symbol)));
        rows.push(row(
            "Net implementation cost",
            format_currency(result.net_implementation_cost, 0, symbol),
        ));
    }
    rows.push(row("Payback (yr)", format_number(result.payback_years, 1)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor() -> VfdInput {
        VfdInput {
            horsepower: 50.0,
            load_factor: 62.5,
            existing_efficiency: 93.0,
            proposed_efficiency: 93.0,
            hours_per_day: 16.0,
            days_per_week: 5.0,
            weeks_per_year: 50.0,
            coincidence_factor: 50.0,
            vfd_cost: 8_000.0,
            installation_cost: 2_000.0,
            electricity_rate: 0.08,
            demand_rate: 10.0,
            rebate_rate: 0.0,
            rebate_cap: 0.5,
        }
    }

    #[test]
    fn interpolates_and_clamps_curve() {
        assert_eq!(power_fraction(10.0), 5.0);
        assert_eq!(power_fraction(20.0), 5.0);
        assert_eq!(power_fraction(62.5), 35.0);
        assert_eq!(power_fraction(75.0), 50.0);
        assert_eq!(power_fraction(120.0), 105.0);
    }

    #[test]
    fn computes_savings() {
        let r = calculate(&motor()).unwrap();
        assert_eq!(r.operating_hours, 4_000.0);
        assert_eq!(r.power_fraction, 35.0);
        // 50 * 0.746 / 0.93 = 40.1
        assert_eq!(r.current_power_kw, 40.0);
        // 50 * 0.746 * 0.35 / 0.93 = 14.04
        assert_eq!(r.proposed_power_kw, 14.0);
        assert_eq!(r.energy_savings_kwh, 104_000.0);
        assert_eq!(r.demand_savings_kw, 156.0);
        assert_eq!(r.energy_cost_savings, 8_320.0);
        assert_eq!(r.demand_cost_savings, 1_560.0);
        assert_eq!(r.annual_cost_savings, 9_880.0);
        assert_eq!(r.implementation_cost, 10_000.0);
        assert!(!r.rebate_enabled);
        assert_eq!(r.rebate, 0.0);
        assert_eq!(r.payback_years, 10_000.0 / 9_880.0);
    }

    #[test]
    fn rebate_is_capped() {
        let mut input = motor();
        input.rebate_rate = 0.02;
        let r = calculate(&input).unwrap();
        // 104,000 kWh * 0.02 = 2,080, under the 5,000 cap.
        assert_eq!(r.rebate, 2_080.0);
        assert_eq!(r.net_implementation_cost, 7_920.0);

        input.rebate_rate = 0.10;
        let r = calculate(&input).unwrap();
        assert_eq!(r.rebate, 5_000.0);
        assert_eq!(display_rows(&r, "$").len(), 13);
    }

    #[test]
    fn no_savings_is_an_error() {
        let mut input = motor();
        input.load_factor = 100.0;
        input.proposed_efficiency = 93.0 * 1.05;
        assert!(matches!(
            calculate(&input),
            Err(CompileError::DivisionByZero { .. })
        ));
    }
}
