// Cohort aggregation and sequencing.
//
// Everything here is a pure reduction over extracted records: nothing is
// accumulated across calls and the input slice is never mutated.
use std::cmp::Ordering;

use tracing::info;

use crate::error::{CompileError, Result};
use crate::types::{Cohort, CohortReport, CohortSummary, CompiledReport, Record, SequencedRecord};
use crate::util::round_half_even;

/// Pounds of CO2 per MMBtu of natural gas.
const CO2_LB_PER_GAS_MMBTU: f64 = 53.0;
/// Pounds of CO2 per kWh of grid electricity.
const CO2_LB_PER_KWH: f64 = 0.22;

/// Partition, order and total a full set of records.
///
/// A cohort is summarized only when it has at least one record; an empty
/// cohort is `None` and never reaches the payback division.
pub fn compile(records: &[Record]) -> Result<CompiledReport> {
    let (primary, alternate): (Vec<Record>, Vec<Record>) =
        records.iter().cloned().partition(|r| !r.is_alternate);

    let report = CompiledReport {
        primary: build_cohort(Cohort::Primary, primary)?,
        alternate: build_cohort(Cohort::Alternate, alternate)?,
    };
    info!(
        primary = report.primary.as_ref().map_or(0, |c| c.records.len()),
        alternate = report.alternate.as_ref().map_or(0, |c| c.records.len()),
        "compiled recommendations"
    );
    Ok(report)
}

fn build_cohort(cohort: Cohort, records: Vec<Record>) -> Result<Option<CohortReport>> {
    if records.is_empty() {
        return Ok(None);
    }
    let summary = summarize(cohort, &records)?;
    Ok(Some(CohortReport {
        records: sequence(records),
        summary,
    }))
}

/// Stable ascending sort by payback; equal paybacks keep input order.
/// Sequence numbers start at 1.
pub fn sequence(mut records: Vec<Record>) -> Vec<SequencedRecord> {
    // `-0.0` and `0.0` compare equal here, unlike under `total_cmp`.
    records.sort_by(|a, b| {
        a.payback_period
            .partial_cmp(&b.payback_period)
            .unwrap_or(Ordering::Equal)
    });
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| SequencedRecord {
            sequence: idx + 1,
            record,
        })
        .collect()
}

pub fn summarize(cohort: Cohort, records: &[Record]) -> Result<CohortSummary> {
    let total_electricity_kwh: i64 = records.iter().filter_map(|r| r.electricity_kwh).sum();
    let total_electricity_mmbtu: f64 = records.iter().filter_map(|r| r.electricity_mmbtu).sum();
    let total_demand_kw: i64 = records.iter().filter_map(|r| r.demand_kw).sum();
    let total_gas_mmbtu: i64 = records.iter().filter_map(|r| r.gas_mmbtu).sum();
    let total_other_energy_mmbtu: i64 = records
        .iter()
        .filter_map(|r| r.other_energy.as_ref().map(|o| o.mmbtu))
        .sum();
    let total_annual_cost_savings: i64 = records.iter().map(|r| r.annual_cost_savings).sum();
    let total_implementation_cost: i64 = records.iter().map(|r| r.implementation_cost).sum();

    let combined_payback =
        combined_payback(cohort, total_implementation_cost, total_annual_cost_savings)?;
    let total_mmbtu = round_half_even(
        total_electricity_mmbtu + total_gas_mmbtu as f64 + total_other_energy_mmbtu as f64,
    );

    Ok(CohortSummary {
        cohort,
        record_count: records.len(),
        total_electricity_kwh,
        total_electricity_mmbtu,
        total_demand_kw,
        total_gas_mmbtu,
        total_other_energy_mmbtu,
        total_mmbtu,
        co2_tons: co2_tons(total_gas_mmbtu, total_electricity_kwh),
        total_annual_cost_savings,
        total_implementation_cost,
        combined_payback,
    })
}

/// Cohort payback from the cost totals, not from individual paybacks.
pub fn combined_payback(cohort: Cohort, implementation_cost: i64, annual_savings: i64) -> Result<f64> {
    if annual_savings == 0 {
        return Err(CompileError::DivisionByZero {
            context: format!("{:?} cohort", cohort).to_lowercase(),
        });
    }
    Ok(implementation_cost as f64 / annual_savings as f64)
}

/// Avoided emissions in tons. Other energy types are not counted.
pub fn co2_tons(gas_mmbtu: i64, electricity_kwh: i64) -> f64 {
    round_half_even(
        (CO2_LB_PER_GAS_MMBTU * gas_mmbtu as f64 + CO2_LB_PER_KWH * electricity_kwh as f64) / 1000.0,
    )
}
