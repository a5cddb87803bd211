// Presentation strings for the compiled report.
//
// The compiled report carries raw numbers only; every currency symbol,
// separator and rounding for display is applied here.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::plant::PlantInfo;
use crate::types::{
    CohortReport, CohortSummary, CohortSummaryRow, CompiledReport, RecommendationRow,
};
use crate::util::{describe_payback, format_currency, format_number};

/// Unformatted totals written next to the tables.
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub primary: Option<&'a CohortSummary>,
    pub alternate: Option<&'a CohortSummary>,
    pub primary_payback_description: Option<String>,
    pub plant: &'a PlantInfo,
}

pub fn report_summary<'a>(report: &'a CompiledReport, plant: &'a PlantInfo) -> ReportSummary<'a> {
    let primary = report.primary.as_ref().map(|c| &c.summary);
    ReportSummary {
        primary,
        alternate: report.alternate.as_ref().map(|c| &c.summary),
        primary_payback_description: primary.map(|s| describe_payback(s.combined_payback)),
        plant,
    }
}

fn cohort_rows<'a>(
    cohort: &'a CohortReport,
    symbol: &str,
) -> impl Iterator<Item = RecommendationRow> + 'a {
    let symbol = symbol.to_string();
    cohort.records.iter().map(move |s| {
        let r = &s.record;
        RecommendationRow {
            label: format!("{} {}", r.cohort().label_prefix(), s.sequence),
            reference_code: r.reference_code.clone(),
            description: r.description.to_uppercase(),
            savings_type: r.savings_type_label.clone(),
            savings_value: r.savings_value_label.clone(),
            annual_cost_savings: format_currency(r.annual_cost_savings as f64, 0, &symbol),
            implementation_cost: format_currency(r.implementation_cost as f64, 0, &symbol),
            payback: format_number(r.payback_period, 1),
            source_file: r.source_id.clone(),
        }
    })
}

/// One display row per recommendation: primary cohort first, then alternates.
pub fn recommendation_rows(report: &CompiledReport, symbol: &str) -> Vec<RecommendationRow> {
    report.cohorts().flat_map(|c| cohort_rows(c, symbol)).collect()
}

fn summary_row(s: &CohortSummary, symbol: &str) -> CohortSummaryRow {
    CohortSummaryRow {
        cohort: format!("{:?}", s.cohort),
        record_count: s.record_count,
        total_mmbtu: format_number(s.total_mmbtu, 0),
        co2_tons: format_number(s.co2_tons, 0),
        annual_cost_savings: format_currency(s.total_annual_cost_savings as f64, 0, symbol),
        implementation_cost: format_currency(s.total_implementation_cost as f64, 0, symbol),
        combined_payback: format_number(s.combined_payback, 1),
    }
}

pub fn summary_rows(report: &CompiledReport, symbol: &str) -> Vec<CohortSummaryRow> {
    report.cohorts().map(|c| summary_row(&c.summary, symbol)).collect()
}

/// String values for the report template's placeholder slots. Cohort keys
/// are present only when that cohort has records; `has_primary` and
/// `has_alternates` tell the template which sections to keep.
pub fn placeholders(report: &CompiledReport, plant: &PlantInfo, symbol: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut put = |k: &str, v: String| {
        map.insert(k.to_string(), v);
    };

    put("has_primary", report.has_primary().to_string());
    if let Some(primary) = &report.primary {
        let p = &primary.summary;
        put("primary_count", p.record_count.to_string());
        put("primary_total_mmbtu", format_number(p.total_mmbtu, 0));
        put("primary_co2_tons", format_number(p.co2_tons, 0));
        put("primary_annual_cost_savings", format_currency(p.total_annual_cost_savings as f64, 0, symbol));
        put("primary_implementation_cost", format_currency(p.total_implementation_cost as f64, 0, symbol));
        put("primary_payback", format_number(p.combined_payback, 1));
        put("primary_payback_description", describe_payback(p.combined_payback));
    }

    put("has_alternates", report.has_alternates().to_string());

    if let Some(alt) = &report.alternate {
        let a = &alt.summary;
        put("alternate_count", a.record_count.to_string());
        put("alternate_total_mmbtu", format_number(a.total_mmbtu, 0));
        put("alternate_annual_cost_savings", format_currency(a.total_annual_cost_savings as f64, 0, symbol));
        put("alternate_implementation_cost", format_currency(a.total_implementation_cost as f64, 0, symbol));
        put("alternate_payback", format_number(a.combined_payback, 1));
    }

    put("report_date", plant.report_date.format("%B %d, %Y").to_string());
    put("participants", plant.participants.join("\n"));
    put("contributors", plant.contributors.join("\n"));
    put("electricity_rate", format_currency(plant.electricity_rate, 3, symbol));
    put("demand_rate", format_currency(plant.demand_rate, 2, symbol));
    put("fuel_rate", format_currency(plant.fuel_rate, 2, symbol));
    map
}
