use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::classify::apply_savings_labels;
use crate::error::{CompileError, OtherKind, Result};
use crate::rules::{classify_label, is_other_energy, other_type_name, FieldTag};
use crate::types::{OtherEnergy, OtherResource, Record, SourceDocument};
use crate::util::{kwh_to_mmbtu, parse_currency_safe, parse_leading_int_safe, NumberFormat};

pub const DEFAULT_REFERENCE_PATTERN: &str = r"^\d\.\d{4}(\.\d+)?$";

static DEFAULT_REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_REFERENCE_PATTERN).expect("default reference pattern is valid"));

/// Parsing configuration for one run. Nothing here is read from the
/// process environment.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Substring of the title prefix marking an alternate recommendation.
    pub alternate_marker: String,
    pub reference_pattern: Regex,
    pub number_format: NumberFormat,
    /// Reject documents with two "other energy" or two "other resource"
    /// rows instead of keeping the last one.
    pub strict_other_fields: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            alternate_marker: "AAR".to_string(),
            reference_pattern: DEFAULT_REFERENCE_REGEX.clone(),
            number_format: NumberFormat::default(),
            strict_other_fields: true,
        }
    }
}

/// Extract every document, stopping at the first one that fails.
pub fn extract_all(docs: &[SourceDocument], opts: &ExtractOptions) -> Result<Vec<Record>> {
    docs.iter().map(|doc| extract_record(doc, opts)).collect()
}

/// Turn one document into a normalized record.
pub fn extract_record(doc: &SourceDocument, opts: &ExtractOptions) -> Result<Record> {
    let source_id = doc.source_id.as_str();
    let (is_alternate, description) = parse_title(doc, &opts.alternate_marker)?;
    let rows = doc
        .table
        .as_ref()
        .ok_or_else(|| CompileError::MissingSummaryTable {
            source_id: source_id.to_string(),
        })?;

    let fmt = &opts.number_format;
    let invalid = |label: &str, value: &str| CompileError::InvalidAmount {
        source_id: source_id.to_string(),
        label: label.to_string(),
        value: value.to_string(),
    };

    let mut reference_code: Option<String> = None;
    let mut annual_cost_savings: Option<i64> = None;
    let mut implementation_cost: Option<i64> = None;
    let mut electricity_kwh: Option<i64> = None;
    let mut demand_kw: Option<i64> = None;
    let mut gas_mmbtu: Option<i64> = None;
    let mut other_energy: Option<OtherEnergy> = None;
    let mut other_resource: Option<OtherResource> = None;

    for (label, value) in rows {
        if label.trim().is_empty() {
            continue;
        }
        let (label, value) = (label.as_str(), value.as_str());
        let currency = || parse_currency_safe(Some(value), fmt).ok_or_else(|| invalid(label, value));
        let leading = || parse_leading_int_safe(Some(value), fmt).ok_or_else(|| invalid(label, value));

        match classify_label(label) {
            Some(FieldTag::ReferenceCode) => {
                let code = value.trim();
                if !opts.reference_pattern.is_match(code) {
                    return Err(CompileError::InvalidReferenceCode {
                        source_id: source_id.to_string(),
                        value: code.to_string(),
                    });
                }
                reference_code = Some(code.to_string());
            }
            Some(FieldTag::AnnualCostSavings) => annual_cost_savings = Some(currency()?),
            Some(FieldTag::ImplementationCost) => implementation_cost = Some(currency()?),
            Some(FieldTag::PaybackPeriod) => {
                debug!(source = source_id, value = %value, "ignoring stated payback");
            }
            Some(FieldTag::Electricity) => electricity_kwh = Some(leading()?),
            Some(FieldTag::Demand) => demand_kw = Some(leading()?),
            Some(FieldTag::NaturalGas) => gas_mmbtu = Some(leading()?),
            None if is_other_energy(value) => {
                let next = OtherEnergy {
                    kind: other_type_name(label),
                    mmbtu: leading()?,
                };
                if let Some(prev) = &other_energy {
                    check_duplicate(opts, source_id, OtherKind::Energy, &prev.kind, &next.kind)?;
                }
                other_energy = Some(next);
            }
            None => {
                let next = OtherResource {
                    kind: other_type_name(label),
                    amount: value.to_string(),
                };
                if let Some(prev) = &other_resource {
                    check_duplicate(opts, source_id, OtherKind::Resource, &prev.kind, &next.kind)?;
                }
                other_resource = Some(next);
            }
        }
    }

    let missing = |field: &'static str| CompileError::MissingField {
        source_id: source_id.to_string(),
        field,
    };
    let reference_code = reference_code.ok_or_else(|| missing("ARC Number"))?;
    let annual_cost_savings = annual_cost_savings.ok_or_else(|| missing("Annual Cost Savings"))?;
    let implementation_cost = implementation_cost.ok_or_else(|| missing("Implementation Cost"))?;
    if annual_cost_savings == 0 {
        return Err(CompileError::DivisionByZero {
            context: format!("recommendation {}", source_id),
        });
    }

    let mut record = Record {
        is_alternate,
        source_id: source_id.to_string(),
        reference_code,
        description,
        electricity_kwh,
        electricity_mmbtu: electricity_kwh.map(kwh_to_mmbtu),
        demand_kw,
        gas_mmbtu,
        other_energy,
        other_resource,
        annual_cost_savings,
        implementation_cost,
        payback_period: implementation_cost as f64 / annual_cost_savings as f64,
        savings_type_label: String::new(),
        savings_value_label: String::new(),
    };
    apply_savings_labels(&mut record);

    info!(
        source = source_id,
        arc = %record.reference_code,
        alternate = record.is_alternate,
        "extracted recommendation"
    );
    Ok(record)
}

/// Split the title on its first colon: marker prefix, then description.
fn parse_title(doc: &SourceDocument, marker: &str) -> Result<(bool, String)> {
    let (prefix, rest) = doc
        .title
        .split_once(':')
        .ok_or_else(|| CompileError::MalformedTitle {
            source_id: doc.source_id.clone(),
            title: doc.title.clone(),
        })?;
    let is_alternate = prefix.to_lowercase().contains(&marker.to_lowercase());
    Ok((is_alternate, rest.trim().to_string()))
}

fn check_duplicate(
    opts: &ExtractOptions,
    source_id: &str,
    kind: OtherKind,
    first: &str,
    second: &str,
) -> Result<()> {
    if opts.strict_other_fields {
        return Err(CompileError::AmbiguousOtherField {
            source_id: source_id.to_string(),
            kind,
            first: first.to_string(),
            second: second.to_string(),
        });
    }
    warn!(source = source_id, %kind, first, second, "overwriting earlier row");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, rows: &[(&str, &str)]) -> SourceDocument {
        SourceDocument {
            source_id: "test.csv".to_string(),
            title: title.to_string(),
            table: Some(
                rows.iter()
                    .map(|(l, v)| (l.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    fn base_rows() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ARC Number", "2.7142"),
            ("Annual Cost Savings", "$1,000"),
            ("Implementation Cost", "$2,000"),
        ]
    }

    #[test]
    fn extracts_title_and_required_fields() {
        let mut rows = base_rows();
        rows.push(("Electricity Savings", "10,000 kWh"));
        let r = extract_record(&doc("AR: Improve Lighting ", &rows), &ExtractOptions::default())
            .unwrap();
        assert!(!r.is_alternate);
        assert_eq!(r.description, "Improve Lighting");
        assert_eq!(r.reference_code, "2.7142");
        assert_eq!(r.annual_cost_savings, 1_000);
        assert_eq!(r.implementation_cost, 2_000);
        assert_eq!(r.electricity_kwh, Some(10_000));
        assert_eq!(r.electricity_mmbtu, Some(kwh_to_mmbtu(10_000)));
        assert_eq!(r.payback_period, 2.0);
        assert_eq!(r.savings_type_label, "Electricity");
    }

    #[test]
    fn alternate_marker_is_case_insensitive() {
        let opts = ExtractOptions::default();
        let r = extract_record(&doc("aar 2: Insulate Pipes", &base_rows()), &opts).unwrap();
        assert!(r.is_alternate);
        let r = extract_record(&doc("AR: Insulate: Pipes", &base_rows()), &opts).unwrap();
        assert!(!r.is_alternate);
        assert_eq!(r.description, "Insulate: Pipes");
    }

    #[test]
    fn title_without_colon_is_rejected() {
        let err = extract_record(&doc("Improve Lighting", &base_rows()), &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::MalformedTitle { .. }));
    }

    #[test]
    fn missing_table_is_fatal() {
        let mut d = doc("AR: Improve Lighting", &[]);
        d.table = None;
        let err = extract_record(&d, &ExtractOptions::default()).unwrap_err();
        match err {
            CompileError::MissingSummaryTable { source_id } => assert_eq!(source_id, "test.csv"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_reference_code_is_rejected() {
        let rows = vec![
            ("ARC Number", "2.71"),
            ("Annual Cost Savings", "$1,000"),
            ("Implementation Cost", "$2,000"),
        ];
        let err = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidReferenceCode { value, .. } if value == "2.71"));
    }

    #[test]
    fn reference_code_accepts_suffix() {
        let rows = vec![
            ("ARC Number", "2.4231.1"),
            ("Annual Cost Savings", "$1,000"),
            ("Implementation Cost", "$2,000"),
        ];
        let r = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap();
        assert_eq!(r.reference_code, "2.4231.1");
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        let rows = vec![
            ("ARC Number", "2.7142"),
            ("Annual Cost Savings", "$1,0a0"),
            ("Implementation Cost", "$2,000"),
        ];
        let err = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidAmount { label, .. } if label == "Annual Cost Savings"));

        let mut rows = base_rows();
        rows.push(("Demand Savings", "n/a kW"));
        let err = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidAmount { .. }));
    }

    #[test]
    fn missing_required_rows_are_reported() {
        let rows = vec![("ARC Number", "2.7142"), ("Annual Cost Savings", "$1,000")];
        let err = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingField { field: "Implementation Cost", .. }
        ));
    }

    #[test]
    fn stated_payback_is_ignored() {
        let mut rows = base_rows();
        rows.push(("Payback Period", "42 years"));
        let r = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap();
        assert_eq!(r.payback_period, 2_000.0 / 1_000.0);
    }

    #[test]
    fn zero_annual_savings_is_surfaced() {
        let rows = vec![
            ("ARC Number", "2.7142"),
            ("Annual Cost Savings", "$0"),
            ("Implementation Cost", "$2,000"),
        ];
        let err = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::DivisionByZero { .. }));
    }

    #[test]
    fn classifies_other_rows() {
        let mut rows = base_rows();
        rows.push(("Propane Savings", "75 MMBtu"));
        rows.push(("Water Savings", "30,000 gal"));
        rows.push(("", ""));
        let r = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap();
        assert_eq!(
            r.other_energy,
            Some(OtherEnergy { kind: "Propane".to_string(), mmbtu: 75 })
        );
        assert_eq!(
            r.other_resource,
            Some(OtherResource { kind: "Water".to_string(), amount: "30,000 gal".to_string() })
        );
        assert_eq!(r.savings_type_label, "Propane\nWater");
        assert_eq!(r.savings_value_label, "75 MMBtu\n30,000 gal");
    }

    #[test]
    fn duplicate_other_rows_error_when_strict() {
        let mut rows = base_rows();
        rows.push(("Water Savings", "30,000 gal"));
        rows.push(("Sewer Savings", "12,000 gal"));
        let err = extract_record(&doc("AR: X", &rows), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::AmbiguousOtherField { kind: OtherKind::Resource, .. }
        ));
    }

    #[test]
    fn duplicate_other_rows_overwrite_when_lenient() {
        let opts = ExtractOptions {
            strict_other_fields: false,
            ..ExtractOptions::default()
        };
        let mut rows = base_rows();
        rows.push(("Propane Savings", "75 MMBtu"));
        rows.push(("Fuel Oil Savings", "20 MMBtu"));
        let r = extract_record(&doc("AR: X", &rows), &opts).unwrap();
        assert_eq!(
            r.other_energy,
            Some(OtherEnergy { kind: "Fuel Oil".to_string(), mmbtu: 20 })
        );
    }

    #[test]
    fn extract_all_stops_at_first_failure() {
        let good = doc("AR: Good", &base_rows());
        let mut bad = doc("AR: Bad", &[]);
        bad.table = None;
        bad.source_id = "bad.csv".to_string();
        let err = extract_all(&[good.clone(), bad, good], &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::MissingSummaryTable { source_id } if source_id == "bad.csv"));
    }
}
