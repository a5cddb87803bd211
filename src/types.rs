use serde::Serialize;
use tabled::Tabled;

/// One recommendation document as handed over by the loader: the title
/// paragraph and the (label, value) rows of its first table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub source_id: String,
    pub title: String,
    pub table: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cohort {
    Primary,
    Alternate,
}

impl Cohort {
    /// Prefix used when numbering recommendations of this cohort.
    pub fn label_prefix(self) -> &'static str {
        match self {
            Cohort::Primary => "AR",
            Cohort::Alternate => "AAR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherEnergy {
    pub kind: String,
    pub mmbtu: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherResource {
    pub kind: String,
    pub amount: String,
}

/// A normalized recommendation. Measured savings are `None` when the
/// document does not report them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub is_alternate: bool,
    pub source_id: String,
    pub reference_code: String,
    pub description: String,
    pub electricity_kwh: Option<i64>,
    pub electricity_mmbtu: Option<f64>,
    pub demand_kw: Option<i64>,
    pub gas_mmbtu: Option<i64>,
    pub other_energy: Option<OtherEnergy>,
    pub other_resource: Option<OtherResource>,
    pub annual_cost_savings: i64,
    pub implementation_cost: i64,
    pub payback_period: f64,
    pub savings_type_label: String,
    pub savings_value_label: String,
}

impl Record {
    pub fn cohort(&self) -> Cohort {
        if self.is_alternate {
            Cohort::Alternate
        } else {
            Cohort::Primary
        }
    }
}

/// A record with its 1-based position inside its cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedRecord {
    pub sequence: usize,
    pub record: Record,
}

/// Totals over one cohort. Absent measurements contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub cohort: Cohort,
    pub record_count: usize,
    pub total_electricity_kwh: i64,
    pub total_electricity_mmbtu: f64,
    pub total_demand_kw: i64,
    pub total_gas_mmbtu: i64,
    pub total_other_energy_mmbtu: i64,
    pub total_mmbtu: f64,
    pub co2_tons: f64,
    pub total_annual_cost_savings: i64,
    pub total_implementation_cost: i64,
    pub combined_payback: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortReport {
    pub records: Vec<SequencedRecord>,
    pub summary: CohortSummary,
}

/// Everything the rendering layer needs: ordered cohorts and their totals.
/// A cohort with no records is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledReport {
    pub primary: Option<CohortReport>,
    pub alternate: Option<CohortReport>,
}

impl CompiledReport {
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn has_alternates(&self) -> bool {
        self.alternate.is_some()
    }

    /// Present cohorts, primary first.
    pub fn cohorts(&self) -> impl Iterator<Item = &CohortReport> {
        self.primary.iter().chain(self.alternate.iter())
    }

    pub fn record_count(&self) -> usize {
        self.cohorts().map(|c| c.records.len()).sum()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RecommendationRow {
    #[serde(rename = "No.")]
    #[tabled(rename = "No.")]
    pub label: String,
    #[serde(rename = "ARC No.")]
    #[tabled(rename = "ARC No.")]
    pub reference_code: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "Savings Type")]
    #[tabled(rename = "Savings Type")]
    pub savings_type: String,
    #[serde(rename = "Savings Value")]
    #[tabled(rename = "Savings Value")]
    pub savings_value: String,
    #[serde(rename = "Annual Cost Savings")]
    #[tabled(rename = "Annual Cost Savings")]
    pub annual_cost_savings: String,
    #[serde(rename = "Implementation Cost")]
    #[tabled(rename = "Implementation Cost")]
    pub implementation_cost: String,
    #[serde(rename = "Payback (yr)")]
    #[tabled(rename = "Payback (yr)")]
    pub payback: String,
    #[serde(rename = "Source File")]
    #[tabled(rename = "Source File")]
    pub source_file: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CohortSummaryRow {
    #[serde(rename = "Cohort")]
    #[tabled(rename = "Cohort")]
    pub cohort: String,
    #[serde(rename = "Recommendations")]
    #[tabled(rename = "Recommendations")]
    pub record_count: usize,
    #[serde(rename = "Energy (MMBtu)")]
    #[tabled(rename = "Energy (MMBtu)")]
    pub total_mmbtu: String,
    #[serde(rename = "CO2 (tons)")]
    #[tabled(rename = "CO2 (tons)")]
    pub co2_tons: String,
    #[serde(rename = "Annual Cost Savings")]
    #[tabled(rename = "Annual Cost Savings")]
    pub annual_cost_savings: String,
    #[serde(rename = "Implementation Cost")]
    #[tabled(rename = "Implementation Cost")]
    pub implementation_cost: String,
    #[serde(rename = "Payback (yr)")]
    #[tabled(rename = "Payback (yr)")]
    pub combined_payback: String,
}
