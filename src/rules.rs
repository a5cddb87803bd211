// Label rules for summary-table rows.
//
// Rows are matched top to bottom against the lower-cased label; the first
// rule whose keywords all appear wins. Labels matching nothing are "other"
// rows and are classified by their value instead.

/// Field a summary-table row feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    ReferenceCode,
    AnnualCostSavings,
    ImplementationCost,
    /// Always recomputed, so the row is ignored.
    PaybackPeriod,
    Electricity,
    Demand,
    NaturalGas,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub keywords: &'static [&'static str],
    pub tag: FieldTag,
}

impl LabelRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().all(|k| lowered.contains(k))
    }
}

pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule { keywords: &["arc", "number"], tag: FieldTag::ReferenceCode },
    LabelRule { keywords: &["annual", "cost"], tag: FieldTag::AnnualCostSavings },
    LabelRule { keywords: &["implementation"], tag: FieldTag::ImplementationCost },
    LabelRule { keywords: &["payback"], tag: FieldTag::PaybackPeriod },
    LabelRule { keywords: &["electricity"], tag: FieldTag::Electricity },
    LabelRule { keywords: &["demand"], tag: FieldTag::Demand },
    LabelRule { keywords: &["natural"], tag: FieldTag::NaturalGas },
];

/// Tag for a row label, or `None` when the row is an "other" row.
pub fn classify_label(label: &str) -> Option<FieldTag> {
    let lowered = label.to_lowercase();
    LABEL_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.tag)
}

/// Whether an unmatched row carries energy (`MMBtu` anywhere in the value).
pub fn is_other_energy(value: &str) -> bool {
    value.to_lowercase().contains("mmbtu")
}

/// Type name of an unmatched row: the label without its last word.
pub fn other_type_name(label: &str) -> String {
    let label = label.trim();
    match label.rsplit_once(char::is_whitespace) {
        Some((head, _)) => head.trim_end().to_string(),
        None => label.to_string(),
    }
}
