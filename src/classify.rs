use crate::types::Record;
use crate::util::{format_int, format_truncated};

/// Build the savings type and value summaries for a record.
///
/// Fields appear in a fixed order (electricity, demand, natural gas, other
/// energy, other resource), one line each. Electricity takes two value lines
/// (kWh and MMBtu), so its type entry is followed by a blank line to keep the
/// two columns aligned.
pub fn savings_labels(record: &Record) -> (String, String) {
    let mut types = String::new();
    let mut values = String::new();

    if let Some(kwh) = record.electricity_kwh {
        let mmbtu = record.electricity_mmbtu.unwrap_or_default();
        types.push_str("Electricity\n\n");
        values.push_str(&format!("{} kWh\n", format_int(kwh)));
        values.push_str(&format!("({} MMBtu)\n", format_truncated(mmbtu)));
    }
    if let Some(kw) = record.demand_kw {
        types.push_str("Demand\n");
        values.push_str(&format!("{} kW\n", format_int(kw)));
    }
    if let Some(gas) = record.gas_mmbtu {
        types.push_str("Natural Gas\n");
        values.push_str(&format!("{} MMBtu\n", format_int(gas)));
    }
    if let Some(other) = &record.other_energy {
        types.push_str(&other.kind);
        types.push('\n');
        values.push_str(&format!("{} MMBtu\n", format_int(other.mmbtu)));
    }
    if let Some(other) = &record.other_resource {
        types.push_str(&other.kind);
        types.push('\n');
        values.push_str(&other.amount);
        values.push('\n');
    }

    (
        types.trim_end_matches('\n').to_string(),
        values.trim_end_matches('\n').to_string(),
    )
}

/// Fill in the derived label fields of a record.
pub fn apply_savings_labels(record: &mut Record) {
    let (types, values) = savings_labels(record);
    record.savings_type_label = types;
    record.savings_value_label = values;
}
