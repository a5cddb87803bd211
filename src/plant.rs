// Plant-level metadata that accompanies the recommendation tables.
use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::config::{PlantConfig, UtilityConfig};
use crate::util::currency_accuracy;

/// Reports are due this many days after the assessment visit.
const REPORT_DUE_DAYS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantInfo {
    pub report_date: NaiveDate,
    pub participants: Vec<String>,
    pub contributors: Vec<String>,
    pub electricity_rate: f64,
    pub demand_rate: f64,
    pub fuel_rate: f64,
}

/// The report is dated today, or on the due date if that is earlier.
pub fn report_date(visit: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    visit
        .and_then(|v| v.checked_add_days(Days::new(REPORT_DUE_DAYS)))
        .map_or(today, |due| due.min(today))
}

/// Sort names by last word (surname); equal surnames keep their order.
pub fn sort_by_surname(names: &[String]) -> Vec<String> {
    let mut sorted: Vec<String> = names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    sorted.sort_by(|a, b| surname(a).cmp(surname(b)));
    sorted
}

fn surname(name: &str) -> &str {
    name.rsplit(char::is_whitespace).next().unwrap_or(name)
}

pub fn build_plant_info(
    plant: &PlantConfig,
    utility: &UtilityConfig,
    visit: Option<NaiveDate>,
    today: NaiveDate,
) -> PlantInfo {
    PlantInfo {
        report_date: report_date(visit, today),
        participants: sort_by_surname(&plant.participants),
        contributors: sort_by_surname(&plant.contributors),
        electricity_rate: currency_accuracy(utility.electricity_rate, 3),
        demand_rate: currency_accuracy(utility.demand_rate, 2),
        fuel_rate: currency_accuracy(utility.fuel_rate, 2),
    }
}
