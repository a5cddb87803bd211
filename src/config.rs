use crate::error::{CompileError, Result};
use crate::extract::{ExtractOptions, DEFAULT_REFERENCE_PATTERN};
use crate::util::NumberFormat;
use crate::vfd::VfdInput;
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "compiler.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub parsing: ParsingConfig,
    pub output: OutputConfig,
    pub plant: PlantConfig,
    pub utility: UtilityConfig,
    pub vfd: Option<VfdInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub directory: String,
    pub extension: String,
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: "ARs".to_string(),
            extension: "csv".to_string(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub alternate_marker: String,
    pub reference_pattern: String,
    pub grouping_separator: char,
    pub decimal_separator: char,
    pub currency_symbol: String,
    pub strict_other_fields: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        let number = NumberFormat::default();
        Self {
            alternate_marker: "AAR".to_string(),
            reference_pattern: DEFAULT_REFERENCE_PATTERN.to_string(),
            grouping_separator: number.grouping_separator,
            decimal_separator: number.decimal_separator,
            currency_symbol: number.currency_symbol,
            strict_other_fields: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    /// File name stem shared by every output file.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            prefix: "report".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Assessment date, e.g. `October 3, 2026`.
    pub visit_date: Option<String>,
    pub participants: Vec<String>,
    pub contributors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UtilityConfig {
    /// $/kWh
    pub electricity_rate: f64,
    /// $/kW per month
    pub demand_rate: f64,
    /// $/MMBtu
    pub fuel_rate: f64,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.input.delimiter.is_ascii() {
            return Err(CompileError::Config(format!(
                "input delimiter '{}' must be a single ASCII character",
                self.input.delimiter
            )));
        }
        if self.parsing.grouping_separator == self.parsing.decimal_separator {
            return Err(CompileError::Config(
                "grouping and decimal separators must differ".to_string(),
            ));
        }
        if self.parsing.alternate_marker.trim().is_empty() {
            return Err(CompileError::Config("alternate marker is empty".to_string()));
        }
        self.visit_date()?;
        Ok(())
    }

    pub fn delimiter(&self) -> u8 {
        self.input.delimiter as u8
    }

    /// Build the parsing options for one run, compiling the reference pattern.
    pub fn extract_options(&self) -> Result<ExtractOptions> {
        let p = &self.parsing;
        let reference_pattern = Regex::new(&p.reference_pattern).map_err(|e| {
            CompileError::Config(format!("invalid reference pattern '{}': {}", p.reference_pattern, e))
        })?;
        Ok(ExtractOptions {
            alternate_marker: p.alternate_marker.clone(),
            reference_pattern,
            number_format: NumberFormat {
                grouping_separator: p.grouping_separator,
                decimal_separator: p.decimal_separator,
                currency_symbol: p.currency_symbol.clone(),
            },
            strict_other_fields: p.strict_other_fields,
        })
    }

    pub fn visit_date(&self) -> Result<Option<NaiveDate>> {
        match self.plant.visit_date.as_deref() {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%B %d, %Y")
                .map(Some)
                .map_err(|e| CompileError::Config(format!("invalid visit date '{}': {}", s, e))),
        }
    }
}
