use std::fmt;
use std::io;

use thiserror::Error;

/// Which unmatched row kind collided inside a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherKind {
    Energy,
    Resource,
}

impl fmt::Display for OtherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtherKind::Energy => write!(f, "other energy"),
            OtherKind::Resource => write!(f, "other resource"),
        }
    }
}

/// Every failure the compiler can report. All of them abort the run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{source_id} is not a valid recommendation: the summary table is missing")]
    MissingSummaryTable { source_id: String },
    #[error("{source_id}: title '{title}' has no ':' separating the description")]
    MalformedTitle { source_id: String, title: String },
    #[error("{source_id}: reference code '{value}' does not match the required format")]
    InvalidReferenceCode { source_id: String, value: String },
    #[error("{source_id}: row '{label}' has an unreadable amount '{value}'")]
    InvalidAmount {
        source_id: String,
        label: String,
        value: String,
    },
    #[error("{source_id}: required row '{field}' is missing")]
    MissingField {
        source_id: String,
        field: &'static str,
    },
    #[error("{source_id}: more than one {kind} row ('{first}' and '{second}')")]
    AmbiguousOtherField {
        source_id: String,
        kind: OtherKind,
        first: String,
        second: String,
    },
    #[error("division by zero: {context} has zero annual cost savings")]
    DivisionByZero { context: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CompileError>;
