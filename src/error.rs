//! Error types for parameter validation and loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("{field} must be a percentage in [0, 100], got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Starting book of {policies} policies exceeds staffed capacity of {max_capacity}")]
    OverCapacity { policies: f64, max_capacity: f64 },

    #[error("Projection horizon must be at least one month")]
    ZeroHorizon,

    #[error("Sweep row '{label}': {source}")]
    SweepRow {
        label: String,
        #[source]
        source: Box<PlannerError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
