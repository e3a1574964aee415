use thiserror::Error;

use crate::forecast::ForecastError;
use crate::Symbol;

/// Validation and contract errors exposed by `stocknav-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid source '{value}', expected one of yahoo, csv, mock")]
    InvalidSource { value: String },

    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("series contains duplicate date {date}")]
    DuplicateDate { date: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("trace_id must be 32 hex characters")]
    InvalidTraceId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Directory(#[from] crate::directory::DirectoryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a single view interaction.
///
/// None of these are fatal to the process. Views convert them into one
/// user-visible warning and render nothing else.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("company '{company}' is not in the symbol directory")]
    UnresolvedSymbol { company: String },

    #[error("no company selected")]
    EmptySelection,

    #[error("market data unavailable: {reason}")]
    FetchFailure { reason: String },

    #[error("{symbol}: dropped {dropped} row(s) with missing values")]
    MalformedSeries { symbol: Symbol, dropped: usize },

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnresolvedSymbol { .. } => "pipeline.unresolved_symbol",
            Self::EmptySelection => "pipeline.empty_selection",
            Self::FetchFailure { .. } => "pipeline.fetch_failure",
            Self::MalformedSeries { .. } => "pipeline.malformed_series",
            Self::Forecast(_) => "pipeline.forecast",
            Self::Validation(_) => "pipeline.validation",
        }
    }
}
