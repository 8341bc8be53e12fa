//! Typed errors for the screening pipeline

use thiserror::Error;

/// Errors raised while turning a raw submission into a feature vector.
///
/// These are deterministic, input-bound failures: a label the lookup tables
/// were never trained on, a schema name the form does not populate, or a
/// value outside the declared bounds. None of them are retried or coerced.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EncodeError {
    /// A categorical label is absent from its lookup table.
    #[error("unknown {field} label {label:?}")]
    UnknownCategory { field: &'static str, label: String },

    /// The schema names a feature the form does not provide.
    #[error("schema expects feature {0:?} which the submission form does not populate")]
    MissingFeature(String),

    /// A numeric field is outside its declared bounds.
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    InvalidField {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors raised by the inference adapter.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classifier artifact is missing or failed to load at startup.
    /// Raised before any call is attempted.
    #[error("classifier artifact is not loaded")]
    ModelUnavailable,

    /// The underlying ONNX call failed (shape mismatch, bad input).
    #[error("classifier invocation failed: {0}")]
    Inference(#[from] ort::Error),

    /// The model produced neither a label nor a probability output.
    #[error("classifier produced no usable output")]
    MalformedOutput,

    #[error("classifier session lock poisoned")]
    LockPoisoned,
}

/// Errors from the encode-then-classify chain, recovered at the page level
/// and rendered as a visible message.
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Errors from the summary statistics provider.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("summary query returned no rows")]
    NoResults,

    #[error("summary cache lock poisoned")]
    LockPoisoned,
}
