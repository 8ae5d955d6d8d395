//! Error taxonomy for sampling, decoding and playback.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or empty source data. Fatal for the section being rendered.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("distribution '{0}' not found")]
    NotFound(String),

    #[error("bit position {position} out of range for width {width}")]
    PositionOutOfRange { position: usize, width: usize },

    /// Requested sample size exceeds the number of distinct outcomes.
    #[error("requested {requested} distinct outcomes, only {available} available")]
    InsufficientDistinctOutcomes { requested: usize, available: usize },

    /// Lookup table too small for its group's bit width.
    #[error("lookup table for group {group} has {len} entries, needs {required}")]
    GroupIndexOutOfRange {
        group: usize,
        len: usize,
        required: usize,
    },

    #[error("invalid group spec: {0}")]
    InvalidGroupSpec(String),

    #[error("invalid bitstring '{bitstring}': {reason}")]
    InvalidBitstring { bitstring: String, reason: String },

    #[error("index {index} out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A start request arrived while a plan was active. Recovered internally
    /// by stopping the active plan.
    #[error("scheduler busy with plan {0}")]
    SchedulerBusy(u64),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Audio(#[from] hound::Error),
}
