//! Error types for grid localization

use thiserror::Error;

/// Errors raised while building a grid or running a filter update.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// A row does not have the same length as the first row, or the grid is empty.
    #[error("invalid dimension at row {row}: expected {expected} columns, found {found}")]
    InvalidDimension {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A belief does not line up with the grid it is updated against.
    #[error("belief shape {found:?} does not match grid {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Grid entries must be 0 (open) or 1 (obstacle).
    #[error("invalid cell value {value} at ({row}, {col})")]
    InvalidCellValue { row: usize, col: usize, value: u8 },

    /// Prior weights on open cells must be finite and non-negative.
    #[error("invalid prior weight {value} at ({row}, {col})")]
    InvalidWeight { row: usize, col: usize, value: f64 },

    /// The sensing normalizer vanished: the observation is impossible under the prior.
    #[error("degenerate belief: normalization constant is {normalizer}")]
    DegenerateBelief { normalizer: f64 },

    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
