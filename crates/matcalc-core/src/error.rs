use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("matrix {matrix}: invalid cell ({row}, {col}): {reason}")]
    InvalidCell {
        matrix: usize,
        row: usize,
        col: usize,
        reason: String,
    },

    #[error("invalid size: {0} (must be at least 1)")]
    InvalidSize(i64),

    #[error("matrix index out of range: {index} ({count} supplied)")]
    IndexOutOfRange { index: i64, count: usize },

    #[error("dimension mismatch: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("singular matrix")]
    SingularMatrix,

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type CalcResult<T> = Result<T, CalcError>;
