pub mod error;
pub mod evaluate;
pub mod format;
pub mod matrix;
pub mod operation;
pub mod properties;

pub use error::{CalcError, CalcResult};
pub use evaluate::{evaluate, Outcome, Record};
pub use format::{format_outcome, Formatted, ScalarStyle};
pub use matrix::{Matrix, Tolerance};
pub use operation::{Operation, OperationParams, Parameter};
pub use properties::{DiagonalTrace, Symmetry};
