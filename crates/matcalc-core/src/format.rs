use serde::Serialize;
use serde_json::Value;

use crate::evaluate::{Outcome, Record};
use crate::matrix;

/// How boolean and absent results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarStyle {
    /// `{"type": "string", "data": "True"}`; what existing clients expect.
    #[default]
    Stringified,
    /// `{"type": "scalar", "data": true}`.
    Native,
}

/// Tagged result envelope: `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Formatted {
    Matrix(Vec<Vec<f64>>),
    Dict(Record),
    String(String),
    Scalar(Value),
}

pub fn format_outcome(outcome: Outcome, style: ScalarStyle) -> Formatted {
    match (outcome, style) {
        (Outcome::Matrix(m), _) => Formatted::Matrix(matrix::to_rows(&m)),
        (Outcome::Record(record), _) => Formatted::Dict(record),
        (Outcome::Flag(flag), ScalarStyle::Stringified) => {
            Formatted::String(if flag { "True" } else { "False" }.into())
        }
        (Outcome::Flag(flag), ScalarStyle::Native) => Formatted::Scalar(Value::Bool(flag)),
        (Outcome::Nothing, ScalarStyle::Stringified) => Formatted::String("None".into()),
        (Outcome::Nothing, ScalarStyle::Native) => Formatted::Scalar(Value::Null),
    }
}
