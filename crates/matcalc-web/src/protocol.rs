use serde::Serialize;
use serde_json::Value;

use matcalc_core::{
    matrix, CalcError, CalcResult, Formatted, Matrix, Operation, OperationParams, Parameter,
};

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Formatted>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculateResponse {
    pub fn ok(result: Formatted) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(message: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A parsed `/calculate` body.
///
/// `operation` is `None` when the code is not one we know; the raw code is
/// kept for logging and for strict-mode errors.
#[derive(Debug)]
pub struct CalculateRequest {
    pub size: usize,
    pub code: String,
    pub operation: Option<Operation>,
    pub matrices: Vec<Matrix>,
    pub params: OperationParams,
}

impl CalculateRequest {
    /// Parse a request body.
    ///
    /// Every supplied matrix is read cell by cell over exactly `size`×`size`
    /// positions; surplus rows or columns are ignored. Optional parameters
    /// are only read for operations that use them.
    pub fn from_json(body: &Value) -> CalcResult<Self> {
        let size = require(body, "size").and_then(|v| coerce_int(v, "size"))?;
        let code = match require(body, "operation")? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let raw_matrices = require(body, "matrices")?;

        if size < 1 {
            return Err(CalcError::InvalidSize(size));
        }
        let n = usize::try_from(size).map_err(|_| CalcError::InvalidSize(size))?;

        let list = raw_matrices
            .as_array()
            .ok_or_else(|| CalcError::InvalidField {
                field: "matrices",
                reason: "expected a list of matrices".into(),
            })?;
        let matrices = list
            .iter()
            .enumerate()
            .map(|(idx, raw)| parse_matrix(idx, raw, n))
            .collect::<CalcResult<Vec<_>>>()?;

        let operation = Operation::from_code(&code);
        let params = match operation {
            Some(op) => read_params(body, op)?,
            None => OperationParams::default(),
        };

        Ok(Self {
            size: n,
            code,
            operation,
            matrices,
            params,
        })
    }
}

fn parse_matrix(idx: usize, raw: &Value, n: usize) -> CalcResult<Matrix> {
    let mut cells = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let cell = raw
                .get(row)
                .and_then(|r| r.get(col))
                .ok_or_else(|| CalcError::InvalidCell {
                    matrix: idx,
                    row,
                    col,
                    reason: "missing".into(),
                })?;
            let value = coerce_float(cell).map_err(|reason| CalcError::InvalidCell {
                matrix: idx,
                row,
                col,
                reason,
            })?;
            cells.push(value);
        }
    }
    matrix::from_cells(n, cells)
}

fn read_params(body: &Value, op: Operation) -> CalcResult<OperationParams> {
    let mut params = OperationParams::default();
    if op.arity() == 1 {
        if let Some(index) = optional_int(body, "selected_matrix")? {
            params.selected_matrix = index;
        }
    }
    if let Some(param) = op.parameter() {
        let field = param.field();
        if let Some(value) = optional_int(body, field)? {
            match param {
                Parameter::Power => params.power = value,
                Parameter::Period => params.period = value,
            }
        }
    }
    Ok(params)
}

// ---------------------------------------------------------------------------
// Loose field coercion
// ---------------------------------------------------------------------------

fn require<'a>(body: &'a Value, field: &'static str) -> CalcResult<&'a Value> {
    body.get(field).ok_or(CalcError::MissingField(field))
}

fn optional_int(body: &Value, field: &'static str) -> CalcResult<Option<i64>> {
    body.get(field).map(|v| coerce_int(v, field)).transpose()
}

/// Accepts integers, integral strings, finite floats (truncated) and booleans.
fn coerce_int(value: &Value, field: &'static str) -> CalcResult<i64> {
    let invalid = |reason: String| CalcError::InvalidField { field, reason };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                    _ => Err(invalid(format!("not an integer: {n}"))),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("not an integer: {s:?}"))),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(invalid(format!("not an integer: {other}"))),
    }
}

/// Accepts numbers, numeric strings and booleans.
fn coerce_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("not a number: {n}")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("not a number: {s:?}")),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(format!("not a number: {other}")),
    }
}
