use serde_json::Value;
use tracing::{debug, error};

use matcalc_core::{
    evaluate, format_outcome, CalcError, CalcResult, Formatted, Outcome, ScalarStyle, Tolerance,
};

use crate::protocol::{CalculateRequest, CalculateResponse};

/// Behavior switches for `/calculate`. The defaults match what existing
/// clients of the calculator expect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApiOptions {
    /// Emit booleans as `{"type": "scalar", "data": true}` instead of
    /// `{"type": "string", "data": "True"}`.
    pub native_scalars: bool,
    /// Reject unknown operation codes instead of returning a `None` result.
    pub strict_operations: bool,
    /// Tolerance for the orthogonality check.
    pub tolerance: Tolerance,
}

impl ApiOptions {
    fn scalar_style(&self) -> ScalarStyle {
        if self.native_scalars {
            ScalarStyle::Native
        } else {
            ScalarStyle::Stringified
        }
    }
}

/// Handle one raw `/calculate` body. Every failure becomes an error envelope.
pub fn calculate(body: &[u8], options: &ApiOptions) -> CalculateResponse {
    match try_calculate(body, options) {
        Ok(result) => CalculateResponse::ok(result),
        Err(e) => {
            error!("calculate failed: {e}");
            CalculateResponse::err(e.to_string())
        }
    }
}

fn try_calculate(body: &[u8], options: &ApiOptions) -> CalcResult<Formatted> {
    let json: Value = serde_json::from_slice(body)?;
    let request = CalculateRequest::from_json(&json)?;
    debug!(
        "calculate: operation={:?} size={} matrices={}",
        request.code,
        request.size,
        request.matrices.len()
    );

    let outcome = match request.operation {
        Some(op) => evaluate(op, &request.matrices, &request.params, options.tolerance)?,
        None if options.strict_operations => {
            return Err(CalcError::UnsupportedOperation(request.code));
        }
        None => Outcome::Nothing,
    };

    Ok(format_outcome(outcome, options.scalar_style()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(body: Value, options: ApiOptions) -> Value {
        let bytes = serde_json::to_vec(&body).unwrap();
        serde_json::to_value(calculate(&bytes, &options)).unwrap()
    }

    #[test]
    fn test_addition_scenario() {
        let out = run(
            json!({"size": 2, "operation": "+", "matrices": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]]}),
            ApiOptions::default(),
        );
        assert_eq!(
            out,
            json!({"success": true, "result": {"type": "matrix", "data": [[6.0, 8.0], [10.0, 12.0]]}})
        );
    }

    #[test]
    fn test_diagonal_scenario() {
        let out = run(
            json!({"size": 2, "operation": "d", "matrices": [[[1, 2], [3, 4]]], "selected_matrix": 0}),
            ApiOptions::default(),
        );
        assert_eq!(
            out,
            json!({"success": true, "result": {"type": "dict", "data": {"diagonal": [1.0, 4.0], "trace": 5.0}}})
        );
    }

    #[test]
    fn test_missing_matrices_scenario() {
        let out = run(json!({"size": 2, "operation": "+"}), ApiOptions::default());
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error"], json!("missing required field: matrices"));
        assert!(out.get("result").is_none());
    }

    #[test]
    fn test_invalid_json_body() {
        let response = calculate(b"{not json", &ApiOptions::default());
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("invalid JSON body"));
    }

    #[test]
    fn test_boolean_result_stringified() {
        let body = json!({"size": 2, "operation": "i", "matrices": [[["1", "0"], ["0", "1"]]]});
        let out = run(body.clone(), ApiOptions::default());
        assert_eq!(out["result"], json!({"type": "string", "data": "True"}));

        let native = ApiOptions {
            native_scalars: true,
            ..Default::default()
        };
        let out = run(body, native);
        assert_eq!(out["result"], json!({"type": "scalar", "data": true}));
    }

    #[test]
    fn test_unknown_operation_yields_none() {
        let body = json!({"size": 1, "operation": "x", "matrices": [[[1]]]});
        let out = run(body.clone(), ApiOptions::default());
        assert_eq!(
            out,
            json!({"success": true, "result": {"type": "string", "data": "None"}})
        );

        let strict = ApiOptions {
            strict_operations: true,
            ..Default::default()
        };
        let out = run(body, strict);
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error"], json!("unsupported operation: x"));
    }

    #[test]
    fn test_symmetry_record() {
        let body = json!({"size": 2, "operation": "s", "matrices": [[[0, 2], [-2, 0]]]});
        let out = run(body, ApiOptions::default());
        assert_eq!(
            out["result"],
            json!({"type": "dict", "data": {"symmetric": false, "antisymmetric": true}})
        );
    }

    #[test]
    fn test_selected_matrix_out_of_range() {
        let body = json!({
            "size": 1,
            "operation": "v",
            "matrices": [[[1]], [[1]]],
            "selected_matrix": 2
        });
        let out = run(body, ApiOptions::default());
        assert_eq!(out["success"], json!(false));
    }

    #[test]
    fn test_negative_selected_matrix_picks_last() {
        let body = json!({
            "size": 2,
            "operation": "v",
            "matrices": [[[1, 2], [3, 4]], [[1, 0], [0, 1]]],
            "selected_matrix": -1
        });
        let out = run(body, ApiOptions::default());
        assert_eq!(
            out,
            json!({"success": true, "result": {"type": "string", "data": "True"}})
        );
    }

    #[test]
    fn test_periodic_with_period_param() {
        let body = json!({
            "size": 2,
            "operation": "p",
            "matrices": [[[0, -1], [1, 0]]],
            "period": 4
        });
        let out = run(body, ApiOptions::default());
        assert_eq!(out["result"]["data"], json!("True"));
    }

    #[test]
    fn test_orthogonal_tolerance_option() {
        let body = json!({"size": 1, "operation": "o", "matrices": [[[1.001]]]});
        let out = run(body.clone(), ApiOptions::default());
        assert_eq!(out["result"]["data"], json!("False"));

        let loose = ApiOptions {
            tolerance: Tolerance {
                rtol: 0.01,
                atol: 0.0,
            },
            ..Default::default()
        };
        let out = run(body, loose);
        assert_eq!(out["result"]["data"], json!("True"));
    }
}
