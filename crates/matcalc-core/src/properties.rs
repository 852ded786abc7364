//! Structural property checks on a single square matrix.
//!
//! Idempotent, nilpotent, involutive, symmetry and periodic checks compare
//! exactly. Orthogonality is the only tolerance-based check.

use serde::Serialize;

use crate::error::CalcResult;
use crate::matrix::{self, Matrix, Tolerance};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagonalTrace {
    pub diagonal: Vec<f64>,
    pub trace: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Symmetry {
    pub symmetric: bool,
    pub antisymmetric: bool,
}

pub fn diagonal_and_trace(m: &Matrix) -> DiagonalTrace {
    let diagonal = m.diag().to_vec();
    let trace = diagonal.iter().sum();
    DiagonalTrace { diagonal, trace }
}

/// M·M == M.
pub fn is_idempotent(m: &Matrix) -> CalcResult<bool> {
    let square = matrix::multiply(m, m)?;
    Ok(matrix::exactly_equal(&square, m))
}

/// M^power == 0.
pub fn is_nilpotent(m: &Matrix, power: i64) -> CalcResult<bool> {
    let raised = matrix::power(m, power)?;
    Ok(raised.iter().all(|&x| x == 0.0))
}

/// M·M == I.
pub fn is_involutive(m: &Matrix) -> CalcResult<bool> {
    let square = matrix::multiply(m, m)?;
    Ok(matrix::exactly_equal(&square, &matrix::identity(m.nrows())))
}

pub fn check_symmetry(m: &Matrix) -> Symmetry {
    let transpose = matrix::transpose(m);
    let negated = -&transpose;
    Symmetry {
        symmetric: matrix::exactly_equal(m, &transpose),
        antisymmetric: matrix::exactly_equal(m, &negated),
    }
}

/// M·Mᵗ ≈ I.
pub fn is_orthogonal(m: &Matrix, tol: Tolerance) -> CalcResult<bool> {
    let product = matrix::multiply(m, &matrix::transpose(m))?;
    Ok(matrix::all_close(
        &product,
        &matrix::identity(m.nrows()),
        tol,
    ))
}

/// M^(period+1) == M.
pub fn is_periodic(m: &Matrix, period: i64) -> CalcResult<bool> {
    let raised = matrix::power(m, period.saturating_add(1))?;
    Ok(matrix::exactly_equal(&raised, m))
}
