//! Square `f64` matrices and the handful of primitives the property checks
//! are built from.
//!
//! Everything here is a thin layer over `ndarray`. Shapes are checked up front
//! because `ndarray` broadcasts on `+`/`-` and panics on mismatched `dot`.

use ndarray::Array2;

use crate::error::{CalcError, CalcResult};

pub type Matrix = Array2<f64>;

/// Absolute/relative tolerance for closeness comparisons.
///
/// Two values are close when `|a - b| <= atol + rtol * |b|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

/// Build an n×n matrix from row-major cells.
pub fn from_cells(n: usize, cells: Vec<f64>) -> CalcResult<Matrix> {
    Array2::from_shape_vec((n, n), cells).map_err(|e| CalcError::InvalidField {
        field: "matrices",
        reason: e.to_string(),
    })
}

pub fn identity(n: usize) -> Matrix {
    Array2::eye(n)
}

pub fn zeros(n: usize) -> Matrix {
    Array2::zeros((n, n))
}

pub fn transpose(m: &Matrix) -> Matrix {
    m.t().to_owned()
}

/// Nested row vectors, the shape the HTTP layer emits.
pub fn to_rows(m: &Matrix) -> Vec<Vec<f64>> {
    m.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn ensure_square(m: &Matrix) -> CalcResult<usize> {
    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(CalcError::DimensionMismatch {
            left: (rows, cols),
            right: (cols, rows),
        });
    }
    Ok(rows)
}

fn ensure_same_shape(a: &Matrix, b: &Matrix) -> CalcResult<()> {
    if a.dim() != b.dim() {
        return Err(CalcError::DimensionMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(())
}

pub fn add(a: &Matrix, b: &Matrix) -> CalcResult<Matrix> {
    ensure_same_shape(a, b)?;
    Ok(a + b)
}

pub fn subtract(a: &Matrix, b: &Matrix) -> CalcResult<Matrix> {
    ensure_same_shape(a, b)?;
    Ok(a - b)
}

pub fn multiply(a: &Matrix, b: &Matrix) -> CalcResult<Matrix> {
    if a.ncols() != b.nrows() {
        return Err(CalcError::DimensionMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(a.dot(b))
}

/// Integer matrix power.
///
/// `k == 0` yields the identity and `k < 0` raises the inverse to `|k|`.
/// Products are accumulated in a fixed order (`(m·m)·m` for cubes, binary
/// decomposition above that) so exact-equality checks on the result are
/// reproducible.
pub fn power(m: &Matrix, k: i64) -> CalcResult<Matrix> {
    let n = ensure_square(m)?;
    if k == 0 {
        return Ok(identity(n));
    }
    let base = if k < 0 { inverse(m)? } else { m.clone() };
    let mut k = k.unsigned_abs();

    match k {
        1 => return Ok(base),
        2 => return Ok(base.dot(&base)),
        3 => return Ok(base.dot(&base).dot(&base)),
        _ => {}
    }

    let mut z: Option<Matrix> = None;
    let mut result: Option<Matrix> = None;
    while k > 0 {
        let square = match z.take() {
            None => base.clone(),
            Some(prev) => prev.dot(&prev),
        };
        if k & 1 == 1 {
            result = Some(match result.take() {
                None => square.clone(),
                Some(acc) => acc.dot(&square),
            });
        }
        z = Some(square);
        k >>= 1;
    }
    Ok(result.unwrap_or_else(|| identity(n)))
}

/// Gauss-Jordan inverse with partial pivoting.
pub fn inverse(m: &Matrix) -> CalcResult<Matrix> {
    let n = ensure_square(m)?;
    let mut a = m.clone();
    let mut inv = identity(n);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&x, &y| a[[x, col]].abs().total_cmp(&a[[y, col]].abs()))
            .unwrap_or(col);
        let pivot = a[[pivot_row, col]];
        if pivot == 0.0 || pivot.is_nan() {
            return Err(CalcError::SingularMatrix);
        }
        if pivot_row != col {
            for j in 0..n {
                a.swap([pivot_row, j], [col, j]);
                inv.swap([pivot_row, j], [col, j]);
            }
        }

        for j in 0..n {
            a[[col, j]] /= pivot;
            inv[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[[row, j]] -= factor * a[[col, j]];
                inv[[row, j]] -= factor * inv[[col, j]];
            }
        }
    }

    Ok(inv)
}

/// Element-wise exact equality. NaN never equals anything.
pub fn exactly_equal(a: &Matrix, b: &Matrix) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Element-wise closeness under `tol`. Equal infinities are close, NaN is not.
pub fn all_close(a: &Matrix, b: &Matrix, tol: Tolerance) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(&x, &y)| is_close(x, y, tol))
}

fn is_close(a: f64, b: f64, tol: Tolerance) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= tol.atol + tol.rtol * b.abs()
}
