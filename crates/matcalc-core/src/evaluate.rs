use serde::Serialize;

use crate::error::{CalcError, CalcResult};
use crate::matrix::{self, Matrix, Tolerance};
use crate::operation::{Operation, OperationParams};
use crate::properties::{self, DiagonalTrace, Symmetry};

/// Raw result of one evaluation, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matrix(Matrix),
    Record(Record),
    Flag(bool),
    /// No evaluator ran (unrecognized operation code).
    Nothing,
}

/// Named-field results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    DiagonalTrace(DiagonalTrace),
    Symmetry(Symmetry),
}

/// Run `op` against the supplied matrices.
///
/// Binary operations always read `matrices[0]` and `matrices[1]`; unary ones
/// read `matrices[params.selected_matrix]`.
pub fn evaluate(
    op: Operation,
    matrices: &[Matrix],
    params: &OperationParams,
    tolerance: Tolerance,
) -> CalcResult<Outcome> {
    let outcome = match op {
        Operation::Add => Outcome::Matrix(matrix::add(first(matrices)?, second(matrices)?)?),
        Operation::Subtract => {
            Outcome::Matrix(matrix::subtract(first(matrices)?, second(matrices)?)?)
        }
        Operation::Multiply => {
            Outcome::Matrix(matrix::multiply(first(matrices)?, second(matrices)?)?)
        }
        Operation::DiagonalTrace => {
            let m = selected(matrices, params)?;
            Outcome::Record(Record::DiagonalTrace(properties::diagonal_and_trace(m)))
        }
        Operation::Idempotent => {
            Outcome::Flag(properties::is_idempotent(selected(matrices, params)?)?)
        }
        Operation::Nilpotent => Outcome::Flag(properties::is_nilpotent(
            selected(matrices, params)?,
            params.power,
        )?),
        Operation::Involutive => {
            Outcome::Flag(properties::is_involutive(selected(matrices, params)?)?)
        }
        Operation::Symmetry => {
            let m = selected(matrices, params)?;
            Outcome::Record(Record::Symmetry(properties::check_symmetry(m)))
        }
        Operation::Orthogonal => Outcome::Flag(properties::is_orthogonal(
            selected(matrices, params)?,
            tolerance,
        )?),
        Operation::Periodic => Outcome::Flag(properties::is_periodic(
            selected(matrices, params)?,
            params.period,
        )?),
    };
    Ok(outcome)
}

fn first(matrices: &[Matrix]) -> CalcResult<&Matrix> {
    operand(matrices, 0)
}

fn second(matrices: &[Matrix]) -> CalcResult<&Matrix> {
    operand(matrices, 1)
}

fn selected<'a>(matrices: &'a [Matrix], params: &OperationParams) -> CalcResult<&'a Matrix> {
    operand(matrices, params.selected_matrix)
}

/// Negative indices count from the end, so `-1` is the last matrix.
fn operand(matrices: &[Matrix], index: i64) -> CalcResult<&Matrix> {
    let resolved = if index < 0 {
        i64::try_from(matrices.len())
            .ok()
            .and_then(|len| usize::try_from(len + index).ok())
    } else {
        usize::try_from(index).ok()
    };
    resolved
        .and_then(|i| matrices.get(i))
        .ok_or(CalcError::IndexOutOfRange {
            index,
            count: matrices.len(),
        })
}
