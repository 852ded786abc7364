use std::fmt;

/// A calculator operation, identified on the wire by a one-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    DiagonalTrace,
    Idempotent,
    Nilpotent,
    Involutive,
    Symmetry,
    Orthogonal,
    Periodic,
}

/// The integer parameter an operation reads from the request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Power,
    Period,
}

impl Parameter {
    pub fn field(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Period => "period",
        }
    }
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::DiagonalTrace,
        Self::Idempotent,
        Self::Nilpotent,
        Self::Involutive,
        Self::Symmetry,
        Self::Orthogonal,
        Self::Periodic,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::DiagonalTrace => "d",
            Self::Idempotent => "i",
            Self::Nilpotent => "n",
            Self::Involutive => "v",
            Self::Symmetry => "s",
            Self::Orthogonal => "o",
            Self::Periodic => "p",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Number of matrices consumed. Binary operations always take the first
    /// two supplied matrices; unary ones take the selected matrix.
    pub fn arity(self) -> usize {
        match self {
            Self::Add | Self::Subtract | Self::Multiply => 2,
            _ => 1,
        }
    }

    pub fn parameter(self) -> Option<Parameter> {
        match self {
            Self::Nilpotent => Some(Parameter::Power),
            Self::Periodic => Some(Parameter::Period),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Add => "element-wise sum of matrices 0 and 1",
            Self::Subtract => "element-wise difference of matrices 0 and 1",
            Self::Multiply => "matrix product of matrices 0 and 1",
            Self::DiagonalTrace => "diagonal entries and trace",
            Self::Idempotent => "M·M equals M",
            Self::Nilpotent => "M^power is the zero matrix",
            Self::Involutive => "M·M equals the identity",
            Self::Symmetry => "M equals its transpose / negated transpose",
            Self::Orthogonal => "M·Mᵗ is close to the identity",
            Self::Periodic => "M^(period+1) equals M",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("invalid operation: {s}"))
    }
}

/// Optional request parameters, with the defaults clients rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationParams {
    /// Index of the matrix unary operations act on. Default 0.
    pub selected_matrix: i64,
    /// Exponent for the nilpotent test. Default 2.
    pub power: i64,
    /// Period for the periodicity test. Default 2.
    pub period: i64,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            selected_matrix: 0,
            power: 2,
            period: 2,
        }
    }
}
