//! Error types for causal discovery.
//!
//! Provides structured error variants for malformed input, numerical
//! degeneracy during ordering discovery, rank-deficient regressions during
//! weight estimation, and budget overruns. All errors implement
//! `std::error::Error` via `thiserror`.

use std::time::Duration;

/// Primary error type for discovery operations.
#[derive(Debug, thiserror::Error)]
pub enum LingamError {
    /// The caller supplied invalid input (dimensions, parameters, ordering).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A column has zero or near-zero variance, so neither regression nor
    /// the independence statistic is defined for it.
    #[error(
        "numerical degeneracy: variable {variable} has variance {variance:.3e} at iteration {iteration}"
    )]
    NumericalDegeneracy {
        /// Original index of the degenerate variable.
        variable: usize,
        /// Ordering iteration at which the degeneracy was detected
        /// (0 = the raw input).
        iteration: usize,
        /// Observed (residual) variance.
        variance: f64,
    },

    /// The parent design matrix of a regression does not have full column
    /// rank.
    #[error("rank deficiency: parents {parents:?} of variable {variable} are collinear")]
    RankDeficiency {
        /// Variable being regressed.
        variable: usize,
        /// Candidate parent set, in causal order.
        parents: Vec<usize>,
    },

    /// The compute budget (wall-time or iterations) was exhausted.
    #[error("compute budget exhausted: {reason}")]
    BudgetExhausted {
        /// Which budget limit was hit.
        reason: String,
        /// Wall-clock time elapsed before the budget was hit.
        elapsed: Duration,
    },

    /// A backend-specific error (e.g. thread pool construction).
    #[error("backend error: {0}")]
    BackendError(String),
}

/// Validation errors for discovery inputs.
///
/// Raised by the constructors in [`crate::types`] and by the checks in
/// [`crate::validation`].
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The observation matrix has no variables or no samples.
    #[error("observation matrix is empty")]
    Empty,

    /// Fewer than two variables were supplied.
    #[error("at least 2 variables are required, got {0}")]
    TooFewVariables(usize),

    /// Fewer than two samples were supplied.
    #[error("at least 2 samples are required, got {0}")]
    TooFewSamples(usize),

    /// Per-variable rows do not all have the same length.
    #[error("ragged rows: row {row} has {len} samples, expected {expected}")]
    RaggedRows {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Length of row 0.
        expected: usize,
    },

    /// Dimensions are inconsistent (buffer length, labels, ordering).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A value is NaN or infinite where a finite number is required.
    #[error("non-finite value detected: {0}")]
    NonFiniteValue(String),

    /// A parameter is outside its valid range.
    #[error("parameter out of range: {name} = {value} (expected {expected})")]
    ParameterOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The invalid value (as a string for flexibility).
        value: String,
        /// Human-readable description of the valid range.
        expected: String,
    },

    /// An ordering is not a permutation of `0..n`.
    #[error("invalid ordering: {0}")]
    InvalidOrdering(String),

    /// Matrix size exceeds the implementation limit.
    #[error(
        "matrix size {variables}x{samples} exceeds maximum supported {max_variables}x{max_samples}"
    )]
    MatrixTooLarge {
        /// Number of variables.
        variables: usize,
        /// Number of samples.
        samples: usize,
        /// Maximum supported variable count.
        max_variables: usize,
        /// Maximum supported sample count.
        max_samples: usize,
    },
}
