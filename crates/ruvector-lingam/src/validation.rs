//! Input validation for discovery operations.
//!
//! Data and configuration are checked before the first ordering iteration,
//! and the estimated structure once more before it is returned. Every check
//! reports a [`ValidationError`], which lifts into
//! [`LingamError::InvalidInput`] through `?`.
//!
//! # Limits
//!
//! | Resource   | Limit       | Constant          |
//! |------------|-------------|-------------------|
//! | Variables  | 4,096       | [`MAX_VARIABLES`] |
//! | Samples    | 10,000,000  | [`MAX_SAMPLES`]   |
//! | Workers    | 1,024       | [`MAX_WORKERS`]   |
//!
//! [`LingamError::InvalidInput`]: crate::error::LingamError::InvalidInput

use crate::config::LingamConfig;
use crate::error::ValidationError;
use crate::types::{AdjacencyMatrix, CausalOrdering, DataMatrix};

// ---------------------------------------------------------------------------
// Resource limits
// ---------------------------------------------------------------------------

/// Maximum number of variables. Ordering discovery is `O(n^3 m)`.
pub const MAX_VARIABLES: usize = 4_096;

/// Maximum number of samples per variable.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Maximum worker count for the per-run thread pool.
pub const MAX_WORKERS: usize = 1_024;

/// Sample count below which results are statistically unreliable. Not an
/// error; validation only logs a warning.
pub const RECOMMENDED_MIN_SAMPLES: usize = 100;

// ---------------------------------------------------------------------------
// Observation matrix validation
// ---------------------------------------------------------------------------

/// Validate an observation matrix before discovery.
///
/// Performs the following checks in order:
///
/// 1. At least 2 variables.
/// 2. At least 2 samples.
/// 3. Dimensions within [`MAX_VARIABLES`] x [`MAX_SAMPLES`].
/// 4. No `NaN` or `Inf` values.
/// 5. Fewer than [`RECOMMENDED_MIN_SAMPLES`] samples emits a
///    [`tracing::warn`], but does not error.
///
/// Emptiness and raggedness are rejected earlier, by the [`DataMatrix`]
/// constructors.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first violation found.
///
/// # Examples
///
/// ```
/// use ruvector_lingam::types::DataMatrix;
/// use ruvector_lingam::validation::validate_data_matrix;
///
/// let data = DataMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![0.5, 0.1, 0.9]]).unwrap();
/// assert!(validate_data_matrix(&data).is_ok());
/// ```
pub fn validate_data_matrix(data: &DataMatrix) -> Result<(), ValidationError> {
    let (n, m) = (data.variables(), data.samples());

    // 1. Variable count
    if n < 2 {
        return Err(ValidationError::TooFewVariables(n));
    }

    // 2. Sample count
    if m < 2 {
        return Err(ValidationError::TooFewSamples(m));
    }

    // 3. Size limits
    if n > MAX_VARIABLES || m > MAX_SAMPLES {
        return Err(ValidationError::MatrixTooLarge {
            variables: n,
            samples: m,
            max_variables: MAX_VARIABLES,
            max_samples: MAX_SAMPLES,
        });
    }

    // 4. Finiteness
    for (i, row) in data.rows().enumerate() {
        if let Some((s, v)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NonFiniteValue(format!(
                "data[{i}, {s}] = {v}"
            )));
        }
    }

    // 5. Small-sample warning
    if m < RECOMMENDED_MIN_SAMPLES {
        tracing::warn!(
            samples = m,
            "fewer than {RECOMMENDED_MIN_SAMPLES} samples; ordering may be unreliable"
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Ordering validation
// ---------------------------------------------------------------------------

/// Validate that `ordering` covers exactly the variables of `data`.
///
/// The permutation property itself is guaranteed by [`CausalOrdering::new`].
///
/// # Errors
///
/// [`ValidationError::DimensionMismatch`] if the lengths differ.
pub fn validate_ordering(
    ordering: &CausalOrdering,
    variables: usize,
) -> Result<(), ValidationError> {
    if ordering.len() != variables {
        return Err(ValidationError::DimensionMismatch(format!(
            "ordering has {} entries but the data has {variables} variables",
            ordering.len(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration validation
// ---------------------------------------------------------------------------

/// Validate run configuration.
///
/// # Rules
///
/// - `workers` must be in `[1, MAX_WORKERS]`.
/// - `degeneracy_tolerance` and `rank_tolerance` must be finite and in
///   `[0.0, 1.0)`.
/// - `ridge_fallback`, when present, must be finite and positive.
/// - `prune_threshold` must be finite and non-negative.
/// - `budget.max_iterations` must be at least 1.
///
/// # Errors
///
/// Returns [`ValidationError::ParameterOutOfRange`] naming the first bad
/// field.
pub fn validate_config(config: &LingamConfig) -> Result<(), ValidationError> {
    if config.workers == 0 || config.workers > MAX_WORKERS {
        return Err(ValidationError::ParameterOutOfRange {
            name: "workers".into(),
            value: config.workers.to_string(),
            expected: format!("[1, {MAX_WORKERS}]"),
        });
    }

    for (name, value) in [
        ("degeneracy_tolerance", config.degeneracy_tolerance),
        ("rank_tolerance", config.rank_tolerance),
    ] {
        if !value.is_finite() || !(0.0..1.0).contains(&value) {
            return Err(ValidationError::ParameterOutOfRange {
                name: name.into(),
                value: format!("{value:.2e}"),
                expected: "[0.0, 1.0)".into(),
            });
        }
    }

    if let Some(alpha) = config.ridge_fallback {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(ValidationError::ParameterOutOfRange {
                name: "ridge_fallback".into(),
                value: format!("{alpha:.2e}"),
                expected: "finite positive value".into(),
            });
        }
    }

    if !config.prune_threshold.is_finite() || config.prune_threshold < 0.0 {
        return Err(ValidationError::ParameterOutOfRange {
            name: "prune_threshold".into(),
            value: config.prune_threshold.to_string(),
            expected: "finite non-negative value".into(),
        });
    }

    if config.budget.max_iterations == 0 {
        return Err(ValidationError::ParameterOutOfRange {
            name: "budget.max_iterations".into(),
            value: "0".into(),
            expected: ">= 1".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Output validation (post-estimation)
// ---------------------------------------------------------------------------

/// Validate an estimated adjacency matrix against its ordering.
///
/// Catches silent numerical corruption:
///
/// 1. No `NaN` or `Inf` coefficients.
/// 2. Every nonzero `B[i][j]` has `j` before `i` in the ordering.
///
/// # Errors
///
/// Returns [`ValidationError`] if the output is corrupted.
pub fn validate_output(
    adjacency: &AdjacencyMatrix,
    ordering: &CausalOrdering,
) -> Result<(), ValidationError> {
    if let Some((child, parent, w)) = adjacency.edges().find(|(_, _, w)| !w.is_finite()) {
        return Err(ValidationError::NonFiniteValue(format!(
            "B[{child}, {parent}] = {w}"
        )));
    }
    if !adjacency.is_acyclic_under(ordering) {
        return Err(ValidationError::InvalidOrdering(
            "adjacency has an edge that contradicts the causal ordering".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three() -> DataMatrix {
        DataMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0]]).unwrap()
    }

    // -- validate_data_matrix -----------------------------------------------

    #[test]
    fn valid_small_matrix() {
        assert!(validate_data_matrix(&two_by_three()).is_ok());
    }

    #[test]
    fn rejects_single_variable() {
        let data = DataMatrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(matches!(
            validate_data_matrix(&data),
            Err(ValidationError::TooFewVariables(1))
        ));
    }

    #[test]
    fn rejects_single_sample() {
        let data = DataMatrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(matches!(
            validate_data_matrix(&data),
            Err(ValidationError::TooFewSamples(1))
        ));
    }

    #[test]
    fn nan_value_rejected() {
        let data = DataMatrix::from_rows(vec![vec![1.0, f64::NAN], vec![2.0, 3.0]]).unwrap();
        match validate_data_matrix(&data) {
            Err(ValidationError::NonFiniteValue(msg)) => {
                assert!(msg.contains("data[0, 1]"), "msg: {msg}");
            }
            other => panic!("expected NonFiniteValue, got {other:?}"),
        }
    }

    #[test]
    fn inf_value_rejected() {
        let data =
            DataMatrix::from_rows(vec![vec![1.0, 2.0], vec![f64::NEG_INFINITY, 3.0]]).unwrap();
        assert!(matches!(
            validate_data_matrix(&data),
            Err(ValidationError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn rejects_too_many_variables() {
        let n = MAX_VARIABLES + 1;
        let data = DataMatrix::from_row_major(n, 2, vec![0.0; n * 2]).unwrap();
        assert!(matches!(
            validate_data_matrix(&data),
            Err(ValidationError::MatrixTooLarge { .. })
        ));
    }

    // -- validate_ordering --------------------------------------------------

    #[test]
    fn ordering_length_must_match() {
        let ordering = CausalOrdering::new(vec![1, 0, 2]).unwrap();
        assert!(validate_ordering(&ordering, 3).is_ok());
        assert!(matches!(
            validate_ordering(&ordering, 2),
            Err(ValidationError::DimensionMismatch(_))
        ));
    }

    // -- validate_config ----------------------------------------------------

    #[test]
    fn rejects_zero_workers() {
        let config = LingamConfig::with_workers(0);
        match validate_config(&config) {
            Err(ValidationError::ParameterOutOfRange { ref name, .. }) => {
                assert_eq!(name, "workers");
            }
            other => panic!("expected ParameterOutOfRange for workers, got {other:?}"),
        }
    }

    #[test]
    fn rejects_too_many_workers() {
        let config = LingamConfig::with_workers(MAX_WORKERS + 1);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_bad_tolerances() {
        for bad in [f64::NAN, -1e-6, 1.0] {
            let config = LingamConfig {
                rank_tolerance: bad,
                ..Default::default()
            };
            match validate_config(&config) {
                Err(ValidationError::ParameterOutOfRange { ref name, .. }) => {
                    assert_eq!(name, "rank_tolerance");
                }
                other => panic!("expected rank_tolerance error for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_positive_ridge() {
        let config = LingamConfig {
            ridge_fallback: Some(0.0),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_negative_prune_threshold() {
        let config = LingamConfig {
            prune_threshold: -0.1,
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    // -- validate_output ----------------------------------------------------

    #[test]
    fn output_must_respect_ordering() {
        let ordering = CausalOrdering::new(vec![0, 1]).unwrap();
        let mut b = AdjacencyMatrix::zeros(2);
        b.set(1, 0, 0.7);
        assert!(validate_output(&b, &ordering).is_ok());

        let reversed = CausalOrdering::new(vec![1, 0]).unwrap();
        assert!(matches!(
            validate_output(&b, &reversed),
            Err(ValidationError::InvalidOrdering(_))
        ));
    }

    #[test]
    fn output_rejects_nan_coefficient() {
        let ordering = CausalOrdering::new(vec![0, 1]).unwrap();
        let mut b = AdjacencyMatrix::zeros(2);
        b.set(1, 0, f64::NAN);
        assert!(matches!(
            validate_output(&b, &ordering),
            Err(ValidationError::NonFiniteValue(_))
        ));
    }
}
