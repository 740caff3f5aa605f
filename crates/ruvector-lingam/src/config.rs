//! Run configuration.
//!
//! A [`LingamConfig`] is passed explicitly into every discovery call and
//! lives for that call only; there is no process-wide pool or state.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::measure::MeasureKind;
use crate::types::ComputeBudget;

/// Configuration for ordering discovery and weight estimation.
///
/// All fields have sensible defaults; override them with struct-update
/// syntax.
///
/// # Example
///
/// ```rust
/// use ruvector_lingam::config::LingamConfig;
/// use ruvector_lingam::measure::MeasureKind;
///
/// let config = LingamConfig {
///     workers: 4,
///     measure: MeasureKind::Kurtosis,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LingamConfig {
    /// Number of threads evaluating pairwise statistics within one ordering
    /// iteration. `1` forces fully sequential execution. The result does
    /// not depend on this value.
    ///
    /// Default: `1`.
    pub workers: usize,

    /// Pairwise independence measure.
    ///
    /// Default: [`MeasureKind::Entropy`].
    pub measure: MeasureKind,

    /// Relative variance floor for residual columns. After the first
    /// placement, a residual whose variance is not greater than
    /// `degeneracy_tolerance` times the variance of its original column is
    /// degenerate. Original columns are rejected only when constant, so
    /// shifting a column by any offset does not change the result.
    ///
    /// Default: `1e-10`.
    pub degeneracy_tolerance: f64,

    /// Relative floor on the orthogonal remainder of a parent column during
    /// the least-squares fit; below it the design is rank-deficient.
    ///
    /// Default: `1e-10`.
    pub rank_tolerance: f64,

    /// Ridge penalty used to refit a rank-deficient regression. `None`
    /// surfaces [`RankDeficiency`](crate::error::LingamError::RankDeficiency)
    /// instead.
    ///
    /// Default: `None`.
    pub ridge_fallback: Option<f64>,

    /// Coefficients with `|b| < prune_threshold` are set to zero after
    /// estimation. `0.0` disables pruning.
    ///
    /// Default: `0.0`.
    pub prune_threshold: f64,

    /// Wall-time and iteration limits for the ordering loop.
    pub budget: ComputeBudget,
}

impl Default for LingamConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            measure: MeasureKind::Entropy,
            degeneracy_tolerance: 1e-10,
            rank_tolerance: 1e-10,
            ridge_fallback: None,
            prune_threshold: 0.0,
            budget: ComputeBudget::default(),
        }
    }
}

impl LingamConfig {
    /// Default configuration with `workers` threads.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ParameterOutOfRange`] if the JSON is malformed or
    /// any field fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ValidationError::ParameterOutOfRange {
                name: "config".into(),
                value: e.to_string(),
                expected: "valid LingamConfig JSON".into(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its valid range.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ParameterOutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::validation::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LingamConfig::default();
        assert_eq!(config.workers, 1);
        assert_eq!(config.measure, MeasureKind::Entropy);
        assert!(config.ridge_fallback.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn with_workers_keeps_other_defaults() {
        let config = LingamConfig::with_workers(8);
        assert_eq!(config.workers, 8);
        assert_eq!(config.prune_threshold, 0.0);
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config =
            LingamConfig::from_json(r#"{ "workers": 3, "measure": "kurtosis" }"#).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.measure, MeasureKind::Kurtosis);
        assert_eq!(config.rank_tolerance, 1e-10);
    }

    #[test]
    fn from_json_rejects_zero_workers() {
        match LingamConfig::from_json(r#"{ "workers": 0 }"#) {
            Err(ValidationError::ParameterOutOfRange { ref name, .. }) => {
                assert_eq!(name, "workers");
            }
            other => panic!("expected ParameterOutOfRange for workers, got {other:?}"),
        }
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(LingamConfig::from_json("not json").is_err());
        assert!(LingamConfig::from_json(r#"{ "measure": "mutual_info" }"#).is_err());
    }

    #[test]
    fn serde_round_trip_preserves_config() {
        let config = LingamConfig {
            workers: 2,
            ridge_fallback: Some(1e-3),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LingamConfig::from_json(&json).unwrap(), config);
    }
}
