//! End-to-end DirectLiNGAM pipeline.
//!
//! [`DirectLingam`] chains validation, ordering discovery, weight
//! estimation, optional pruning, and output validation, and records a
//! [`LingamEvent`] log along the way. [`DirectLingam::fit_audited`] also
//! returns a [`DiscoveryAuditEntry`] for the run.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::audit::{AuditBuilder, DiscoveryAuditEntry};
use crate::config::LingamConfig;
use crate::error::LingamError;
use crate::estimator::WeightEstimator;
use crate::events::LingamEvent;
use crate::ordering::OrderingEngine;
use crate::types::{DataMatrix, DiscoveryResult};
use crate::validation::{validate_data_matrix, validate_output};

/// DirectLiNGAM causal discovery.
///
/// # Example
///
/// ```rust
/// use ruvector_lingam::config::LingamConfig;
/// use ruvector_lingam::lingam::DirectLingam;
/// use ruvector_lingam::types::DataMatrix;
///
/// let a: Vec<f64> = (0..300).map(|k| ((k * 37 % 101) as f64 / 101.0).powi(3)).collect();
/// let e: Vec<f64> = (0..300).map(|k| ((k * 53 % 97) as f64 / 97.0).powi(3)).collect();
/// let b: Vec<f64> = a.iter().zip(&e).map(|(x, n)| 1.5 * x + n).collect();
///
/// let data = DataMatrix::from_rows(vec![a, b]).unwrap();
/// let result = DirectLingam::new(LingamConfig::default()).fit(&data).unwrap();
///
/// assert_eq!(result.ordering.len(), 2);
/// assert!(result.adjacency.is_acyclic_under(&result.ordering));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectLingam {
    config: LingamConfig,
}

impl DirectLingam {
    pub fn new(config: LingamConfig) -> Self {
        Self { config }
    }

    /// The configuration used by [`fit`](Self::fit).
    pub fn config(&self) -> &LingamConfig {
        &self.config
    }

    /// Discover the causal ordering and edge weights of `data`.
    ///
    /// # Errors
    ///
    /// Any error of [`discover_ordering`](crate::ordering::discover_ordering)
    /// or [`estimate_weights`](crate::estimator::estimate_weights).
    #[instrument(skip(self, data), fields(n = data.variables(), m = data.samples()))]
    pub fn fit(&self, data: &DataMatrix) -> Result<DiscoveryResult, LingamError> {
        let start = Instant::now();
        validate_data_matrix(data)?;
        let engine = OrderingEngine::new(&self.config)?;

        let mut events = vec![LingamEvent::DiscoveryStarted {
            variables: data.variables(),
            samples: data.samples(),
            measure: self.config.measure,
            workers: self.config.workers,
        }];

        let outcome = engine.run_with(data, |position, placed| {
            events.push(LingamEvent::VariablePlaced {
                position,
                variable: placed.variable,
                score: placed.score,
                elapsed: start.elapsed(),
            });
        })?;

        let mut adjacency = WeightEstimator::new(&self.config).estimate_with(
            data,
            &outcome.ordering,
            |variable, alpha| events.push(LingamEvent::RidgeFallback { variable, alpha }),
        )?;

        let pruned_edges = if self.config.prune_threshold > 0.0 {
            adjacency.prune(self.config.prune_threshold)
        } else {
            0
        };
        let nonzero_edges = adjacency.nonzero_count();
        events.push(LingamEvent::WeightsEstimated {
            nonzero_edges,
            pruned_edges,
        });

        validate_output(&adjacency, &outcome.ordering)?;

        let wall_time: Duration = start.elapsed();
        events.push(LingamEvent::DiscoveryCompleted { wall_time });
        info!(
            edges = nonzero_edges,
            pruned = pruned_edges,
            wall_time_us = wall_time.as_micros() as u64,
            "discovery completed"
        );

        Ok(DiscoveryResult {
            ordering: outcome.ordering,
            adjacency,
            scores: outcome.scores,
            events,
            wall_time,
        })
    }

    /// [`fit`](Self::fit), plus an audit entry fingerprinting `data` and the
    /// discovered structure under `request_id`.
    ///
    /// # Errors
    ///
    /// Same as [`fit`](Self::fit). No entry is produced for a failed run.
    pub fn fit_audited(
        &self,
        request_id: impl Into<String>,
        data: &DataMatrix,
    ) -> Result<(DiscoveryResult, DiscoveryAuditEntry), LingamError> {
        let audit = AuditBuilder::start(request_id, data);
        let result = self.fit(data)?;
        let entry = audit.finish(&result, self.config.measure);
        debug!(
            request_id = %entry.request_id,
            input_hash = ?entry.input_hash,
            output_hash = ?entry.output_hash,
            "audit entry recorded"
        );
        Ok((result, entry))
    }
}
