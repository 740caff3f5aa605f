//! Event log for discovery runs.
//!
//! Every run records [`LingamEvent`]s in order, giving full visibility into
//! the pipeline: what was requested, which variable was placed at each step
//! and with what score, and whether the regularised fallback was used.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::measure::MeasureKind;

/// Events emitted during a discovery run.
///
/// Events are tagged with `#[serde(tag = "type")]` so they serialise as
/// `{ "type": "DiscoveryStarted", ... }` for easy ingestion into event stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LingamEvent {
    /// A run was validated and is about to begin.
    DiscoveryStarted {
        /// Number of variables.
        variables: usize,
        /// Number of samples.
        samples: usize,
        /// Independence measure in use.
        measure: MeasureKind,
        /// Worker count for pairwise scoring.
        workers: usize,
    },

    /// One ordering iteration placed a variable.
    VariablePlaced {
        /// Position in the ordering (0-indexed).
        position: usize,
        /// Original index of the placed variable.
        variable: usize,
        /// Its aggregate penalty.
        score: f64,
        /// Wall time elapsed since the run began.
        elapsed: Duration,
    },

    /// A rank-deficient regression was refit with a ridge penalty.
    RidgeFallback {
        /// Variable whose regression was refit.
        variable: usize,
        /// Penalty used.
        alpha: f64,
    },

    /// Edge weights were estimated.
    WeightsEstimated {
        /// Nonzero coefficients after pruning.
        nonzero_edges: usize,
        /// Coefficients cleared by pruning.
        pruned_edges: usize,
    },

    /// The run finished successfully.
    DiscoveryCompleted {
        /// Total wall time.
        wall_time: Duration,
    },
}
