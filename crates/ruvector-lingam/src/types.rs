//! Core types for causal discovery.
//!
//! Provides [`DataMatrix`] for dense observation storage, [`CausalOrdering`]
//! for the discovered variable order, and [`AdjacencyMatrix`] for the
//! estimated direct-effect coefficients.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::LingamEvent;

// ---------------------------------------------------------------------------
// DataMatrix
// ---------------------------------------------------------------------------

/// Dense observation matrix: `variables` rows by `samples` columns.
///
/// Stored row-major so that each variable's samples are contiguous, which is
/// the access pattern of every regression and moment computation in the
/// crate.
///
/// # Layout
///
/// Variable `i` spans `values[i * samples..(i + 1) * samples]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMatrix {
    values: Vec<f64>,
    variables: usize,
    samples: usize,
}

impl DataMatrix {
    /// Build a matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] if either dimension is zero, and
    /// [`ValidationError::DimensionMismatch`] if `values.len()` is not
    /// `variables * samples`.
    pub fn from_row_major(
        variables: usize,
        samples: usize,
        values: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        if variables == 0 || samples == 0 {
            return Err(ValidationError::Empty);
        }
        let expected = variables.checked_mul(samples).ok_or_else(|| {
            ValidationError::DimensionMismatch(format!(
                "{variables}x{samples} overflows usize"
            ))
        })?;
        if values.len() != expected {
            return Err(ValidationError::DimensionMismatch(format!(
                "buffer length {} does not equal {variables} * {samples} = {expected}",
                values.len(),
            )));
        }
        Ok(Self {
            values,
            variables,
            samples,
        })
    }

    /// Build a matrix from one vector of samples per variable.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for no rows or empty rows, and
    /// [`ValidationError::RaggedRows`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ValidationError> {
        let expected = rows.first().map(Vec::len).ok_or(ValidationError::Empty)?;
        if expected == 0 {
            return Err(ValidationError::Empty);
        }
        for (row, r) in rows.iter().enumerate() {
            if r.len() != expected {
                return Err(ValidationError::RaggedRows {
                    row,
                    len: r.len(),
                    expected,
                });
            }
        }
        let variables = rows.len();
        Ok(Self {
            values: rows.into_iter().flatten().collect(),
            variables,
            samples: expected,
        })
    }

    /// Build a matrix from one vector per observation (sample-major, the
    /// layout of a CSV file or a data frame).
    ///
    /// # Errors
    ///
    /// Same as [`from_rows`](Self::from_rows), with "row" meaning an
    /// observation.
    pub fn from_observations(observations: &[Vec<f64>]) -> Result<Self, ValidationError> {
        let variables = observations
            .first()
            .map(Vec::len)
            .ok_or(ValidationError::Empty)?;
        if variables == 0 {
            return Err(ValidationError::Empty);
        }
        let samples = observations.len();
        let mut values = vec![0.0f64; variables * samples];
        for (s, obs) in observations.iter().enumerate() {
            if obs.len() != variables {
                return Err(ValidationError::RaggedRows {
                    row: s,
                    len: obs.len(),
                    expected: variables,
                });
            }
            for (v, &x) in obs.iter().enumerate() {
                values[v * samples + s] = x;
            }
        }
        Ok(Self {
            values,
            variables,
            samples,
        })
    }

    /// Number of variables (rows).
    #[inline]
    pub fn variables(&self) -> usize {
        self.variables
    }

    /// Number of samples (columns).
    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Samples of variable `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.variables()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.samples..(i + 1) * self.samples]
    }

    /// Iterate over the rows in variable order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.samples)
    }

    /// The flat row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

// ---------------------------------------------------------------------------
// CausalOrdering
// ---------------------------------------------------------------------------

/// A total order over variables: no variable causes one that precedes it.
///
/// Always a permutation of `0..n`; the constructor enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CausalOrdering {
    order: Vec<usize>,
    #[serde(skip)]
    positions: Vec<usize>,
}

impl CausalOrdering {
    /// Wrap a vector of variable indices.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidOrdering`] if `order` is not a permutation
    /// of `0..order.len()`.
    pub fn new(order: Vec<usize>) -> Result<Self, ValidationError> {
        let n = order.len();
        let mut positions = vec![usize::MAX; n];
        for (pos, &v) in order.iter().enumerate() {
            if v >= n {
                return Err(ValidationError::InvalidOrdering(format!(
                    "index {v} at position {pos} is out of range for {n} variables"
                )));
            }
            if positions[v] != usize::MAX {
                return Err(ValidationError::InvalidOrdering(format!(
                    "index {v} appears at positions {} and {pos}",
                    positions[v],
                )));
            }
            positions[v] = pos;
        }
        Ok(Self { order, positions })
    }

    /// Number of variables.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` if the ordering contains no variables.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Variable indices, most exogenous first.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Position of variable `v` in the ordering.
    #[inline]
    pub fn position_of(&self, v: usize) -> Option<usize> {
        self.positions.get(v).copied()
    }

    /// `true` if `a` appears strictly before `b`.
    pub fn precedes(&self, a: usize, b: usize) -> bool {
        match (self.position_of(a), self.position_of(b)) {
            (Some(pa), Some(pb)) => pa < pb,
            _ => false,
        }
    }

    /// Variables placed before position `k`, in causal order.
    #[inline]
    pub fn prefix(&self, k: usize) -> &[usize] {
        &self.order[..k]
    }
}

impl From<CausalOrdering> for Vec<usize> {
    fn from(ordering: CausalOrdering) -> Self {
        ordering.order
    }
}

// ---------------------------------------------------------------------------
// AdjacencyMatrix
// ---------------------------------------------------------------------------

/// Weighted adjacency matrix `B`: `B[i][j]` is the direct effect of `j` on
/// `i`.
///
/// Row-major, `n * n` entries. The diagonal is always zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacencyMatrix {
    values: Vec<f64>,
    n: usize,
}

impl AdjacencyMatrix {
    /// An all-zero `n x n` matrix.
    pub fn zeros(n: usize) -> Self {
        Self {
            values: vec![0.0; n * n],
            n,
        }
    }

    /// Dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Entry `B[child][parent]`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, child: usize, parent: usize) -> f64 {
        assert!(child < self.n && parent < self.n, "index out of range");
        self.values[child * self.n + parent]
    }

    /// Set `B[child][parent]`. Writes to the diagonal are ignored.
    #[inline]
    pub(crate) fn set(&mut self, child: usize, parent: usize, weight: f64) {
        if child != parent {
            self.values[child * self.n + parent] = weight;
        }
    }

    /// Row of `B` for `child`: the coefficients of all candidate parents.
    #[inline]
    pub fn row(&self, child: usize) -> &[f64] {
        &self.values[child * self.n..(child + 1) * self.n]
    }

    /// Nested-vector copy, convenient for serialisation and display.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks_exact(self.n.max(1)).map(<[f64]>::to_vec).collect()
    }

    /// Nonzero entries as `(child, parent, weight)` triplets in row-major
    /// order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.n;
        self.values
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(move |(idx, &w)| (idx / n, idx % n, w))
    }

    /// Number of nonzero entries.
    pub fn nonzero_count(&self) -> usize {
        self.values.iter().filter(|&&w| w != 0.0).count()
    }

    /// `true` if every nonzero `B[i][j]` has `j` strictly before `i` in
    /// `ordering`, i.e. the matrix is strictly lower-triangular once
    /// permuted by the ordering.
    pub fn is_acyclic_under(&self, ordering: &CausalOrdering) -> bool {
        ordering.len() == self.n
            && self
                .edges()
                .all(|(child, parent, _)| ordering.precedes(parent, child))
    }

    /// Zero every entry with `|b| < threshold`. Returns how many entries
    /// were cleared.
    pub fn prune(&mut self, threshold: f64) -> usize {
        let mut cleared = 0;
        for w in self.values.iter_mut() {
            if *w != 0.0 && w.abs() < threshold {
                *w = 0.0;
                cleared += 1;
            }
        }
        cleared
    }
}

// ---------------------------------------------------------------------------
// Budget & result types
// ---------------------------------------------------------------------------

/// Budget constraints for one discovery run.
///
/// Checked between ordering iterations only; an iteration that has started
/// always completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeBudget {
    /// Maximum wall-clock time allowed.
    pub max_time: Duration,
    /// Maximum number of ordering iterations.
    pub max_iterations: usize,
}

impl Default for ComputeBudget {
    fn default() -> Self {
        Self {
            max_time: Duration::from_secs(3600),
            max_iterations: crate::validation::MAX_VARIABLES,
        }
    }
}

/// Score of the variable selected at one ordering step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementScore {
    /// Original index of the placed variable.
    pub variable: usize,
    /// Its aggregate penalty `M` (lower is more exogenous).
    pub score: f64,
}

/// Ordering plus the placement score of every step.
#[derive(Debug, Clone)]
pub struct OrderingOutcome {
    /// The discovered ordering.
    pub ordering: CausalOrdering,
    /// One entry per placed variable, in ordering order. The final, trivially
    /// placed variable has score `0.0`.
    pub scores: Vec<PlacementScore>,
}

/// Result returned by a successful discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Causal ordering, most exogenous first.
    pub ordering: CausalOrdering,
    /// Estimated direct-effect coefficients.
    pub adjacency: AdjacencyMatrix,
    /// Placement score per ordering step.
    pub scores: Vec<PlacementScore>,
    /// Events emitted during the run, in order.
    pub events: Vec<LingamEvent>,
    /// Wall-clock time taken.
    pub wall_time: Duration,
}
