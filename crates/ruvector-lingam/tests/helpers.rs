//! Shared test helpers for the ruvector-lingam integration test suite.
//!
//! Provides a deterministic generator, linear SEM samplers with Laplace
//! noise, and small comparison utilities used across all test modules.

#![allow(dead_code)]

use ruvector_lingam::types::{AdjacencyMatrix, CausalOrdering, DataMatrix};

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// A minimal linear congruential generator for deterministic test data.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a new LCG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next u64 value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Generate a uniform f64 in the open interval (0, 1).
    pub fn next_open01(&mut self) -> f64 {
        ((self.next_u64() >> 11) as f64 + 0.5) / (1u64 << 53) as f64
    }

    /// Draw from a standard Laplace distribution (scale 1).
    pub fn next_laplace(&mut self) -> f64 {
        let u = self.next_open01();
        if u < 0.5 {
            (2.0 * u).ln()
        } else {
            -(2.0 * (1.0 - u)).ln()
        }
    }
}

// ---------------------------------------------------------------------------
// Linear SEM samplers
// ---------------------------------------------------------------------------

/// Sample `m` observations from a linear SEM with Laplace noise.
///
/// `topo` lists the variables in a topological order of the generating DAG
/// and `edges` holds `(child, parent, weight)` triplets. Every variable gets
/// its own unit-scale Laplace noise term.
pub fn linear_sem(
    n: usize,
    topo: &[usize],
    edges: &[(usize, usize, f64)],
    m: usize,
    seed: u64,
) -> DataMatrix {
    assert_eq!(topo.len(), n, "topological order must cover every variable");
    let mut rng = Lcg::new(seed);
    let mut rows = vec![vec![0.0f64; m]; n];

    for &v in topo {
        let mut col: Vec<f64> = (0..m).map(|_| rng.next_laplace()).collect();
        for &(child, parent, w) in edges {
            if child == v {
                for (x, p) in col.iter_mut().zip(&rows[parent]) {
                    *x += w * p;
                }
            }
        }
        rows[v] = col;
    }

    DataMatrix::from_rows(rows).expect("sampler produced a valid matrix")
}

/// `x0 ~ L; x1 = 2 x0 + L; x2 = -x0 + 3 x1 + L`.
pub fn three_variable_scenario(m: usize, seed: u64) -> DataMatrix {
    linear_sem(
        3,
        &[0, 1, 2],
        &[(1, 0, 2.0), (2, 0, -1.0), (2, 1, 3.0)],
        m,
        seed,
    )
}

/// A simple chain `0 -> 1 -> ... -> n-1` with the given edge weight.
pub fn chain_sem(n: usize, weight: f64, m: usize, seed: u64) -> DataMatrix {
    let topo: Vec<usize> = (0..n).collect();
    let edges: Vec<(usize, usize, f64)> = (1..n).map(|i| (i, i - 1, weight)).collect();
    linear_sem(n, &topo, &edges, m, seed)
}

/// Reorder the rows of `data` so that new row `i` is old row `perm[i]`.
pub fn permute_rows(data: &DataMatrix, perm: &[usize]) -> DataMatrix {
    let rows: Vec<Vec<f64>> = perm.iter().map(|&p| data.row(p).to_vec()).collect();
    DataMatrix::from_rows(rows).expect("permutation of a valid matrix")
}

// ---------------------------------------------------------------------------
// Structural checks
// ---------------------------------------------------------------------------

/// Assert that `ordering` is a permutation of `0..n`.
pub fn assert_permutation(ordering: &CausalOrdering, n: usize) {
    let mut seen = vec![false; n];
    assert_eq!(ordering.len(), n);
    for &v in ordering.as_slice() {
        assert!(v < n, "index {v} out of range");
        assert!(!seen[v], "index {v} repeated");
        seen[v] = true;
    }
}

/// Assert that every nonzero `B[i][j]` has `j` before `i` in `ordering`.
pub fn assert_respects_ordering(adjacency: &AdjacencyMatrix, ordering: &CausalOrdering) {
    for (child, parent, w) in adjacency.edges() {
        assert!(
            ordering.precedes(parent, child),
            "edge {parent} -> {child} ({w}) contradicts ordering {:?}",
            ordering.as_slice()
        );
    }
    for i in 0..adjacency.dim() {
        assert_eq!(adjacency.get(i, i), 0.0, "diagonal entry {i} must be zero");
    }
}
