//! Independence/ordering engine (DirectLiNGAM causal ordering).
//!
//! Discovers a causal ordering one variable at a time. Each iteration:
//!
//! 1. standardises every not-yet-placed residual column, failing on
//!    degenerate variance;
//! 2. evaluates both directed likelihood ratios `R(i -> j)`, `R(j -> i)` of
//!    every unordered pair with the configured [`MeasureKind`];
//! 3. scores each candidate by `M_i = sum_j min(0, R(i -> j))^2`, the
//!    squared evidence against `i` being upstream of `j`;
//! 4. places `argmin M_i` (ties go to the lowest original index);
//! 5. regresses the placed variable out of every remaining column.
//!
//! # Parallelism
//!
//! Step 2 is the only parallel section. Pairs are mapped on a run-scoped
//! rayon pool of `workers` threads and collected in pair order; step 3 then
//! reduces sequentially. The output is therefore bit-identical for every
//! worker count.
//!
//! # Complexity
//!
//! `O(n^3 m)` for `n` variables and `m` samples: `n` iterations, `O(n^2)`
//! pairs each, `O(m)` per pair.

use std::time::Instant;

use tracing::{debug, info, instrument, trace};

use crate::budget::BudgetEnforcer;
use crate::config::LingamConfig;
use crate::error::LingamError;
use crate::kernels::{is_constant, regress_out, standardize, variance, variance_resolution};
use crate::measure::{MeasureKind, PairwiseMeasure};
use crate::types::{CausalOrdering, DataMatrix, OrderingOutcome, PlacementScore};
use crate::validation::validate_data_matrix;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Discover the causal ordering of the variables in `data`.
///
/// # Errors
///
/// * [`LingamError::InvalidInput`] -- fewer than 2 variables or samples,
///   non-finite values, or an invalid `config`.
/// * [`LingamError::NumericalDegeneracy`] -- a remaining column has
///   (numerically) zero variance at some iteration.
/// * [`LingamError::BudgetExhausted`] -- the configured budget ran out
///   between iterations.
///
/// # Example
///
/// ```rust
/// use ruvector_lingam::config::LingamConfig;
/// use ruvector_lingam::ordering::discover_ordering;
/// use ruvector_lingam::types::DataMatrix;
///
/// // x1 drives x0 (x0 = 2 * x1 + skewed noise).
/// let x1: Vec<f64> = (0..200).map(|k| ((k * 37 % 101) as f64 / 101.0).powi(3)).collect();
/// let e: Vec<f64> = (0..200).map(|k| ((k * 53 % 97) as f64 / 97.0).powi(3)).collect();
/// let x0: Vec<f64> = x1.iter().zip(&e).map(|(a, b)| 2.0 * a + b).collect();
///
/// let data = DataMatrix::from_rows(vec![x0, x1]).unwrap();
/// let ordering = discover_ordering(&data, &LingamConfig::default()).unwrap();
/// assert_eq!(ordering.len(), 2);
/// ```
#[instrument(skip_all, fields(workers = config.workers))]
pub fn discover_ordering(
    data: &DataMatrix,
    config: &LingamConfig,
) -> Result<CausalOrdering, LingamError> {
    validate_data_matrix(data)?;
    let engine = OrderingEngine::new(config)?;
    Ok(engine.run(data)?.ordering)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Ordering engine bound to one configuration.
///
/// Owns the thread pool for pairwise scoring, so the pool lives exactly as
/// long as the engine. Build one per run.
pub struct OrderingEngine<'a> {
    config: &'a LingamConfig,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl<'a> OrderingEngine<'a> {
    /// Validate `config` and build the worker pool when `workers > 1`.
    ///
    /// # Errors
    ///
    /// [`LingamError::InvalidInput`] for an invalid config and
    /// [`LingamError::BackendError`] if the pool cannot be built.
    pub fn new(config: &'a LingamConfig) -> Result<Self, LingamError> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = if config.workers > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.workers)
                    .thread_name(|i| format!("lingam-worker-{i}"))
                    .build()
                    .map_err(|e| LingamError::BackendError(e.to_string()))?,
            )
        } else {
            None
        };

        #[cfg(not(feature = "parallel"))]
        if config.workers > 1 {
            debug!(
                workers = config.workers,
                "parallel feature disabled, scoring pairs sequentially"
            );
        }

        Ok(Self {
            config,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    /// Run ordering discovery on already-validated data.
    ///
    /// # Errors
    ///
    /// See [`discover_ordering`].
    pub fn run(&self, data: &DataMatrix) -> Result<OrderingOutcome, LingamError> {
        self.run_with(data, |_, _| {})
    }

    /// Run ordering discovery, calling `on_place(position, score)` after each
    /// variable is placed.
    ///
    /// # Errors
    ///
    /// See [`discover_ordering`].
    #[instrument(
        skip(self, data, on_place),
        fields(n = data.variables(), m = data.samples(), measure = %self.config.measure)
    )]
    pub fn run_with<F>(
        &self,
        data: &DataMatrix,
        mut on_place: F,
    ) -> Result<OrderingOutcome, LingamError>
    where
        F: FnMut(usize, PlacementScore),
    {
        let start = Instant::now();
        let n = data.variables();
        let tol = self.config.degeneracy_tolerance;

        // Working copy; only rows listed in `remaining` are live.
        let mut residuals: Vec<Vec<f64>> = data.rows().map(<[f64]>::to_vec).collect();
        // Iteration 0 only rejects constant columns, so an offset never
        // matters. Later iterations compare against the original variance,
        // which catches collinearity.
        let mut floors: Vec<f64> = residuals.iter().map(|r| variance_resolution(r)).collect();
        let original_var: Vec<f64> = residuals.iter().map(|r| variance(r)).collect();

        let mut remaining: Vec<usize> = (0..n).collect();
        let mut order = Vec::with_capacity(n);
        let mut scores = Vec::with_capacity(n);
        let mut budget = BudgetEnforcer::new(self.config.budget.clone());

        for iteration in 0..n {
            budget.admit(iteration, n)?;

            let standardized = remaining
                .iter()
                .map(|&v| {
                    let var = variance(&residuals[v]);
                    let constant = iteration == 0 && is_constant(&residuals[v]);
                    if constant || !(var > floors[v]) {
                        return Err(LingamError::NumericalDegeneracy {
                            variable: v,
                            iteration,
                            variance: var,
                        });
                    }
                    standardize(&residuals[v]).ok_or(LingamError::NumericalDegeneracy {
                        variable: v,
                        iteration,
                        variance: var,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let (pick, score) = if remaining.len() == 1 {
                (0, 0.0)
            } else {
                self.select_exogenous(&remaining, &standardized, iteration)?
            };

            let placed = remaining.remove(pick);
            let placement = PlacementScore {
                variable: placed,
                score,
            };
            debug!(iteration, variable = placed, score, "placed variable");
            order.push(placed);
            scores.push(placement);
            on_place(iteration, placement);

            if iteration == 0 {
                for (floor, &var) in floors.iter_mut().zip(&original_var) {
                    *floor = tol * var;
                }
            }

            // Remove the placed variable's linear influence from the rest.
            let placed_col = std::mem::take(&mut residuals[placed]);
            for &k in &remaining {
                residuals[k] = regress_out(&residuals[k], &placed_col).ok_or(
                    LingamError::NumericalDegeneracy {
                        variable: placed,
                        iteration,
                        variance: 0.0,
                    },
                )?;
            }
        }

        info!(
            order = ?order,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "causal ordering discovered"
        );

        let ordering = CausalOrdering::new(order)?;
        Ok(OrderingOutcome { ordering, scores })
    }

    /// Score every remaining candidate and return `(index into remaining,
    /// penalty)` of the most exogenous one.
    fn select_exogenous(
        &self,
        remaining: &[usize],
        standardized: &[Vec<f64>],
        iteration: usize,
    ) -> Result<(usize, f64), LingamError> {
        let measure: MeasureKind = self.config.measure;
        let tol = self.config.degeneracy_tolerance;
        let k = remaining.len();

        let stats: Vec<f64> = standardized.iter().map(|x| measure.marginal(x)).collect();

        let pairs: Vec<(usize, usize)> = (0..k)
            .flat_map(|a| ((a + 1)..k).map(move |b| (a, b)))
            .collect();

        let ratios = self.map_pairs(&pairs, |&(a, b)| {
            measure
                .pair_ratios(&standardized[a], &standardized[b], stats[a], stats[b], tol)
                .map_err(|degenerate| LingamError::NumericalDegeneracy {
                    variable: remaining[b],
                    iteration,
                    variance: degenerate.variance,
                })
        });

        // Sequential, pair-ordered reduction: identical for any worker count.
        let mut penalty = vec![0.0f64; k];
        for (&(a, b), ratio) in pairs.iter().zip(ratios) {
            let (r_ab, r_ba) = ratio?;
            penalty[a] += r_ab.min(0.0).powi(2);
            penalty[b] += r_ba.min(0.0).powi(2);
        }

        let mut best = 0;
        for (idx, &p) in penalty.iter().enumerate() {
            trace!(iteration, variable = remaining[idx], penalty = p, "candidate score");
            if p < penalty[best] {
                best = idx;
            }
        }
        Ok((best, penalty[best]))
    }

    /// Evaluate `f` on every pair, on the worker pool when one exists.
    /// Results are returned in `pairs` order.
    fn map_pairs<T, F>(&self, pairs: &[(usize, usize)], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&(usize, usize)) -> T + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            use rayon::prelude::*;
            return pool.install(|| pairs.par_iter().map(&f).collect());
        }
        pairs.iter().map(f).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn laplace(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| {
                let u: f64 = rng.gen_range(-0.5..0.5);
                -u.signum() * (1.0 - 2.0 * u.abs()).ln()
            })
            .collect()
    }

    #[test]
    fn two_variable_chain_is_ordered() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = laplace(&mut rng, 2000);
        let e = laplace(&mut rng, 2000);
        let b: Vec<f64> = a.iter().zip(&e).map(|(x, y)| 1.5 * x + y).collect();

        // Put the effect first so the answer is not the identity.
        let data = DataMatrix::from_rows(vec![b, a]).unwrap();
        let ordering = discover_ordering(&data, &LingamConfig::default()).unwrap();
        assert_eq!(ordering.as_slice(), &[1, 0]);
    }

    #[test]
    fn ties_break_on_lowest_index() {
        // Exactly uncorrelated, identically distributed columns: every pair
        // ratio is exactly zero, so both candidates score 0.
        let x: Vec<f64> = (0..400).map(|k| if k % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let y: Vec<f64> = (0..400).map(|k| if k % 4 < 2 { 1.0 } else { -1.0 }).collect();

        for kind in [MeasureKind::Entropy, MeasureKind::Kurtosis] {
            let config = LingamConfig {
                measure: kind,
                ..Default::default()
            };
            let xy = DataMatrix::from_rows(vec![x.clone(), y.clone()]).unwrap();
            let yx = DataMatrix::from_rows(vec![y.clone(), x.clone()]).unwrap();
            assert_eq!(discover_ordering(&xy, &config).unwrap().as_slice(), &[0, 1]);
            assert_eq!(discover_ordering(&yx, &config).unwrap().as_slice(), &[0, 1]);
        }
    }

    #[test]
    fn constant_column_is_degenerate() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = DataMatrix::from_rows(vec![laplace(&mut rng, 300), vec![4.2; 300]]).unwrap();
        match discover_ordering(&data, &LingamConfig::default()) {
            Err(LingamError::NumericalDegeneracy {
                variable,
                iteration,
                ..
            }) => {
                assert_eq!(variable, 1);
                assert_eq!(iteration, 0);
            }
            other => panic!("expected NumericalDegeneracy, got {other:?}"),
        }
    }

    #[test]
    fn scores_are_reported_per_step() {
        let mut rng = StdRng::seed_from_u64(5);
        let rows = vec![
            laplace(&mut rng, 500),
            laplace(&mut rng, 500),
            laplace(&mut rng, 500),
        ];
        let data = DataMatrix::from_rows(rows).unwrap();
        let config = LingamConfig::default();
        let engine = OrderingEngine::new(&config).unwrap();

        let mut seen = Vec::new();
        let outcome = engine
            .run_with(&data, |pos, score| seen.push((pos, score.variable)))
            .unwrap();

        assert_eq!(outcome.scores.len(), 3);
        assert_eq!(outcome.scores[2].score, 0.0);
        let placed: Vec<usize> = outcome.scores.iter().map(|s| s.variable).collect();
        assert_eq!(placed, outcome.ordering.as_slice());
        assert_eq!(seen, vec![(0, placed[0]), (1, placed[1]), (2, placed[2])]);
        assert!(outcome.scores.iter().all(|s| s.score >= 0.0));
    }

    #[test]
    fn rejects_invalid_config() {
        let data = DataMatrix::from_rows(vec![vec![1.0, 2.0, 0.5], vec![0.0, 1.0, 3.0]]).unwrap();
        let config = LingamConfig::with_workers(0);
        assert!(matches!(
            discover_ordering(&data, &config),
            Err(LingamError::InvalidInput(_))
        ));
    }
}
