//! Edge weight estimator.
//!
//! Given a causal ordering, regresses each variable on every variable placed
//! before it and records the coefficients as row `v` of the adjacency matrix
//! `B`. Because the candidate parent set of a variable is exactly its
//! ordering prefix, `B` is strictly lower-triangular under the ordering.
//!
//! # Least squares
//!
//! The default fit is ordinary least squares with an intercept, computed as
//! a modified Gram-Schmidt QR of the centred parent matrix followed by back
//! substitution. A parent whose orthogonal remainder is numerically zero
//! makes the design rank-deficient; that is reported as
//! [`LingamError::RankDeficiency`] unless
//! [`ridge_fallback`](crate::config::LingamConfig::ridge_fallback) is set,
//! in which case the fit is redone as ridge regression
//! `(X^T X + alpha m I) beta = X^T y` via Cholesky.

use tracing::{debug, instrument, warn};

use crate::config::LingamConfig;
use crate::error::LingamError;
use crate::kernels::{axpy, center_in_place, dot};
use crate::types::{AdjacencyMatrix, CausalOrdering, DataMatrix};
use crate::validation::{validate_data_matrix, validate_ordering};

/// Estimate the weighted adjacency matrix for `data` under `ordering`.
///
/// # Errors
///
/// * [`LingamError::InvalidInput`] -- invalid data, config, or an ordering
///   whose length differs from the variable count.
/// * [`LingamError::RankDeficiency`] -- some parent set is collinear and no
///   ridge fallback is configured.
///
/// # Example
///
/// ```rust
/// use ruvector_lingam::config::LingamConfig;
/// use ruvector_lingam::estimator::estimate_weights;
/// use ruvector_lingam::types::{CausalOrdering, DataMatrix};
///
/// let x: Vec<f64> = (0..50).map(|k| (k as f64 * 0.7).sin()).collect();
/// let y: Vec<f64> = x.iter().enumerate().map(|(k, v)| 3.0 * v + 0.01 * (k % 3) as f64).collect();
/// let data = DataMatrix::from_rows(vec![x, y]).unwrap();
/// let ordering = CausalOrdering::new(vec![0, 1]).unwrap();
///
/// let b = estimate_weights(&data, &ordering, &LingamConfig::default()).unwrap();
/// assert!((b.get(1, 0) - 3.0).abs() < 0.05);
/// assert_eq!(b.get(0, 1), 0.0);
/// ```
#[instrument(skip_all, fields(ridge = config.ridge_fallback.is_some()))]
pub fn estimate_weights(
    data: &DataMatrix,
    ordering: &CausalOrdering,
    config: &LingamConfig,
) -> Result<AdjacencyMatrix, LingamError> {
    validate_data_matrix(data)?;
    config.validate()?;
    WeightEstimator::new(config).estimate(data, ordering)
}

/// Least-squares estimator bound to one configuration.
pub struct WeightEstimator<'a> {
    config: &'a LingamConfig,
}

impl<'a> WeightEstimator<'a> {
    /// Create an estimator. The config is assumed to be validated.
    pub fn new(config: &'a LingamConfig) -> Self {
        Self { config }
    }

    /// Estimate `B` for already-validated data.
    ///
    /// # Errors
    ///
    /// See [`estimate_weights`].
    pub fn estimate(
        &self,
        data: &DataMatrix,
        ordering: &CausalOrdering,
    ) -> Result<AdjacencyMatrix, LingamError> {
        self.estimate_with(data, ordering, |_, _| {})
    }

    /// Estimate `B`, calling `on_fallback(variable, alpha)` whenever a
    /// rank-deficient fit is redone with the ridge penalty.
    ///
    /// # Errors
    ///
    /// See [`estimate_weights`].
    #[instrument(
        skip(self, data, ordering, on_fallback),
        fields(n = data.variables(), m = data.samples())
    )]
    pub fn estimate_with<F>(
        &self,
        data: &DataMatrix,
        ordering: &CausalOrdering,
        mut on_fallback: F,
    ) -> Result<AdjacencyMatrix, LingamError>
    where
        F: FnMut(usize, f64),
    {
        validate_ordering(ordering, data.variables())?;
        let mut b = AdjacencyMatrix::zeros(data.variables());

        for (k, &v) in ordering.as_slice().iter().enumerate().skip(1) {
            let parents = ordering.prefix(k);
            let design: Vec<&[f64]> = parents.iter().map(|&u| data.row(u)).collect();

            let coefficients = match ols(data.row(v), &design, self.config.rank_tolerance) {
                Ok(beta) => beta,
                Err(collinear) => match self.config.ridge_fallback {
                    Some(alpha) => {
                        warn!(
                            variable = v,
                            collinear_parent = parents[collinear],
                            alpha,
                            "rank-deficient parents, refitting with ridge penalty"
                        );
                        on_fallback(v, alpha);
                        ridge(data.row(v), &design, alpha).ok_or_else(|| {
                            LingamError::RankDeficiency {
                                variable: v,
                                parents: parents.to_vec(),
                            }
                        })?
                    }
                    None => {
                        return Err(LingamError::RankDeficiency {
                            variable: v,
                            parents: parents.to_vec(),
                        })
                    }
                },
            };

            for (&u, &w) in parents.iter().zip(&coefficients) {
                b.set(v, u, w);
            }
            debug!(variable = v, parents = parents.len(), "regression fitted");
        }

        Ok(b)
    }
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// Ordinary least squares of `target` on `parents` with an intercept.
///
/// Returns the slope coefficients in `parents` order, or `Err(j)` when parent
/// `j` is (numerically) a linear combination of parents `0..j`.
pub(crate) fn ols(
    target: &[f64],
    parents: &[&[f64]],
    rank_tolerance: f64,
) -> Result<Vec<f64>, usize> {
    let p = parents.len();
    let mut q: Vec<Vec<f64>> = Vec::with_capacity(p);
    // Upper-triangular R, row-major p x p.
    let mut r = vec![0.0f64; p * p];

    for (j, column) in parents.iter().enumerate() {
        let mut v = column.to_vec();
        center_in_place(&mut v);
        let original_sq = dot(&v, &v);

        for (i, qi) in q.iter().enumerate() {
            let rij = dot(qi, &v);
            r[i * p + j] = rij;
            axpy(-rij, qi, &mut v);
        }

        let remainder_sq = dot(&v, &v);
        if !(remainder_sq > rank_tolerance * original_sq) || remainder_sq == 0.0 {
            return Err(j);
        }
        let norm = remainder_sq.sqrt();
        r[j * p + j] = norm;
        for x in v.iter_mut() {
            *x /= norm;
        }
        q.push(v);
    }

    // c = Q^T y, applied one column at a time.
    let mut y = target.to_vec();
    center_in_place(&mut y);
    let mut c = vec![0.0f64; p];
    for (i, qi) in q.iter().enumerate() {
        c[i] = dot(qi, &y);
        axpy(-c[i], qi, &mut y);
    }

    // R beta = c
    let mut beta = vec![0.0f64; p];
    for j in (0..p).rev() {
        let tail: f64 = ((j + 1)..p).map(|k| r[j * p + k] * beta[k]).sum();
        beta[j] = (c[j] - tail) / r[j * p + j];
    }
    Ok(beta)
}

/// Ridge regression `(X^T X + alpha m I) beta = X^T y` on centred data.
///
/// Returns `None` only if the Cholesky factorisation breaks down, which a
/// positive `alpha` rules out for finite input.
pub(crate) fn ridge(target: &[f64], parents: &[&[f64]], alpha: f64) -> Option<Vec<f64>> {
    let p = parents.len();
    let m = target.len() as f64;

    let centred: Vec<Vec<f64>> = parents
        .iter()
        .map(|col| {
            let mut v = col.to_vec();
            center_in_place(&mut v);
            v
        })
        .collect();
    let mut y = target.to_vec();
    center_in_place(&mut y);

    // Gram matrix with the penalty on the diagonal.
    let mut g = vec![0.0f64; p * p];
    for i in 0..p {
        for j in 0..=i {
            let v = dot(&centred[i], &centred[j]);
            g[i * p + j] = v;
            g[j * p + i] = v;
        }
        g[i * p + i] += alpha * m;
    }
    let rhs: Vec<f64> = centred.iter().map(|c| dot(c, &y)).collect();

    // In-place Cholesky: lower triangle of g becomes L.
    for j in 0..p {
        let mut d = g[j * p + j];
        for k in 0..j {
            d -= g[j * p + k] * g[j * p + k];
        }
        if !(d > 0.0) {
            return None;
        }
        let l_jj = d.sqrt();
        g[j * p + j] = l_jj;
        for i in (j + 1)..p {
            let mut s = g[i * p + j];
            for k in 0..j {
                s -= g[i * p + k] * g[j * p + k];
            }
            g[i * p + j] = s / l_jj;
        }
    }

    // L z = rhs, then L^T beta = z.
    let mut z = vec![0.0f64; p];
    for i in 0..p {
        let s: f64 = (0..i).map(|k| g[i * p + k] * z[k]).sum();
        z[i] = (rhs[i] - s) / g[i * p + i];
    }
    let mut beta = vec![0.0f64; p];
    for i in (0..p).rev() {
        let s: f64 = ((i + 1)..p).map(|k| g[k * p + i] * beta[k]).sum();
        beta[i] = (z[i] - s) / g[i * p + i];
    }
    Some(beta)
}
