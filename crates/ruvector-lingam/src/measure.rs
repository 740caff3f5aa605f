//! Pairwise non-Gaussianity measures for causal direction.
//!
//! A [`PairwiseMeasure`] turns two standardised variables into an
//! approximate log-likelihood ratio `R(i -> j)` of the model "`i` causes `j`"
//! against "`j` causes `i`" under a linear non-Gaussian model. Positive values
//! favour `i -> j`. The ordering engine only depends on this sign convention.
//!
//! The set of measures is closed and selected through [`MeasureKind`]:
//!
//! | Kind | Statistic |
//! |------|-----------|
//! | [`MeasureKind::Entropy`] | `H(x_j) + H(r_i|j) - H(x_i) - H(r_j|i)` with the maximum-entropy approximation of `H` |
//! | [`MeasureKind::Kurtosis`] | `sign(kurt(x_i)) * rho * E[x_i^3 x_j - x_i x_j^3]` |
//!
//! Both follow Hyvarinen & Smith, "Pairwise likelihood ratios for estimation
//! of non-Gaussian structural equation models" (JMLR 2013).

use serde::{Deserialize, Serialize};

use crate::kernels::{dot, mean_square};

// ---------------------------------------------------------------------------
// Entropy approximation constants
// ---------------------------------------------------------------------------

/// Weight of the `log cosh` (even) contrast.
const K1: f64 = 79.047;

/// Weight of the `u exp(-u^2/2)` (odd) contrast.
const K2: f64 = 7.4129;

/// `E[log cosh(nu)]` for a standard Gaussian `nu`.
const GAMMA: f64 = 0.37457;

/// Differential entropy of a standard Gaussian, `(1 + ln 2pi) / 2`.
const GAUSSIAN_ENTROPY: f64 = 1.418_938_533_204_672_7;

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// A residual whose variance collapsed, i.e. the pair is (numerically)
/// perfectly collinear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateResidual {
    /// Variance of the standardised residual (`1 - rho^2`).
    pub variance: f64,
}

/// Pairwise direction statistic on standardised data.
///
/// Implementations must be pure: the same inputs always produce the same
/// output, whichever thread evaluates them.
pub trait PairwiseMeasure: Send + Sync {
    /// Per-variable statistic, computed once per ordering iteration and fed
    /// back into every [`likelihood_ratio`](Self::likelihood_ratio) call that
    /// involves the variable.
    fn marginal(&self, x: &[f64]) -> f64;

    /// Approximate log-likelihood ratio of `i -> j` versus `j -> i`.
    ///
    /// `xi` and `xj` must be standardised (zero mean, unit population
    /// variance). `stat_i`/`stat_j` are their [`marginal`](Self::marginal)
    /// values.
    ///
    /// # Errors
    ///
    /// [`DegenerateResidual`] when `1 - rho^2 <= tolerance`.
    fn likelihood_ratio(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        stat_j: f64,
        tolerance: f64,
    ) -> Result<f64, DegenerateResidual>;

    /// Both directed ratios `(R(i -> j), R(j -> i))` of one pair.
    ///
    /// # Errors
    ///
    /// [`DegenerateResidual`] when the pair is collinear.
    fn pair_ratios(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        stat_j: f64,
        tolerance: f64,
    ) -> Result<(f64, f64), DegenerateResidual> {
        Ok((
            self.likelihood_ratio(xi, xj, stat_i, stat_j, tolerance)?,
            self.likelihood_ratio(xj, xi, stat_j, stat_i, tolerance)?,
        ))
    }
}

/// Selects the independence measure used by the ordering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    /// Entropy-based likelihood ratio (robust default).
    #[default]
    Entropy,
    /// Fourth-cumulant likelihood ratio (cheaper, assumes a common sign of
    /// excess kurtosis across variables).
    Kurtosis,
}

impl std::fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasureKind::Entropy => write!(f, "entropy"),
            MeasureKind::Kurtosis => write!(f, "kurtosis"),
        }
    }
}

impl PairwiseMeasure for MeasureKind {
    fn marginal(&self, x: &[f64]) -> f64 {
        match self {
            MeasureKind::Entropy => EntropyMeasure.marginal(x),
            MeasureKind::Kurtosis => KurtosisMeasure.marginal(x),
        }
    }

    fn likelihood_ratio(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        stat_j: f64,
        tolerance: f64,
    ) -> Result<f64, DegenerateResidual> {
        match self {
            MeasureKind::Entropy => {
                EntropyMeasure.likelihood_ratio(xi, xj, stat_i, stat_j, tolerance)
            }
            MeasureKind::Kurtosis => {
                KurtosisMeasure.likelihood_ratio(xi, xj, stat_i, stat_j, tolerance)
            }
        }
    }

    fn pair_ratios(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        stat_j: f64,
        tolerance: f64,
    ) -> Result<(f64, f64), DegenerateResidual> {
        match self {
            MeasureKind::Entropy => EntropyMeasure.pair_ratios(xi, xj, stat_i, stat_j, tolerance),
            MeasureKind::Kurtosis => {
                KurtosisMeasure.pair_ratios(xi, xj, stat_i, stat_j, tolerance)
            }
        }
    }
}

/// Correlation of two standardised vectors and the residual variance
/// `1 - rho^2`, failing when the pair is collinear.
#[inline]
fn correlation(xi: &[f64], xj: &[f64], tolerance: f64) -> Result<f64, DegenerateResidual> {
    let rho = dot(xi, xj) / xi.len() as f64;
    let residual_var = 1.0 - rho * rho;
    if !(residual_var > tolerance) {
        return Err(DegenerateResidual {
            variance: residual_var,
        });
    }
    Ok(rho)
}

// ---------------------------------------------------------------------------
// Entropy measure
// ---------------------------------------------------------------------------

/// Maximum-entropy approximation of differential entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyMeasure;

/// Numerically stable `ln cosh(u)`.
#[inline]
fn log_cosh(u: f64) -> f64 {
    let a = u.abs();
    a + (-2.0 * a).exp().ln_1p() - std::f64::consts::LN_2
}

/// Approximate differential entropy of a standardised sample.
pub fn entropy(u: &[f64]) -> f64 {
    let m = u.len() as f64;
    let (mut even, mut odd) = (0.0f64, 0.0f64);
    for &v in u {
        even += log_cosh(v);
        odd += v * (-0.5 * v * v).exp();
    }
    even /= m;
    odd /= m;
    GAUSSIAN_ENTROPY - K1 * (even - GAMMA).powi(2) - K2 * odd * odd
}

/// Entropy of the standardised residual of `a` regressed on `b`, both
/// standardised, with correlation `rho`.
fn residual_entropy(a: &[f64], b: &[f64], rho: f64) -> f64 {
    let inv_sd = 1.0 / (1.0 - rho * rho).sqrt();
    let m = a.len() as f64;
    let (mut even, mut odd) = (0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let r = (x - rho * y) * inv_sd;
        even += log_cosh(r);
        odd += r * (-0.5 * r * r).exp();
    }
    even /= m;
    odd /= m;
    GAUSSIAN_ENTROPY - K1 * (even - GAMMA).powi(2) - K2 * odd * odd
}

impl PairwiseMeasure for EntropyMeasure {
    fn marginal(&self, x: &[f64]) -> f64 {
        entropy(x)
    }

    fn likelihood_ratio(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        stat_j: f64,
        tolerance: f64,
    ) -> Result<f64, DegenerateResidual> {
        let rho = correlation(xi, xj, tolerance)?;
        let h_ri_j = residual_entropy(xi, xj, rho);
        let h_rj_i = residual_entropy(xj, xi, rho);
        Ok((stat_j + h_ri_j) - (stat_i + h_rj_i))
    }

    // The entropy ratio is exactly antisymmetric, so one evaluation serves
    // both directions.
    fn pair_ratios(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        stat_j: f64,
        tolerance: f64,
    ) -> Result<(f64, f64), DegenerateResidual> {
        let r = self.likelihood_ratio(xi, xj, stat_i, stat_j, tolerance)?;
        Ok((r, -r))
    }
}

// ---------------------------------------------------------------------------
// Kurtosis measure
// ---------------------------------------------------------------------------

/// Fourth-cumulant approximation of the likelihood ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct KurtosisMeasure;

/// Excess kurtosis `E[x^4] - 3` of a standardised sample.
pub fn excess_kurtosis(x: &[f64]) -> f64 {
    let m = x.len() as f64;
    let var = mean_square(x);
    if !(var > 0.0) {
        return 0.0;
    }
    x.iter().map(|&v| v.powi(4)).sum::<f64>() / m / (var * var) - 3.0
}

impl PairwiseMeasure for KurtosisMeasure {
    fn marginal(&self, x: &[f64]) -> f64 {
        excess_kurtosis(x)
    }

    fn likelihood_ratio(
        &self,
        xi: &[f64],
        xj: &[f64],
        stat_i: f64,
        _stat_j: f64,
        tolerance: f64,
    ) -> Result<f64, DegenerateResidual> {
        let rho = correlation(xi, xj, tolerance)?;
        let m = xi.len() as f64;
        let cross = xi
            .iter()
            .zip(xj)
            .map(|(&x, &y)| x * x * x * y - x * y * y * y)
            .sum::<f64>()
            / m;
        Ok(stat_i.signum() * rho * cross)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::standardize;
    use approx::assert_relative_eq;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn laplace_sample(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| {
                let u: f64 = rng.gen_range(-0.5..0.5);
                -u.signum() * (1.0 - 2.0 * u.abs()).ln()
            })
            .collect()
    }

    fn chain(n: usize) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(42);
        let x = laplace_sample(&mut rng, n);
        let e = laplace_sample(&mut rng, n);
        let y: Vec<f64> = x.iter().zip(&e).map(|(a, b)| 0.8 * a + b).collect();
        (standardize(&x).unwrap(), standardize(&y).unwrap())
    }

    #[test]
    fn log_cosh_matches_naive_for_moderate_inputs() {
        for &u in &[-3.0, -0.5, 0.0, 0.25, 2.0] {
            assert_relative_eq!(log_cosh(u), u.cosh().ln(), epsilon = 1e-12);
        }
        assert!(log_cosh(800.0).is_finite());
    }

    #[test]
    fn uniform_sample_entropy_below_gaussian_bound() {
        let u: Vec<f64> = (0..4000).map(|k| (k as f64 + 0.5) / 4000.0 - 0.5).collect();
        let z = standardize(&u).unwrap();
        assert!(entropy(&z) < GAUSSIAN_ENTROPY);
    }

    #[test]
    fn entropy_ratio_is_antisymmetric() {
        let (x, y) = chain(3000);
        let m = EntropyMeasure;
        let (hx, hy) = (m.marginal(&x), m.marginal(&y));
        let xy = m.likelihood_ratio(&x, &y, hx, hy, 1e-10).unwrap();
        let yx = m.likelihood_ratio(&y, &x, hy, hx, 1e-10).unwrap();
        assert_relative_eq!(xy, -yx, epsilon = 1e-9);
    }

    #[test]
    fn entropy_ratio_favours_true_direction() {
        let (x, y) = chain(5000);
        let m = MeasureKind::Entropy;
        let r = m
            .likelihood_ratio(&x, &y, m.marginal(&x), m.marginal(&y), 1e-10)
            .unwrap();
        assert!(r > 0.0, "expected x -> y, got R = {r}");
    }

    #[test]
    fn kurtosis_ratio_favours_true_direction() {
        let (x, y) = chain(5000);
        let m = MeasureKind::Kurtosis;
        let r = m
            .likelihood_ratio(&x, &y, m.marginal(&x), m.marginal(&y), 1e-10)
            .unwrap();
        assert!(r > 0.0, "expected x -> y, got R = {r}");
    }

    #[test]
    fn laplace_has_positive_excess_kurtosis() {
        let mut rng = StdRng::seed_from_u64(7);
        let z = standardize(&laplace_sample(&mut rng, 10_000)).unwrap();
        assert!(excess_kurtosis(&z) > 1.0);
    }

    #[test]
    fn collinear_pair_is_degenerate() {
        let (x, _) = chain(500);
        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        for kind in [MeasureKind::Entropy, MeasureKind::Kurtosis] {
            let err = kind.likelihood_ratio(&x, &neg, 0.0, 0.0, 1e-10).unwrap_err();
            assert!(err.variance <= 1e-10, "{kind}: {err:?}");
        }
    }

    #[test]
    fn measure_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&MeasureKind::Kurtosis).unwrap(),
            "\"kurtosis\""
        );
        let parsed: MeasureKind = serde_json::from_str("\"entropy\"").unwrap();
        assert_eq!(parsed, MeasureKind::Entropy);
        assert_eq!(MeasureKind::default(), MeasureKind::Entropy);
    }
}
