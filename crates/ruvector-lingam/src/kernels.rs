//! Dense `f64` slice kernels.
//!
//! Every moment, regression, and residualisation in the crate reduces to the
//! handful of loops below. They accumulate in `f64` and never allocate unless
//! the name says so.

/// Dot product `a . b`.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dot: length mismatch");
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

/// Arithmetic mean. Returns `0.0` for an empty slice.
#[inline]
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Population variance (divides by `n`).
///
/// Two-pass so that a large common offset does not swamp the result.
pub fn variance(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let mu = mean(x);
    x.iter().map(|&v| (v - mu) * (v - mu)).sum::<f64>() / x.len() as f64
}

/// Mean of squares `E[x^2]`, the scale reference for degeneracy checks.
#[inline]
pub fn mean_square(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    dot(x, x) / x.len() as f64
}

/// Variance below which two-pass [`variance`] cannot separate signal from
/// the rounding of the mean: `(m * eps)^2 * E[x^2]`.
pub fn variance_resolution(x: &[f64]) -> f64 {
    let m = x.len() as f64;
    (m * f64::EPSILON).powi(2) * mean_square(x)
}

/// `true` when every element equals the first.
pub fn is_constant(x: &[f64]) -> bool {
    x.split_first()
        .map_or(true, |(&first, rest)| rest.iter().all(|&v| v == first))
}

/// Population covariance of two equally long slices.
pub fn covariance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "covariance: length mismatch");
    if a.is_empty() {
        return 0.0;
    }
    let (ma, mb) = (mean(a), mean(b));
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / a.len() as f64
}

/// Subtract the mean in place; returns the mean that was removed.
pub fn center_in_place(x: &mut [f64]) -> f64 {
    let mu = mean(x);
    for v in x.iter_mut() {
        *v -= mu;
    }
    mu
}

/// Standardised copy: zero mean, unit population variance.
///
/// Returns `None` when the variance is not strictly positive.
pub fn standardize(x: &[f64]) -> Option<Vec<f64>> {
    let mu = mean(x);
    let var = variance(x);
    if !(var > 0.0) || !var.is_finite() {
        return None;
    }
    let inv_sd = 1.0 / var.sqrt();
    Some(x.iter().map(|&v| (v - mu) * inv_sd).collect())
}

/// `y += alpha * x`.
#[inline]
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len(), "axpy: length mismatch");
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Residual of `target` after ordinary least squares on `predictor` (with
/// intercept): `target - cov(target, predictor) / var(predictor) * predictor`.
///
/// The intercept term is dropped, so the residual keeps `target`'s mean
/// offset; every consumer standardises or centres before use. Returns `None`
/// when `predictor` has no variance.
pub fn regress_out(target: &[f64], predictor: &[f64]) -> Option<Vec<f64>> {
    let var = variance(predictor);
    if !(var > 0.0) {
        return None;
    }
    let beta = covariance(target, predictor) / var;
    let mut out = target.to_vec();
    axpy(-beta, predictor, &mut out);
    Some(out)
}
