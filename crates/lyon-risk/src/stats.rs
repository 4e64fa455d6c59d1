//! Sample statistics over aligned return vectors.
//!
//! Every function returns `None` instead of a meaningless number when the
//! input is too short or has no dispersion.

use ndarray::{Array1, ArrayView1};

/// Sample standard deviation (n − 1 denominator).
pub fn sample_std(x: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() < 2 {
        return None;
    }
    Some(x.std(1.0))
}

/// Pearson correlation of two equal-length vectors.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let dx = centered(x)?;
    let dy = centered(y)?;
    let sxx = dx.dot(&dx);
    let syy = dy.dot(&dy);
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(dx.dot(&dy) / (sxx * syy).sqrt())
}

/// Least-squares fit of `y = alpha + beta * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Intercept, in the units of `y`
    pub alpha: f64,
    /// Slope
    pub beta: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

/// Ordinary least squares of `y` on `x` with an intercept.
///
/// `None` when the lengths differ, fewer than two points are given, or `x`
/// is constant. R² is NaN for a constant `y`.
pub fn ols(y: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = x.mean()?;
    let my = y.mean()?;
    let dx = centered(x)?;
    let dy = centered(y)?;

    let sxx = dx.dot(&dx);
    if sxx == 0.0 {
        return None;
    }
    let beta = dx.dot(&dy) / sxx;
    let alpha = my - beta * mx;

    let residuals = &dy - &(&dx * beta);
    let ss_res = residuals.dot(&residuals);
    let ss_tot = dy.dot(&dy);
    let r_squared = if ss_tot == 0.0 { f64::NAN } else { 1.0 - ss_res / ss_tot };

    Some(LinearFit {
        alpha,
        beta,
        r_squared,
    })
}

fn centered(x: ArrayView1<'_, f64>) -> Option<Array1<f64>> {
    let m = x.mean()?;
    Some(x.mapv(|v| v - m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn test_sample_std() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(sample_std(x.view()).unwrap(), 2.5_f64.sqrt(), epsilon = 1e-12);
        assert!(sample_std(array![1.0].view()).is_none());
    }

    #[test]
    fn test_pearson_sign() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let up = array![2.0, 4.0, 6.0, 8.0];
        let down = array![8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(pearson(x.view(), up.view()).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(x.view(), down.view()).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_none() {
        let x = array![1.0, 1.0, 1.0];
        let y = array![1.0, 2.0, 3.0];
        assert!(pearson(x.view(), y.view()).is_none());
    }

    #[test]
    fn test_ols_exact_line() {
        let x = array![-0.01, 0.0, 0.02, 0.005, -0.003];
        let y = x.mapv(|v| 0.001 + 1.5 * v);
        let fit = ols(y.view(), x.view()).unwrap();
        assert_relative_eq!(fit.alpha, 0.001, epsilon = 1e-12);
        assert_relative_eq!(fit.beta, 1.5, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ols_constant_regressor() {
        let x = array![0.01, 0.01, 0.01];
        let y = array![0.0, 0.01, 0.02];
        assert!(ols(y.view(), x.view()).is_none());
    }

    #[test]
    fn test_ols_constant_response() {
        let x = array![-0.01, 0.0, 0.02, 0.005];
        let y = array![0.25, 0.25, 0.25, 0.25];
        let fit = ols(y.view(), x.view()).unwrap();
        assert_eq!(fit.beta, 0.0);
        assert_eq!(fit.alpha, 0.25);
        assert!(fit.r_squared.is_nan());
        assert!(pearson(y.view(), x.view()).is_none());
    }

    #[test]
    fn test_r_squared_is_squared_correlation() {
        let mut rng = StdRng::seed_from_u64(7);
        let x: Array1<f64> = (0..250).map(|_| rng.gen_range(-0.02..0.02)).collect();
        let y: Array1<f64> = x.mapv(|v| 0.8 * v) + (0..250).map(|_| rng.gen_range(-0.01..0.01)).collect::<Array1<f64>>();

        let fit = ols(y.view(), x.view()).unwrap();
        let rho = pearson(x.view(), y.view()).unwrap();
        assert_relative_eq!(fit.r_squared, rho * rho, epsilon = 1e-10);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }
}
