//! Closed-form simple linear regression.
//!
//! Given paired samples `(x_i, y_i)` this computes:
//!
//! ```text
//! slope     = Sxy / Sxx
//! intercept = ȳ - slope · x̄
//! r         = Sxy / sqrt(Sxx · Syy)
//! t         = r · sqrt(df / ((1 - r)(1 + r))),  df = n - 2
//! p         = 2 · P(T_df > |t|)
//! std_err   = sqrt((1 - r²) · Syy / Sxx / df)
//! ```
//!
//! Degenerate inputs follow the usual conventions of statistical packages:
//! - constant `y` (Syy = 0) gives `slope = 0`, `r = 0`
//! - `n == 2` gives `p = 0` (or `p = 1` if both `y` are equal) and `std_err = 0`

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Guards `1 ± r` against exact zero when the fit is perfect.
const TINY: f64 = 1e-20;

/// Output of [`linregress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub p_value: f64,
    pub std_err: f64,
}

/// Fit `y = intercept + slope · x` by ordinary least squares.
///
/// Returns `None` when fewer than two points are given, the slices differ in
/// length, `x` has no spread, or an input is not finite.
pub fn linregress(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }

    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return None;
    }

    // Sums run on values scaled into [-1, 1] so squares cannot overflow.
    let x_scale = max_abs(x);
    let y_scale = max_abs(y);
    if x_scale == 0.0 {
        return None;
    }
    // A constant y must give an exactly flat line, which rounding in the mean
    // would otherwise spoil.
    let y_constant = y.iter().all(|&v| v == y[0]);
    let y_scale = if y_scale == 0.0 { 1.0 } else { y_scale };

    let xs: Vec<f64> = x.iter().map(|&v| v / x_scale).collect();
    let ys: Vec<f64> = y.iter().map(|&v| v / y_scale).collect();

    let nf = n as f64;
    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in xs.iter().zip(&ys) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx <= 0.0 {
        return None;
    }

    let (slope, r_value) = if y_constant || syy == 0.0 {
        (0.0, 0.0)
    } else {
        let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
        (sxy / sxx, r)
    };
    let intercept = if y_constant { y[0] } else { (y_mean - slope * x_mean) * y_scale };

    let (p_value, std_err) = if n == 2 {
        (if y[0] == y[1] { 1.0 } else { 0.0 }, 0.0)
    } else {
        let df = nf - 2.0;
        let t = r_value * (df / ((1.0 - r_value + TINY) * (1.0 + r_value + TINY))).sqrt();
        let p = two_sided_p(t, df);
        let se = ((1.0 - r_value * r_value).max(0.0) * syy / sxx / df).sqrt();
        (p, se * (y_scale / x_scale))
    };
    let slope = slope * (y_scale / x_scale);

    Some(LinearFit {
        slope,
        intercept,
        r_value,
        p_value,
        std_err,
    })
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

fn two_sided_p(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn exact_line_has_unit_r_and_zero_p() {
        let x = index(5);
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();
        let fit = linregress(&x, &y).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!((fit.r_value - 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-9);
        assert!(fit.std_err.abs() < 1e-9);
    }

    #[test]
    fn noisy_line_matches_reference_values() {
        // x = 0..5, y = [1, 3, 2, 5, 4, 6]: Sxx = Syy = 17.5, Sxy = 15.5
        let x = index(6);
        let y = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let fit = linregress(&x, &y).unwrap();
        assert!((fit.slope - 15.5 / 17.5).abs() < 1e-12);
        assert!((fit.intercept - (3.5 - 2.5 * 15.5 / 17.5)).abs() < 1e-12);
        assert!((fit.r_value - 15.5 / 17.5).abs() < 1e-12);
        // t = 3.8158 with 4 degrees of freedom.
        assert!((fit.p_value - 0.018_845_481).abs() < 1e-6);
        assert!((fit.std_err - 0.232_115_383).abs() < 1e-8);
    }

    #[test]
    fn constant_series_is_flat_and_insignificant() {
        let x = index(4);
        let y = [0.1, 0.1, 0.1, 0.1];
        let fit = linregress(&x, &y).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_value, 0.0);
        assert_eq!(fit.intercept, 0.1);
        assert!((fit.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_points_follow_degenerate_convention() {
        let fit = linregress(&[0.0, 1.0], &[1.0, 4.0]).unwrap();
        assert_eq!(fit.slope, 3.0);
        assert_eq!(fit.p_value, 0.0);
        assert_eq!(fit.std_err, 0.0);

        let flat = linregress(&[0.0, 1.0], &[2.0, 2.0]).unwrap();
        assert_eq!(flat.p_value, 1.0);
    }

    #[test]
    fn too_few_points_or_no_x_spread() {
        assert!(linregress(&[0.0], &[1.0]).is_none());
        assert!(linregress(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(linregress(&[0.0, 1.0], &[1.0]).is_none());
        assert!(linregress(&[0.0, 1.0], &[1.0, f64::INFINITY]).is_none());
    }

    #[test]
    fn huge_magnitudes_keep_a_perfect_fit() {
        let x = index(4);
        let y = [1e160, 2e160, 3e160, 4e160];
        let fit = linregress(&x, &y).unwrap();
        assert!((fit.r_value - 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-9);
        assert!((fit.slope / 1e160 - 1.0).abs() < 1e-12);
        assert!((fit.intercept / 1e160 - 1.0).abs() < 1e-12);

        let near_max = linregress(&index(3), &[1.5e308, 1.6e308, 1.7e308]).unwrap();
        assert!((near_max.r_value - 1.0).abs() < 1e-12);
        assert!((near_max.slope / 1e307 - 1.0).abs() < 1e-9);
        assert!((near_max.intercept / 1.5e308 - 1.0).abs() < 1e-9);
        assert!(near_max.std_err.is_finite());
    }
}
