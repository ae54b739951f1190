//! Correlation and polynomial regression over paired numeric samples.
//!
//! Both operations drop every index where either value is NaN and require
//! at least [`MIN_PAIRED_SAMPLES`] remaining pairs. Too few pairs is a
//! structured result, not an error. Regression has no other failure path:
//! collinear designs get the minimum-norm least-squares fit.

use crate::analysis::diversity::round4;
use crate::analysis::distribution::{round_half_even, student_t_two_tailed};
use crate::analysis::{AnalysisError, AnalysisResult};
use crate::models::{CorrelationMethod, RegressionDegree};
use crate::routes::statistics::{
    CorrelationResult, RegressionFit, RegressionResult, INSUFFICIENT_DATA, MIN_PAIRED_SAMPLES,
};

/// Number of points in a regression prediction curve.
pub const PREDICTION_POINTS: usize = 100;

const SIGNIFICANCE_LEVEL: f64 = 0.05;
const RESIDUAL_EPSILON: f64 = 1e-12;
/// Relative singular value below which a design direction is treated as null.
const RANK_TOLERANCE: f64 = 1e-10;
const JACOBI_MAX_SWEEPS: usize = 60;

/// Correlation coefficient of `x` and `y` with its two-tailed p-value.
pub fn correlate(x: &[f64], y: &[f64], method: CorrelationMethod) -> AnalysisResult<CorrelationResult> {
    let (xs, ys) = paired(x, y)?;
    let n = xs.len();
    if n < MIN_PAIRED_SAMPLES {
        return Ok(CorrelationResult::failed(method, n, INSUFFICIENT_DATA));
    }

    let r = match method {
        CorrelationMethod::Pearson => pearson(&xs, &ys),
        CorrelationMethod::Spearman => pearson(&average_ranks(&xs), &average_ranks(&ys)),
    };
    let Some(r) = r else {
        return Ok(CorrelationResult::failed(
            method,
            n,
            "Constant input: correlation is undefined",
        ));
    };

    let p = correlation_p_value(r, n);
    Ok(CorrelationResult {
        method,
        correlation: Some(round4(r)),
        p_value: Some(round6(p)),
        n,
        significant: p < SIGNIFICANCE_LEVEL,
        error: None,
    })
}

/// Least-squares polynomial fit of `y` on `x`.
pub fn regress(x: &[f64], y: &[f64], degree: RegressionDegree) -> AnalysisResult<RegressionResult> {
    let (xs, ys) = paired(x, y)?;
    let n = xs.len();
    if n < MIN_PAIRED_SAMPLES {
        return Ok(RegressionResult::failed(n, INSUFFICIENT_DATA));
    }

    let power = degree.power();
    let (intercept, coefficients) = least_squares_polynomial(&xs, &ys, power);
    let mut polynomial = Vec::with_capacity(power + 1);
    polynomial.push(intercept);
    polynomial.extend_from_slice(&coefficients);

    let fitted: Vec<f64> = xs.iter().map(|x| horner(&polynomial, *x)).collect();
    let r2 = coefficient_of_determination(&ys, &fitted);

    let (min_x, max_x) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let x_pred = linspace(min_x, max_x, PREDICTION_POINTS);
    let y_pred = x_pred.iter().map(|x| horner(&polynomial, *x)).collect();

    Ok(RegressionResult::Fitted(RegressionFit {
        coefficients,
        intercept,
        r2: round4(r2),
        n,
        x_pred,
        y_pred,
        degree: power as u8,
    }))
}

/// Pairs that are complete in both series.
fn paired(x: &[f64], y: &[f64]) -> AnalysisResult<(Vec<f64>, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(AnalysisError::invalid_argument(format!(
            "x and y must have the same length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    Ok(x.iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip())
}

/// Pearson product-moment coefficient; `None` when either series is constant.
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// 1-based ranks; tied values share the mean of the ranks they span.
pub fn average_ranks(data: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|a, b| data[*a].total_cmp(&data[*b]));

    let mut ranks = vec![0.0; data.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && data[order[j]] == data[order[i]] {
            j += 1;
        }
        let rank = (i + j + 1) as f64 / 2.0;
        for idx in &order[i..j] {
            ranks[*idx] = rank;
        }
        i = j;
    }
    ranks
}

/// Two-tailed p-value of `r` from the t statistic with `n - 2` degrees of freedom.
fn correlation_p_value(r: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    let residual = 1.0 - r * r;
    if residual <= 0.0 {
        return 0.0;
    }
    let t = r * (df / residual).sqrt();
    student_t_two_tailed(t, df)
}

/// Ordinary least squares of `y` on the columns `x^1..=x^power` plus an
/// intercept.
///
/// Columns and `y` are centered, so the intercept is recovered from the
/// means. Rank-deficient designs (repeated or constant `x`, fewer points
/// than coefficients) get the minimum-norm solution: directions whose
/// singular value falls below [`RANK_TOLERANCE`] of the largest one are
/// dropped.
fn least_squares_polynomial(xs: &[f64], ys: &[f64], power: usize) -> (f64, Vec<f64>) {
    let n = xs.len() as f64;
    let mean_y = ys.iter().sum::<f64>() / n;
    let centered_y: Vec<f64> = ys.iter().map(|y| y - mean_y).collect();

    let mut column_means = Vec::with_capacity(power);
    let mut columns = Vec::with_capacity(power);
    for k in 1..=power {
        let column: Vec<f64> = xs.iter().map(|x| x.powi(k as i32)).collect();
        let mean = column.iter().sum::<f64>() / n;
        columns.push(column.iter().map(|v| v - mean).collect::<Vec<f64>>());
        column_means.push(mean);
    }

    let (scaled_u, v) = one_sided_jacobi(columns);
    let sigma: Vec<f64> = scaled_u.iter().map(|u| dot(u, u).sqrt()).collect();
    let sigma_max = sigma.iter().copied().fold(0.0_f64, f64::max);

    let mut coefficients = vec![0.0; power];
    for (i, (u, s)) in scaled_u.iter().zip(&sigma).enumerate() {
        if sigma_max == 0.0 || *s <= sigma_max * RANK_TOLERANCE {
            continue;
        }
        // u holds sigma * u_i, so (u . y) / sigma^2 = (u_i . y) / sigma.
        let weight = dot(u, &centered_y) / (s * s);
        for (c, v_row) in coefficients.iter_mut().zip(&v) {
            *c += weight * v_row[i];
        }
    }

    let intercept = mean_y
        - coefficients
            .iter()
            .zip(&column_means)
            .map(|(c, m)| c * m)
            .sum::<f64>();
    (intercept, coefficients)
}

/// One-sided Jacobi SVD of a matrix given as columns.
///
/// Returns `A V` (columns are `sigma_i * u_i`) and `V` as a row-major
/// square matrix.
fn one_sided_jacobi(mut columns: Vec<Vec<f64>>) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let p = columns.len();
    let mut v: Vec<Vec<f64>> = (0..p)
        .map(|i| (0..p).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..JACOBI_MAX_SWEEPS {
        let mut rotated = false;
        for i in 0..p {
            for j in (i + 1)..p {
                let alpha = dot(&columns[i], &columns[i]);
                let beta = dot(&columns[j], &columns[j]);
                let gamma = dot(&columns[i], &columns[j]);
                if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                let (left, right) = columns.split_at_mut(j);
                for (a, b) in left[i].iter_mut().zip(right[0].iter_mut()) {
                    let (ai, bj) = (*a, *b);
                    *a = c * ai - s * bj;
                    *b = s * ai + c * bj;
                }
                for row in v.iter_mut() {
                    let (ai, bj) = (row[i], row[j]);
                    row[i] = c * ai - s * bj;
                    row[j] = s * ai + c * bj;
                }
            }
        }
        if !rotated {
            break;
        }
    }
    (columns, v)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Evaluates `Σ c_k x^k` for coefficients in increasing power order.
fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn coefficient_of_determination(observed: &[f64], fitted: &[f64]) -> f64 {
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res <= RESIDUAL_EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    let step = (stop - start) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            if i == points - 1 {
                stop
            } else {
                start + step * i as f64
            }
        })
        .collect()
}

fn round6(value: f64) -> f64 {
    round_half_even(value, 6)
}

#[cfg(test)]
#[path = "statistics_tests.rs"]
mod tests;
