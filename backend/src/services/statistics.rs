//! Correlation and regression over caller-supplied vectors.
//!
//! Absent values (`None`) become `NaN` and are masked pairwise by the
//! engine.

use crate::analysis::{self, AnalysisResult};
use crate::models::{CorrelationMethod, RegressionDegree};
use crate::routes::statistics::{CorrelationResult, RegressionResult};

/// Converts optional measurements to the engine's `NaN`-masked form.
pub fn to_series(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

pub fn correlate(
    x: &[Option<f64>],
    y: &[Option<f64>],
    method: CorrelationMethod,
) -> AnalysisResult<CorrelationResult> {
    let result = analysis::correlate(&to_series(x), &to_series(y), method)?;
    match &result.error {
        Some(error) => log::warn!("{} correlation not computed: {}", method, error),
        None => log::debug!(
            "{} correlation over {} pairs: r={:?}, p={:?}",
            method,
            result.n,
            result.correlation,
            result.p_value
        ),
    }
    Ok(result)
}

pub fn regress(
    x: &[Option<f64>],
    y: &[Option<f64>],
    degree: RegressionDegree,
) -> AnalysisResult<RegressionResult> {
    let result = analysis::regress(&to_series(x), &to_series(y), degree)?;
    match &result {
        RegressionResult::Failed(failure) => {
            log::warn!("Degree {} regression not fitted: {}", degree, failure.error)
        }
        RegressionResult::Fitted(fit) => {
            log::debug!("Degree {} regression over {} points: r2={}", degree, fit.n, fit.r2)
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_values_are_masked() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)];
        let y = [Some(2.0), Some(100.0), Some(4.0), Some(6.0), Some(8.0)];
        let result = correlate(&x, &y, CorrelationMethod::Pearson).unwrap();
        assert_eq!(result.n, 4);
        assert!((result.correlation.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_is_invalid_argument() {
        let err = regress(&[Some(1.0)], &[], RegressionDegree::Linear).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
