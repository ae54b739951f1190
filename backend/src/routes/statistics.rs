use serde::{Deserialize, Serialize};

use crate::models::CorrelationMethod;

// =========================================================
// Correlation / regression types + routes
// =========================================================

/// Minimum number of complete pairs for correlation or regression.
pub const MIN_PAIRED_SAMPLES: usize = 3;

pub const INSUFFICIENT_DATA: &str = "Insufficient data (n < 3)";

/// Qualitative size of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn classify(r: f64) -> Self {
        let r = r.abs();
        if r > 0.7 {
            CorrelationStrength::Strong
        } else if r > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

/// Outcome of a correlation test.
///
/// When `error` is set the coefficient and p-value are `None` and
/// `significant` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub method: CorrelationMethod,
    pub correlation: Option<f64>,
    pub p_value: Option<f64>,
    pub n: usize,
    pub significant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CorrelationResult {
    pub fn failed(method: CorrelationMethod, n: usize, error: impl Into<String>) -> Self {
        Self {
            method,
            correlation: None,
            p_value: None,
            n,
            significant: false,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn strength(&self) -> Option<CorrelationStrength> {
        self.correlation.map(CorrelationStrength::classify)
    }
}

/// A fitted polynomial and its plotting curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    /// Coefficients of x^1..=x^degree.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub r2: f64,
    pub n: usize,
    pub x_pred: Vec<f64>,
    pub y_pred: Vec<f64>,
    pub degree: u8,
}

impl RegressionFit {
    /// Evaluates the fitted polynomial at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| (acc + c) * x)
            + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFailure {
    pub error: String,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegressionResult {
    Fitted(RegressionFit),
    Failed(RegressionFailure),
}

impl RegressionResult {
    pub fn failed(n: usize, error: impl Into<String>) -> Self {
        RegressionResult::Failed(RegressionFailure {
            error: error.into(),
            n,
        })
    }

    pub fn n(&self) -> usize {
        match self {
            RegressionResult::Fitted(fit) => fit.n,
            RegressionResult::Failed(failure) => failure.n,
        }
    }

    pub fn fit(&self) -> Option<&RegressionFit> {
        match self {
            RegressionResult::Fitted(fit) => Some(fit),
            RegressionResult::Failed(_) => None,
        }
    }
}

pub const POST_CORRELATION: &str = "/v1/statistics/correlation";
pub const POST_REGRESSION: &str = "/v1/statistics/regression";
