use serde::{Deserialize, Serialize};

use crate::models::{AggregationUnit, AnalysisVariable};
use crate::routes::statistics::{CorrelationResult, CorrelationStrength, RegressionResult};

/// Analysis variables of every unit row, vegetation and diversity joined
/// on row label. `None` marks a missing measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    pub unit: AggregationUnit,
    pub variables: Vec<AnalysisVariable>,
    pub rows: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl VariableTable {
    /// Column of `variable` with missing values as `NaN`.
    pub fn series(&self, variable: AnalysisVariable) -> Vec<f64> {
        match self.variables.iter().position(|v| *v == variable) {
            Some(col) => self
                .values
                .iter()
                .map(|row| row.get(col).copied().flatten().unwrap_or(f64::NAN))
                .collect(),
            None => vec![f64::NAN; self.rows.len()],
        }
    }
}

/// Two aligned variable columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedSeries {
    pub x_variable: AnalysisVariable,
    pub y_variable: AnalysisVariable,
    pub labels: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Correlation between two analysis variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableCorrelation {
    pub unit: AggregationUnit,
    pub x_variable: AnalysisVariable,
    pub y_variable: AnalysisVariable,
    #[serde(flatten)]
    pub result: CorrelationResult,
    pub strength: Option<CorrelationStrength>,
}

/// Regression of one analysis variable on another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableRegression {
    pub unit: AggregationUnit,
    pub x_variable: AnalysisVariable,
    pub y_variable: AnalysisVariable,
    pub result: RegressionResult,
}

pub const GET_VARIABLE_CORRELATION: &str = "/v1/variables/correlation";
pub const GET_VARIABLE_REGRESSION: &str = "/v1/variables/regression";
