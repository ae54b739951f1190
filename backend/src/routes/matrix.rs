use serde::{Deserialize, Serialize};

use crate::models::{Aggregation, AggregationUnit, MissingValue, ValueType};

// =========================================================
// Community matrix types + routes
// =========================================================

/// Parameters of a community matrix build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    pub unit: AggregationUnit,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub missing_value: MissingValue,
}

impl MatrixOptions {
    /// Sum of raw counts with zeros shown as `0`.
    pub fn new(unit: AggregationUnit) -> Self {
        Self {
            unit,
            aggregation: Aggregation::default(),
            value_type: ValueType::default(),
            missing_value: MissingValue::default(),
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_missing_value(mut self, missing_value: MissingValue) -> Self {
        self.missing_value = missing_value;
        self
    }
}

/// A displayed matrix cell: a number, or the token substituted for zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixCell {
    Number(f64),
    Text(String),
}

impl MatrixCell {
    /// The cell shown in place of an exact zero (or an absent measurement).
    pub fn missing(token: MissingValue) -> Self {
        match token {
            MissingValue::Zero => MatrixCell::Number(0.0),
            other => MatrixCell::Text(other.as_str().to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MatrixCell::Number(v) => Some(*v),
            MatrixCell::Text(_) => None,
        }
    }
}

impl std::fmt::Display for MatrixCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixCell::Number(v) => write!(f, "{}", v),
            MatrixCell::Text(s) => f.write_str(s),
        }
    }
}

/// Dense unit × species matrix.
///
/// `values` holds the numeric cells after aggregation and the value-type
/// transform; every cell is defined. The missing-value token is applied
/// only by [`CommunityMatrix::cell`] and [`CommunityMatrix::display_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityMatrix {
    pub options: MatrixOptions,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CommunityMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r == label)
    }

    pub fn column_index(&self, species: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == species)
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row_sum(&self, row: usize) -> f64 {
        self.values.get(row).map(|r| r.iter().sum()).unwrap_or(0.0)
    }

    /// Display form of one cell.
    pub fn cell(&self, row: usize, col: usize) -> Option<MatrixCell> {
        self.value(row, col).map(|v| {
            if v == 0.0 {
                MatrixCell::missing(self.options.missing_value)
            } else {
                MatrixCell::Number(v)
            }
        })
    }

    /// Display form of every row, in row order.
    pub fn display_rows(&self) -> Vec<Vec<MatrixCell>> {
        (0..self.n_rows())
            .map(|r| {
                (0..self.n_cols())
                    .filter_map(|c| self.cell(r, c))
                    .collect()
            })
            .collect()
    }
}

pub const GET_MATRIX: &str = "/v1/matrix";
pub const GET_MATRIX_CSV: &str = "/v1/matrix.csv";
