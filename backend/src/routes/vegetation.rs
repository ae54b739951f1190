use serde::{Deserialize, Serialize};

use crate::models::{AggregationUnit, MissingValue, VegetationField};
use crate::routes::matrix::MatrixCell;

/// A combined vegetation measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VegetationValue {
    Number(f64),
    Text(String),
}

/// Unit × vegetation-field table. `None` cells had no measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationMatrix {
    pub unit: AggregationUnit,
    pub missing_value: MissingValue,
    pub rows: Vec<String>,
    pub columns: Vec<VegetationField>,
    pub values: Vec<Vec<Option<VegetationValue>>>,
}

impl VegetationMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r == label)
    }

    /// Numeric value of `field` for the row labelled `label`.
    pub fn numeric(&self, label: &str, field: VegetationField) -> Option<f64> {
        let row = self.row_index(label)?;
        let col = self.columns.iter().position(|c| *c == field)?;
        match self.values.get(row)?.get(col)? {
            Some(VegetationValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// Display form of one cell; absent measurements take the missing token.
    pub fn cell(&self, row: usize, col: usize) -> Option<MatrixCell> {
        let value = self.values.get(row)?.get(col)?;
        Some(match value {
            Some(VegetationValue::Number(v)) => MatrixCell::Number(*v),
            Some(VegetationValue::Text(s)) => MatrixCell::Text(s.clone()),
            None => MatrixCell::missing(self.missing_value),
        })
    }

    pub fn display_rows(&self) -> Vec<Vec<MatrixCell>> {
        (0..self.n_rows())
            .map(|r| {
                (0..self.columns.len())
                    .filter_map(|c| self.cell(r, c))
                    .collect()
            })
            .collect()
    }
}

pub const GET_VEGETATION: &str = "/v1/vegetation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_lookup_and_display() {
        let m = VegetationMatrix {
            unit: AggregationUnit::Site,
            missing_value: MissingValue::Na,
            rows: vec!["North".into()],
            columns: vec![VegetationField::CanopyCoverage, VegetationField::SoilMoisture],
            values: vec![vec![Some(VegetationValue::Number(72.5)), None]],
        };
        assert_eq!(m.numeric("North", VegetationField::CanopyCoverage), Some(72.5));
        assert_eq!(m.numeric("North", VegetationField::SoilMoisture), None);
        assert_eq!(m.numeric("South", VegetationField::CanopyCoverage), None);
        assert_eq!(m.numeric("North", VegetationField::LightCondition), None);
        assert_eq!(m.cell(0, 1), Some(MatrixCell::Text("NA".into())));
    }
}
