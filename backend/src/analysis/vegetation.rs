//! Vegetation matrix construction.
//!
//! Rows keep the order in which the record store returned them. Several
//! records under one row are combined column by column: numeric columns
//! are averaged over the records that measured them, text columns take
//! the first recorded value.

use crate::models::{AggregationUnit, MissingValue, VegetationField, VegetationObservation};
use crate::routes::vegetation::{VegetationMatrix, VegetationValue};

pub fn build_vegetation_matrix(
    observations: &[VegetationObservation],
    unit: AggregationUnit,
    missing_value: MissingValue,
) -> VegetationMatrix {
    let columns = VegetationField::columns_for(unit).to_vec();

    let mut rows: Vec<String> = Vec::new();
    let mut members: Vec<Vec<&VegetationObservation>> = Vec::new();
    for obs in observations {
        match rows.iter().position(|r| *r == obs.label) {
            Some(i) => members[i].push(obs),
            None => {
                rows.push(obs.label.clone());
                members.push(vec![obs]);
            }
        }
    }

    let values = members
        .iter()
        .map(|group| {
            columns
                .iter()
                .map(|field| combine(group, *field))
                .collect()
        })
        .collect();

    VegetationMatrix {
        unit,
        missing_value,
        rows,
        columns,
        values,
    }
}

fn combine(group: &[&VegetationObservation], field: VegetationField) -> Option<VegetationValue> {
    let measured = group.iter().filter_map(|obs| obs.measurements.as_ref());
    if field.is_numeric() {
        let (sum, n) = measured
            .filter_map(|m| m.numeric(field))
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| VegetationValue::Number(sum / n as f64))
    } else {
        measured
            .filter_map(|m| m.text(field))
            .next()
            .map(|s| VegetationValue::Text(s.to_string()))
    }
}
