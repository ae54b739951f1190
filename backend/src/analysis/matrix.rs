//! Community matrix construction.
//!
//! Occurrence tuples are grouped by `(row label, species)`, aggregated, laid
//! out on a dense rows × species grid with zero fill, then transformed to
//! the requested value type. Rows and columns are sorted lexicographically.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Aggregation, OccurrenceTuple, ValueType};
use crate::routes::matrix::{CommunityMatrix, MatrixOptions};

/// Builds a community matrix from the occurrence join of `options.unit`.
///
/// Every label in `tuples` becomes a row, including units whose tuples carry
/// no species. An absent count is a zero occurrence.
pub fn build_matrix(tuples: &[OccurrenceTuple], options: MatrixOptions) -> CommunityMatrix {
    let rows: BTreeSet<&str> = tuples.iter().map(|t| t.label.as_str()).collect();
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for tuple in tuples {
        if let Some(species) = tuple.species.as_deref() {
            groups
                .entry((tuple.label.as_str(), species))
                .or_default()
                .push(tuple.count.unwrap_or(0) as f64);
        }
    }
    let columns: BTreeSet<&str> = groups.keys().map(|(_, species)| *species).collect();

    let row_index: BTreeMap<&str, usize> = rows.iter().enumerate().map(|(i, r)| (*r, i)).collect();
    let col_index: BTreeMap<&str, usize> =
        columns.iter().enumerate().map(|(i, c)| (*c, i)).collect();

    let mut values = vec![vec![0.0; columns.len()]; rows.len()];
    for ((label, species), counts) in &groups {
        values[row_index[label]][col_index[species]] = aggregate(options.aggregation, counts);
    }

    apply_value_type(&mut values, options.value_type);

    CommunityMatrix {
        options,
        rows: rows.into_iter().map(str::to_string).collect(),
        columns: columns.into_iter().map(str::to_string).collect(),
        values,
    }
}

fn aggregate(aggregation: Aggregation, counts: &[f64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    match aggregation {
        Aggregation::Sum => counts.iter().sum(),
        Aggregation::Mean => counts.iter().sum::<f64>() / counts.len() as f64,
        Aggregation::Max => counts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

fn apply_value_type(values: &mut [Vec<f64>], value_type: ValueType) {
    let n_rows = values.len() as f64;
    let scale = match value_type {
        ValueType::Count => return,
        ValueType::Presence => 1.0,
        ValueType::Frequency => 100.0 / n_rows,
    };
    for cell in values.iter_mut().flatten() {
        *cell = if *cell > 0.0 { scale } else { 0.0 };
    }
}
