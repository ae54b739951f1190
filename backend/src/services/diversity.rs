//! Diversity index service.
//!
//! Indices are always computed from the raw summed counts, whatever
//! options the caller uses to display the community matrix.

use crate::analysis::{compute_diversity, export, AnalysisResult};
use crate::db::AnalyticsRepository;
use crate::models::{Aggregation, AggregationUnit, ValueType};
use crate::routes::diversity::DiversityRecord;
use crate::routes::matrix::MatrixOptions;
use crate::services::community_matrix::build_community_matrix;

/// Options of the count matrix the indices are computed from.
pub fn diversity_matrix_options(unit: AggregationUnit) -> MatrixOptions {
    MatrixOptions::new(unit)
        .with_aggregation(Aggregation::Sum)
        .with_value_type(ValueType::Count)
}

/// One diversity record per row of the unit's count matrix, in row order.
pub async fn diversity_records<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
) -> AnalysisResult<Vec<DiversityRecord>> {
    let matrix = build_community_matrix(repo, diversity_matrix_options(unit)).await?;
    let records = compute_diversity(&matrix);
    let empty_rows = records.iter().filter(|r| r.total_individuals == 0).count();
    log::debug!(
        "Computed diversity for {} rows of unit {} ({} without individuals)",
        records.len(),
        unit,
        empty_rows
    );
    Ok(records)
}

pub async fn diversity_csv<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
) -> AnalysisResult<Vec<u8>> {
    let records = diversity_records(repo, unit).await?;
    let mut buffer = Vec::new();
    export::write_diversity_csv(&records, unit.as_str(), &mut buffer)?;
    Ok(buffer)
}
