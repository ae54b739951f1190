//! Vegetation matrix service.

use crate::analysis::{build_vegetation_matrix, export, AnalysisResult};
use crate::db::AnalyticsRepository;
use crate::models::{AggregationUnit, MissingValue};
use crate::routes::vegetation::VegetationMatrix;

pub async fn vegetation_matrix<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
    missing_value: MissingValue,
) -> AnalysisResult<VegetationMatrix> {
    let observations = repo.fetch_vegetation(unit).await?;
    let matrix = build_vegetation_matrix(&observations, unit, missing_value);
    log::debug!(
        "Built {} vegetation matrix: {} rows from {} observations",
        unit,
        matrix.n_rows(),
        observations.len()
    );
    Ok(matrix)
}

pub async fn vegetation_csv<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
    missing_value: MissingValue,
) -> AnalysisResult<Vec<u8>> {
    let matrix = vegetation_matrix(repo, unit, missing_value).await?;
    let mut buffer = Vec::new();
    export::write_vegetation_csv(&matrix, &mut buffer)?;
    Ok(buffer)
}
