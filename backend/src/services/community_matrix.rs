//! Community matrix service.

use crate::analysis::{build_matrix, export, AnalysisResult};
use crate::db::AnalyticsRepository;
use crate::routes::matrix::{CommunityMatrix, MatrixOptions};

/// Reads the occurrence join for `options.unit` and builds the matrix.
pub async fn build_community_matrix<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    options: MatrixOptions,
) -> AnalysisResult<CommunityMatrix> {
    let tuples = repo.fetch_occurrences(options.unit).await?;
    let matrix = build_matrix(&tuples, options);
    log::debug!(
        "Built {} matrix: {} rows x {} species from {} tuples",
        options.unit,
        matrix.n_rows(),
        matrix.n_cols(),
        tuples.len()
    );
    if matrix.is_empty() {
        log::warn!("Community matrix for unit {} is empty", options.unit);
    }
    Ok(matrix)
}

/// The matrix of [`build_community_matrix`] as a UTF-8 CSV document.
pub async fn community_matrix_csv<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    options: MatrixOptions,
) -> AnalysisResult<Vec<u8>> {
    let matrix = build_community_matrix(repo, options).await?;
    Ok(export::matrix_csv_bytes(&matrix)?)
}
