//! HTTP handlers for the REST API.
//!
//! Each handler parses its options, delegates to [`crate::services`] and
//! serializes the result.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{
    wants_csv, CommunityMatrixResponse, CorrelationRequest, DiversityQuery, HealthResponse,
    MatrixQuery,
    RegressionRequest, VariablePairQuery, VegetationQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    CorrelationResult, DiversityRecord, RegressionResult, SpeciesId,
    SpeciesStatistics, VariableCorrelation, VariableRegression, VegetationMatrix,
};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Matrices
// =============================================================================

/// GET /v1/matrix
///
/// Zero cells are rendered with the requested `missingValue` token.
pub async fn get_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> HandlerResult<CommunityMatrixResponse> {
    let options = query.options()?;
    let matrix = services::build_community_matrix(state.repository.as_ref(), options).await?;
    Ok(Json(matrix.into()))
}

/// GET /v1/matrix.csv
pub async fn get_matrix_csv(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> Result<Response, AppError> {
    let options = query.options()?;
    let body = services::community_matrix_csv(state.repository.as_ref(), options).await?;
    Ok(csv_response(
        &format!("community_matrix_{}.csv", options.unit),
        body,
    ))
}

/// GET /v1/vegetation
///
/// JSON by default; `format=csv` downloads the table.
pub async fn get_vegetation(
    State(state): State<AppState>,
    Query(query): Query<VegetationQuery>,
) -> Result<Response, AppError> {
    let unit = query.unit()?;
    let missing_value = query.missing_value()?;
    let repo = state.repository.as_ref();

    if wants_csv(query.format.as_deref()) {
        let body = services::vegetation_csv(repo, unit, missing_value).await?;
        return Ok(csv_response(&format!("vegetation_{}.csv", unit), body));
    }
    let matrix: VegetationMatrix = services::vegetation_matrix(repo, unit, missing_value).await?;
    Ok(Json(matrix).into_response())
}

/// GET /v1/diversity
pub async fn get_diversity(
    State(state): State<AppState>,
    Query(query): Query<DiversityQuery>,
) -> Result<Response, AppError> {
    let unit = query.unit()?;
    let repo = state.repository.as_ref();

    if wants_csv(query.format.as_deref()) {
        let body = services::diversity_csv(repo, unit).await?;
        return Ok(csv_response(&format!("diversity_{}.csv", unit), body));
    }
    let records: Vec<DiversityRecord> = services::diversity_records(repo, unit).await?;
    Ok(Json(records).into_response())
}

// =============================================================================
// Statistics
// =============================================================================

/// POST /v1/statistics/correlation
pub async fn post_correlation(
    Json(request): Json<CorrelationRequest>,
) -> HandlerResult<CorrelationResult> {
    let method = request.method()?;
    Ok(Json(services::correlate(&request.x, &request.y, method)?))
}

/// POST /v1/statistics/regression
pub async fn post_regression(
    Json(request): Json<RegressionRequest>,
) -> HandlerResult<RegressionResult> {
    let degree = request.degree()?;
    Ok(Json(services::regress(&request.x, &request.y, degree)?))
}

/// GET /v1/variables/correlation?unit=site&x=canopy_coverage&y=species_richness
pub async fn get_variable_correlation(
    State(state): State<AppState>,
    Query(query): Query<VariablePairQuery>,
) -> HandlerResult<VariableCorrelation> {
    let unit = query.unit()?;
    let (x, y) = query.variables()?;
    let method = query.method()?;
    let result =
        services::correlate_variables(state.repository.as_ref(), unit, x, y, method).await?;
    Ok(Json(result))
}

/// GET /v1/variables/regression?unit=site&x=canopy_coverage&y=shannon_index&degree=2
pub async fn get_variable_regression(
    State(state): State<AppState>,
    Query(query): Query<VariablePairQuery>,
) -> HandlerResult<VariableRegression> {
    let unit = query.unit()?;
    let (x, y) = query.variables()?;
    let degree = query.degree()?;
    let result =
        services::regress_variables(state.repository.as_ref(), unit, x, y, degree).await?;
    Ok(Json(result))
}

// =============================================================================
// Species
// =============================================================================

/// GET /v1/species/{species_id}/statistics
pub async fn get_species_statistics(
    State(state): State<AppState>,
    Path(species_id): Path<i64>,
) -> HandlerResult<SpeciesStatistics> {
    let stats =
        services::species_statistics(state.repository.as_ref(), SpeciesId::new(species_id))
            .await?;
    Ok(Json(stats))
}
