//! Router configuration for the HTTP API.
//!
//! Sets up every route, the CORS, compression and tracing middleware, and
//! returns the router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::routes::{self, diversity, matrix, statistics, variables, vegetation};

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; the API is read-only.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(routes::HEALTH, get(handlers::health_check))
        .route(matrix::GET_MATRIX, get(handlers::get_matrix))
        .route(matrix::GET_MATRIX_CSV, get(handlers::get_matrix_csv))
        .route(vegetation::GET_VEGETATION, get(handlers::get_vegetation))
        .route(diversity::GET_DIVERSITY, get(handlers::get_diversity))
        .route(statistics::POST_CORRELATION, post(handlers::post_correlation))
        .route(statistics::POST_REGRESSION, post(handlers::post_regression))
        .route(
            variables::GET_VARIABLE_CORRELATION,
            get(handlers::get_variable_correlation),
        )
        .route(
            variables::GET_VARIABLE_REGRESSION,
            get(handlers::get_variable_regression),
        )
        .route(
            routes::SPECIES_STATISTICS,
            get(handlers::get_species_statistics),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FullRepository, LocalRepository};
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let _router = create_router(AppState::new(repo));
    }
}
