//! End-to-end requests through the axum router.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use ant_survey::db::{FullRepository, LocalRepository};
use ant_survey::http::{create_router, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn seeded_app() -> (Router, support::SurveyFixture) {
    let repo = Arc::new(LocalRepository::new());
    let fixture = support::seed_survey(repo.as_ref()).await;
    let app = create_router(AppState::new(repo as Arc<dyn FullRepository>));
    (app, fixture)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (app, _) = seeded_app().await;
    let (status, body) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_matrix_endpoint() {
    let (app, _) = seeded_app().await;
    let (status, body) = get_json(app, "/v1/matrix?unit=site&valueType=presence").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], json!(["Ridge", "Summit", "Valley"]));
    assert_eq!(body["values"][0], json!([0.0, 1.0, 1.0]));
    assert_eq!(body["options"]["value_type"], "presence");
}

#[tokio::test]
async fn test_matrix_json_applies_missing_value() {
    let (app, _) = seeded_app().await;
    let (status, body) = get_json(app.clone(), "/v1/matrix?unit=parent_site&missingValue=NA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], json!(["Mt. Takao", "Mt. Tsukuba"]));
    assert_eq!(body["values"][0], json!([4.0, 7.0, 3.0]));
    assert_eq!(body["values"][1], json!(["NA", "NA", "NA"]));

    let (_, body) = get_json(app, "/v1/matrix?unit=parent_site&missingValue=empty").await;
    assert_eq!(body["values"][1], json!(["", "", ""]));
}

#[tokio::test]
async fn test_matrix_rejects_unknown_tokens() {
    let (app, _) = seeded_app().await;
    let (status, body) = get_json(app.clone(), "/v1/matrix?unit=plot").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("plot"));

    let (status, _) = get_json(app, "/v1/matrix?missingValue=none").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_matrix_csv_download() {
    let (app, _) = seeded_app().await;
    let request = Request::builder()
        .uri("/v1/matrix.csv?unit=parent_site&missingValue=NA")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "parent_site,Camponotus japonicus,Formica japonica,Lasius japonicus"
    );
    assert_eq!(lines[2], "Mt. Tsukuba,NA,NA,NA");
}

#[tokio::test]
async fn test_diversity_and_vegetation_endpoints() {
    let (app, _) = seeded_app().await;
    let (status, body) = get_json(app.clone(), "/v1/diversity?unit=site").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["total_individuals"], 10);

    let (status, body) = get_json(app.clone(), "/v1/vegetation?unit=site").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"][0], "canopy_coverage");
    assert_eq!(body["values"][0][0], 70.0);
    assert_eq!(body["values"][1][0], Value::Null);

    let request = Request::builder()
        .uri("/v1/diversity?unit=event&format=csv")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Ridge_2024-06-03,2,"));
}

#[tokio::test]
async fn test_correlation_and_regression_posts() {
    let (app, _) = seeded_app().await;
    let (status, body) = post_json(
        app.clone(),
        "/v1/statistics/correlation",
        json!({"x": [1, 2, 3, 4, null], "y": [2, 4, 5, 8, 1], "method": "spearman"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "spearman");
    assert_eq!(body["n"], 4);
    assert_eq!(body["correlation"], 1.0);

    let (status, body) = post_json(
        app.clone(),
        "/v1/statistics/regression",
        json!({"x": [1, 2, 3, 4], "y": [3, 5, 7, 9], "degree": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degree"], 1);
    assert_eq!(body["r2"], 1.0);

    let (status, body) = post_json(
        app.clone(),
        "/v1/statistics/regression",
        json!({"x": [5, 5, 5], "y": [1, 2, 3]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["coefficients"], json!([0.0]));
    assert_eq!(body["intercept"], 2.0);
    assert_eq!(body["r2"], 0.0);

    let (status, body) = post_json(
        app.clone(),
        "/v1/statistics/regression",
        json!({"x": [1, 2, 3], "y": [2, 4, 7], "degree": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degree"], 3);
    assert_eq!(body["r2"], 1.0);

    let (status, body) = post_json(
        app.clone(),
        "/v1/statistics/regression",
        json!({"x": [1, 2], "y": [3, 5]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].is_string());

    let (status, _) = post_json(
        app,
        "/v1/statistics/correlation",
        json!({"x": [1, 2, 3], "y": [1, 2]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_variable_endpoints() {
    let (app, _) = seeded_app().await;
    let (status, body) = get_json(
        app.clone(),
        "/v1/variables/regression?unit=event&x=canopy_coverage&y=total_individuals",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["x_variable"], "canopy_coverage");
    assert_eq!(body["result"]["n"], 3);

    let (status, body) = get_json(
        app.clone(),
        "/v1/variables/correlation?unit=site&x=canopy_coverage&y=species_richness",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n"], 2);
    assert!(body["error"].is_string());

    let (status, _) = get_json(
        app,
        "/v1/variables/correlation?unit=site&x=altitude&y=species_richness",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_species_statistics_endpoint() {
    let (app, fixture) = seeded_app().await;
    let uri = format!("/v1/species/{}/statistics", fixture.formica.id);
    let (status, body) = get_json(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scientific_name"], "Formica japonica");
    assert_eq!(body["occurrence_count"], 2);

    let (status, body) = get_json(app, "/v1/species/424242/statistics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unreachable_store_is_internal_error() {
    let repo = Arc::new(LocalRepository::new());
    repo.set_healthy(false);
    let app = create_router(AppState::new(repo as Arc<dyn FullRepository>));
    let (status, body) = get_json(app, "/v1/diversity").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "REPOSITORY_ERROR");
}
