//! Error construction, display and conversion across layers.

use ant_survey::analysis::AnalysisError;
use ant_survey::db::{ErrorContext, RepositoryError};

#[test]
fn test_display_includes_context() {
    let err = RepositoryError::validation_with_context(
        "count must be >= 0",
        ErrorContext::new("create_ant_record")
            .with_entity("ant_record")
            .with_details("count=-2"),
    );
    assert_eq!(
        err.to_string(),
        "Data validation error: count must be >= 0 \
         [operation=create_ant_record, entity=ant_record, details=count=-2]"
    );
}

#[test]
fn test_retryability_by_kind() {
    assert!(RepositoryError::connection("refused").is_retryable());
    assert!(RepositoryError::timeout("slow").is_retryable());
    assert!(!RepositoryError::query("syntax").is_retryable());
    assert!(RepositoryError::query_with_context("locked", ErrorContext::default().retryable())
        .is_retryable());
    assert!(!RepositoryError::not_found("gone").is_retryable());
}

#[test]
fn test_with_operation_keeps_kind() {
    let err = RepositoryError::internal("poisoned").with_operation("fetch_vegetation");
    assert!(matches!(err, RepositoryError::InternalError { .. }));
    assert_eq!(err.context().operation.as_deref(), Some("fetch_vegetation"));
}

#[test]
fn test_repository_error_wrapped_by_analysis_error() {
    let err: AnalysisError = RepositoryError::not_found("species 4").into();
    assert!(err.to_string().starts_with("Data access error: Not found: species 4"));
    assert!(!err.is_invalid_argument());

    let err = "weekly".parse::<ant_survey::models::Aggregation>().unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("weekly"));
}
