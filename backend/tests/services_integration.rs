//! Service layer over a seeded in-memory record store.

mod support;

use ant_survey::analysis::{export::UTF8_BOM, AnalysisError};
use ant_survey::api::{EntityKind, MatrixCell, SpeciesId};
use ant_survey::db::{LocalRepository, SurveyRepository};
use ant_survey::models::{
    Aggregation, AggregationUnit, AnalysisVariable, CorrelationMethod, MissingValue,
    RegressionDegree, ValueType, VegetationField,
};
use ant_survey::routes::matrix::MatrixOptions;
use ant_survey::services;
use support::seed_survey;

fn csv_lines(bytes: Vec<u8>) -> Vec<String> {
    assert!(bytes.starts_with(UTF8_BOM));
    String::from_utf8(bytes[UTF8_BOM.len()..].to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_site_matrix_layout() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let matrix = services::build_community_matrix(&repo, MatrixOptions::new(AggregationUnit::Site))
        .await
        .unwrap();
    assert_eq!(matrix.rows, vec!["Ridge", "Summit", "Valley"]);
    assert_eq!(
        matrix.columns,
        vec!["Camponotus japonicus", "Formica japonica", "Lasius japonicus"]
    );
    assert_eq!(matrix.values[0], vec![0.0, 7.0, 3.0]);
    assert_eq!(matrix.values[1], vec![0.0, 0.0, 0.0]);
    assert_eq!(matrix.values[2], vec![4.0, 0.0, 0.0]);
}

#[tokio::test]
async fn test_parent_site_and_value_types() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let options = MatrixOptions::new(AggregationUnit::ParentSite)
        .with_value_type(ValueType::Frequency)
        .with_missing_value(MissingValue::Na);
    let matrix = services::build_community_matrix(&repo, options).await.unwrap();
    assert_eq!(matrix.rows, vec!["Mt. Takao", "Mt. Tsukuba"]);
    assert_eq!(matrix.values[0], vec![50.0, 50.0, 50.0]);
    assert_eq!(matrix.cell(1, 0), Some(MatrixCell::Text("NA".into())));

    let mean = services::build_community_matrix(
        &repo,
        MatrixOptions::new(AggregationUnit::Site).with_aggregation(Aggregation::Mean),
    )
    .await
    .unwrap();
    assert_eq!(mean.values[0], vec![0.0, 3.5, 3.0]);
}

#[tokio::test]
async fn test_row_sums_equal_total_individuals() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    for unit in AggregationUnit::ALL {
        let matrix =
            services::build_community_matrix(&repo, services::diversity_matrix_options(*unit))
                .await
                .unwrap();
        let records = services::diversity_records(&repo, *unit).await.unwrap();
        assert_eq!(records.len(), matrix.n_rows());
        for (row, record) in records.iter().enumerate() {
            assert_eq!(record.label, matrix.rows[row]);
            assert_eq!(matrix.row_sum(row), record.total_individuals as f64);
        }
    }
}

#[tokio::test]
async fn test_diversity_indices_of_ridge() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let records = services::diversity_records(&repo, AggregationUnit::Site)
        .await
        .unwrap();
    let ridge = &records[0];
    assert_eq!(ridge.label, "Ridge");
    assert_eq!(ridge.species_richness, 2);
    assert_eq!(ridge.total_individuals, 10);
    assert_eq!(ridge.shannon_index, 0.6109);
    assert_eq!(ridge.simpson_index, 0.42);
    assert_eq!(ridge.evenness, 0.8813);

    let summit = &records[1];
    assert_eq!(summit.species_richness, 0);
    assert_eq!(summit.shannon_index, 0.0);
}

#[tokio::test]
async fn test_matrix_and_diversity_csv() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let lines = csv_lines(
        services::community_matrix_csv(
            &repo,
            MatrixOptions::new(AggregationUnit::Site).with_missing_value(MissingValue::Empty),
        )
        .await
        .unwrap(),
    );
    assert_eq!(
        lines[0],
        "site,Camponotus japonicus,Formica japonica,Lasius japonicus"
    );
    assert_eq!(lines[1], "Ridge,,7,3");
    assert_eq!(lines.len(), 4);

    let lines = csv_lines(
        services::diversity_csv(&repo, AggregationUnit::Site)
            .await
            .unwrap(),
    );
    assert!(lines[0].starts_with("site,"));
    assert!(lines[3].starts_with("Valley,1,0,0,0,4"));
}

#[tokio::test]
async fn test_vegetation_matrix_by_site() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let matrix = services::vegetation_matrix(&repo, AggregationUnit::Site, MissingValue::Na)
        .await
        .unwrap();
    assert_eq!(matrix.rows, vec!["Ridge", "Summit", "Valley"]);
    assert_eq!(matrix.columns, VegetationField::SITE_LEVEL.to_vec());
    assert_eq!(
        matrix.numeric("Ridge", VegetationField::CanopyCoverage),
        Some(70.0)
    );
    assert_eq!(
        matrix.numeric("Ridge", VegetationField::LightCondition),
        Some(3.0)
    );
    assert_eq!(matrix.numeric("Summit", VegetationField::CanopyCoverage), None);

    let lines = csv_lines(
        services::vegetation_csv(&repo, AggregationUnit::Event, MissingValue::Na)
            .await
            .unwrap(),
    );
    assert!(lines[0].starts_with("event,dominant_tree,"));
    assert!(lines[1].starts_with("Ridge_2024-06-03,Quercus serrata,NA"));
}

#[tokio::test]
async fn test_variable_correlation_over_sites() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let series = services::paired_series(
        &repo,
        AggregationUnit::Site,
        AnalysisVariable::CanopyCoverage,
        AnalysisVariable::TotalIndividuals,
    )
    .await
    .unwrap();
    assert_eq!(series.labels, vec!["Ridge", "Summit", "Valley"]);
    assert_eq!(series.y, vec![10.0, 0.0, 4.0]);
    assert!(series.x[1].is_nan());

    let correlation = services::correlate_variables(
        &repo,
        AggregationUnit::Site,
        AnalysisVariable::CanopyCoverage,
        AnalysisVariable::TotalIndividuals,
        CorrelationMethod::Spearman,
    )
    .await
    .unwrap();
    assert_eq!(correlation.result.n, 2);
    assert!(correlation.result.correlation.is_none());
    assert!(correlation.result.error.is_some());
    assert!(correlation.strength.is_none());

    let regression = services::regress_variables(
        &repo,
        AggregationUnit::Event,
        AnalysisVariable::CanopyCoverage,
        AnalysisVariable::TotalIndividuals,
        RegressionDegree::Linear,
    )
    .await
    .unwrap();
    let fit = regression.result.fit().unwrap();
    assert_eq!(fit.n, 3);
    assert!(fit.coefficients[0] > 0.0);
}

#[tokio::test]
async fn test_statistics_on_supplied_vectors() {
    let x = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
    let y = [Some(2.1), Some(3.9), Some(6.0), Some(8.2), Some(9.8)];
    let r = services::correlate(&x, &y, CorrelationMethod::Pearson).unwrap();
    assert_eq!(r.n, 4);
    assert!(r.correlation.unwrap() > 0.99);
    assert!(r.significant);

    let err = services::correlate(&x[..3], &y, CorrelationMethod::Pearson).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_species_statistics_service() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    let stats = services::species_statistics(&repo, f.camponotus.id)
        .await
        .unwrap();
    assert_eq!(stats.occurrence_count, 1);
    assert_eq!(stats.occurrence_rate, 25.0);

    let err = services::species_statistics(&repo, SpeciesId::new(9_999))
        .await
        .unwrap_err();
    match err {
        AnalysisError::DataAccess(e) => assert!(e.is_not_found()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_store_failure_surfaces_as_data_access() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;
    repo.set_healthy(false);

    let err = services::diversity_records(&repo, AggregationUnit::Site)
        .await
        .unwrap_err();
    match err {
        AnalysisError::DataAccess(e) => assert!(e.is_retryable()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_deleted_site_disappears_from_every_analysis() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;
    repo.soft_delete(EntityKind::SurveySite, f.valley.id.value())
        .await
        .unwrap();

    let table = services::variable_table(&repo, AggregationUnit::Site)
        .await
        .unwrap();
    assert_eq!(table.rows, vec!["Ridge", "Summit"]);

    let matrix = services::build_community_matrix(&repo, MatrixOptions::new(AggregationUnit::Site))
        .await
        .unwrap();
    assert!(!matrix.columns.iter().any(|c| c == "Camponotus japonicus"));
}
