//! Record store behaviour of the in-memory repository.

mod support;

use ant_survey::api::{EntityKind, NewAntRecord, NewParentSite, NewSurveyEvent, NewSurveySite};
use ant_survey::db::{AnalyticsRepository, LocalRepository, RepositoryError, SurveyRepository};
use ant_survey::models::AggregationUnit;
use support::{date, seed_survey};

#[tokio::test]
async fn test_site_join_keeps_sites_without_records() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let tuples = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap();
    let summit: Vec<_> = tuples.iter().filter(|t| t.label == "Summit").collect();
    assert_eq!(summit.len(), 1);
    assert!(summit[0].species.is_none());
    assert!(summit[0].count.is_none());
    assert_eq!(tuples.iter().filter(|t| t.label == "Ridge").count(), 3);
}

#[tokio::test]
async fn test_event_labels_join_site_name_and_date() {
    let repo = LocalRepository::new();
    seed_survey(&repo).await;

    let tuples = repo.fetch_occurrences(AggregationUnit::Event).await.unwrap();
    let mut labels: Vec<&str> = tuples.iter().map(|t| t.label.as_str()).collect();
    labels.dedup();
    assert!(labels.contains(&"Ridge_2024-06-03"));
    assert!(labels.contains(&"Ridge_2024-07-01"));
    assert!(labels.contains(&"Summit_2024-06-20"));
}

#[tokio::test]
async fn test_soft_deleted_event_leaves_the_joins() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    repo.soft_delete(EntityKind::SurveyEvent, f.valley_june.id.value())
        .await
        .unwrap();

    let tuples = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap();
    let valley: Vec<_> = tuples.iter().filter(|t| t.label == "Valley").collect();
    assert_eq!(valley.len(), 1);
    assert!(valley[0].species.is_none());

    let vegetation = repo.fetch_vegetation(AggregationUnit::Site).await.unwrap();
    let valley = vegetation.iter().find(|o| o.label == "Valley").unwrap();
    assert!(valley.measurements.is_none());

    repo.restore(EntityKind::SurveyEvent, f.valley_june.id.value())
        .await
        .unwrap();
    let tuples = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap();
    assert!(tuples
        .iter()
        .any(|t| t.label == "Valley" && t.species.as_deref() == Some("Camponotus japonicus")));
}

#[tokio::test]
async fn test_deleted_species_still_joined_but_not_recordable() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    repo.soft_delete(EntityKind::Species, f.lasius.id.value())
        .await
        .unwrap();
    let tuples = repo.fetch_occurrences(AggregationUnit::Event).await.unwrap();
    assert!(tuples
        .iter()
        .any(|t| t.species.as_deref() == Some("Lasius japonicus")));

    let err = repo
        .create_ant_record(&NewAntRecord::new(f.summit_june.id, f.lasius.id, 1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_child_under_deleted_parent_is_not_found() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    repo.soft_delete(EntityKind::SurveySite, f.summit.id.value())
        .await
        .unwrap();
    let err = repo
        .create_survey_event(&NewSurveyEvent::new(f.summit.id, date(8, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(err.context().operation.as_deref(), Some("create_survey_event"));
}

#[tokio::test]
async fn test_uniqueness_and_range_violations() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    let duplicate = repo
        .create_ant_record(&NewAntRecord::new(f.ridge_june.id, f.formica.id, 9))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, RepositoryError::ValidationError { .. }));

    let same_day = repo
        .create_survey_event(&NewSurveyEvent::new(f.ridge.id, date(6, 3)))
        .await
        .unwrap_err();
    assert!(matches!(same_day, RepositoryError::ValidationError { .. }));

    let off_map = repo
        .create_parent_site(&NewParentSite::new("Okinotorishima", 20.4, 136.1))
        .await;
    assert!(off_map.is_ok());
    let south_of_range = repo
        .create_parent_site(&NewParentSite::new("Equator", 0.0, 136.1))
        .await
        .unwrap_err();
    assert!(matches!(south_of_range, RepositoryError::ValidationError { .. }));

    let site_name_taken = repo
        .create_survey_site(&NewSurveySite::new(
            f.ridge.parent_site_id,
            "Ridge",
            35.6,
            139.2,
        ))
        .await
        .unwrap_err();
    assert!(matches!(site_name_taken, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_species_statistics_over_live_events() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    let stats = repo.species_statistics(f.formica.id).await.unwrap();
    assert_eq!(stats.scientific_name, "Formica japonica");
    assert_eq!(stats.occurrence_count, 2);
    assert_eq!(stats.total_events, 4);
    assert_eq!(stats.occurrence_rate, 50.0);
    assert_eq!(stats.avg_count, 3.5);
    assert_eq!(stats.max_count, 5);
    assert_eq!(stats.min_count, 2);

    repo.soft_delete(EntityKind::SurveyEvent, f.ridge_july.id.value())
        .await
        .unwrap();
    let stats = repo.species_statistics(f.formica.id).await.unwrap();
    assert_eq!(stats.occurrence_count, 1);
    assert_eq!(stats.total_events, 3);
    assert_eq!(stats.occurrence_rate, 33.33);
}

#[tokio::test]
async fn test_listings_respect_deletion_flag() {
    let repo = LocalRepository::new();
    let f = seed_survey(&repo).await;

    repo.soft_delete(EntityKind::SurveySite, f.valley.id.value())
        .await
        .unwrap();
    let live: Vec<String> = repo
        .list_survey_sites(false)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(live, vec!["Ridge", "Summit"]);
    assert_eq!(repo.list_survey_sites(true).await.unwrap().len(), 3);
    assert_eq!(repo.list_species(false).await.unwrap().len(), 3);
    assert_eq!(repo.list_parent_sites(false).await.unwrap().len(), 2);
    assert_eq!(repo.list_survey_events(false).await.unwrap().len(), 4);
}
