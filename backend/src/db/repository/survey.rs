//! Write and listing operations on the survey hierarchy.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    AntRecord, EntityKind, NewAntRecord, NewParentSite, NewSpecies, NewSurveyEvent,
    NewSurveySite, NewVegetationRecord, ParentSite, Species, SpeciesId, SpeciesStatistics,
    SurveyEvent, SurveySite, VegetationRecord,
};

/// Record store operations used by data-entry collaborators and fixtures.
///
/// Creating a child under a missing or logically deleted parent fails with
/// `NotFound`. Range and uniqueness violations fail with `ValidationError`.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// `Ok(true)` when the store answers queries.
    async fn health_check(&self) -> RepositoryResult<bool>;

    async fn create_parent_site(&self, site: &NewParentSite) -> RepositoryResult<ParentSite>;

    async fn create_survey_site(&self, site: &NewSurveySite) -> RepositoryResult<SurveySite>;

    async fn create_survey_event(&self, event: &NewSurveyEvent) -> RepositoryResult<SurveyEvent>;

    async fn create_species(&self, species: &NewSpecies) -> RepositoryResult<Species>;

    async fn create_ant_record(&self, record: &NewAntRecord) -> RepositoryResult<AntRecord>;

    async fn create_vegetation_record(
        &self,
        record: &NewVegetationRecord,
    ) -> RepositoryResult<VegetationRecord>;

    /// Parent sites ordered by name.
    async fn list_parent_sites(&self, include_deleted: bool) -> RepositoryResult<Vec<ParentSite>>;

    /// Survey sites ordered by name.
    async fn list_survey_sites(&self, include_deleted: bool) -> RepositoryResult<Vec<SurveySite>>;

    /// Survey events ordered by date, then site.
    async fn list_survey_events(&self, include_deleted: bool)
        -> RepositoryResult<Vec<SurveyEvent>>;

    /// Species ordered by scientific name.
    async fn list_species(&self, include_deleted: bool) -> RepositoryResult<Vec<Species>>;

    /// Marks a live row deleted. Deleting a missing or already deleted row is `NotFound`.
    async fn soft_delete(&self, kind: EntityKind, id: i64) -> RepositoryResult<()>;

    /// Clears the deletion mark. Restoring a missing or live row is `NotFound`.
    async fn restore(&self, kind: EntityKind, id: i64) -> RepositoryResult<()>;

    /// Occurrence summary of one species over live events and records.
    async fn species_statistics(&self, species_id: SpeciesId)
        -> RepositoryResult<SpeciesStatistics>;
}
