//! Per-species occurrence summary.

use crate::analysis::AnalysisResult;
use crate::api::{SpeciesId, SpeciesStatistics};
use crate::db::SurveyRepository;

pub async fn species_statistics<R: SurveyRepository + ?Sized>(
    repo: &R,
    species_id: SpeciesId,
) -> AnalysisResult<SpeciesStatistics> {
    let stats = repo
        .species_statistics(species_id)
        .await
        .map_err(|e| e.with_operation("species_statistics"))?;
    log::debug!(
        "Species {} ({}) occurs in {} of {} events",
        stats.scientific_name,
        species_id,
        stats.occurrence_count,
        stats.total_events
    );
    Ok(stats)
}
