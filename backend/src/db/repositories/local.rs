//! In-memory local repository.
//!
//! Holds the whole survey hierarchy in ordered maps behind a single lock.
//! Suitable for unit tests, fixtures and local development; data does not
//! outlive the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::*;

/// In-memory record store.
///
/// ```
/// use ant_survey::api::NewParentSite;
/// use ant_survey::db::{LocalRepository, SurveyRepository};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     repo.create_parent_site(&NewParentSite::new("Tsukuba", 36.1, 140.1))
///         .await
///         .unwrap();
///     assert_eq!(repo.list_parent_sites(false).await.unwrap().len(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    parent_sites: BTreeMap<i64, ParentSite>,
    survey_sites: BTreeMap<i64, SurveySite>,
    survey_events: BTreeMap<i64, SurveyEvent>,
    species: BTreeMap<i64, Species>,
    ant_records: BTreeMap<i64, AntRecord>,
    vegetation_records: BTreeMap<i64, VegetationRecord>,
    last_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            parent_sites: BTreeMap::new(),
            survey_sites: BTreeMap::new(),
            survey_events: BTreeMap::new(),
            species: BTreeMap::new(),
            ant_records: BTreeMap::new(),
            vegetation_records: BTreeMap::new(),
            last_id: 0,
            is_healthy: true,
        }
    }
}

/// A unit row of an analytics join and the live events beneath it.
struct UnitRow<'a> {
    id: i64,
    label: String,
    events: Vec<&'a SurveyEvent>,
}

impl LocalData {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Record store is not reachable",
                ErrorContext::new(operation),
            ))
        }
    }

    fn live_parent_site(&self, id: ParentSiteId) -> Option<&ParentSite> {
        self.parent_sites.get(&id.value()).filter(|s| !s.is_deleted())
    }

    fn live_survey_site(&self, id: SurveySiteId) -> Option<&SurveySite> {
        self.survey_sites.get(&id.value()).filter(|s| !s.is_deleted())
    }

    fn live_survey_event(&self, id: SurveyEventId) -> Option<&SurveyEvent> {
        self.survey_events.get(&id.value()).filter(|e| !e.is_deleted())
    }

    fn live_species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id.value()).filter(|s| !s.is_deleted())
    }

    /// Live events of a site, oldest first.
    fn live_events_of(&self, site_id: SurveySiteId) -> Vec<&SurveyEvent> {
        let mut events: Vec<&SurveyEvent> = self
            .survey_events
            .values()
            .filter(|e| e.survey_site_id == site_id && !e.is_deleted())
            .collect();
        events.sort_by_key(|e| (e.survey_date, e.id));
        events
    }

    fn sorted_live_sites(&self) -> Vec<&SurveySite> {
        let mut sites: Vec<&SurveySite> =
            self.survey_sites.values().filter(|s| !s.is_deleted()).collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        sites
    }

    /// Rows of the join for `unit`, in the unit's natural order.
    fn unit_rows(&self, unit: AggregationUnit) -> Vec<UnitRow<'_>> {
        match unit {
            AggregationUnit::Event => {
                let mut rows: Vec<(&SurveyEvent, &SurveySite)> = self
                    .survey_events
                    .values()
                    .filter(|e| !e.is_deleted())
                    .filter_map(|e| self.live_survey_site(e.survey_site_id).map(|s| (e, s)))
                    .collect();
                rows.sort_by(|(ea, sa), (eb, sb)| {
                    ea.survey_date
                        .cmp(&eb.survey_date)
                        .then(sa.name.cmp(&sb.name))
                        .then(ea.id.cmp(&eb.id))
                });
                rows.into_iter()
                    .map(|(event, site)| UnitRow {
                        id: event.id.value(),
                        label: event_label(&site.name, event),
                        events: vec![event],
                    })
                    .collect()
            }
            AggregationUnit::Site => self
                .sorted_live_sites()
                .into_iter()
                .map(|site| UnitRow {
                    id: site.id.value(),
                    label: site.name.clone(),
                    events: self.live_events_of(site.id),
                })
                .collect(),
            AggregationUnit::ParentSite => {
                let mut parents: Vec<&ParentSite> =
                    self.parent_sites.values().filter(|p| !p.is_deleted()).collect();
                parents.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                let sites = self.sorted_live_sites();
                parents
                    .into_iter()
                    .map(|parent| UnitRow {
                        id: parent.id.value(),
                        label: parent.name.clone(),
                        events: sites
                            .iter()
                            .filter(|s| s.parent_site_id == parent.id)
                            .flat_map(|s| self.live_events_of(s.id))
                            .collect(),
                    })
                    .collect()
            }
        }
    }

    fn live_records_of(&self, event_id: SurveyEventId) -> impl Iterator<Item = &AntRecord> {
        self.ant_records
            .values()
            .filter(move |r| r.survey_event_id == event_id && !r.is_deleted())
    }

    fn live_vegetation_of(
        &self,
        event_id: SurveyEventId,
    ) -> impl Iterator<Item = &VegetationRecord> {
        self.vegetation_records
            .values()
            .filter(move |r| r.survey_event_id == event_id && !r.is_deleted())
    }

    fn deletion_marker(
        &mut self,
        kind: EntityKind,
        id: i64,
    ) -> Option<(&mut Option<DateTime<Utc>>, &mut DateTime<Utc>)> {
        match kind {
            EntityKind::ParentSite => self
                .parent_sites
                .get_mut(&id)
                .map(|r| (&mut r.deleted_at, &mut r.updated_at)),
            EntityKind::SurveySite => self
                .survey_sites
                .get_mut(&id)
                .map(|r| (&mut r.deleted_at, &mut r.updated_at)),
            EntityKind::SurveyEvent => self
                .survey_events
                .get_mut(&id)
                .map(|r| (&mut r.deleted_at, &mut r.updated_at)),
            EntityKind::Species => self
                .species
                .get_mut(&id)
                .map(|r| (&mut r.deleted_at, &mut r.updated_at)),
            EntityKind::AntRecord => self
                .ant_records
                .get_mut(&id)
                .map(|r| (&mut r.deleted_at, &mut r.updated_at)),
            EntityKind::VegetationRecord => self
                .vegetation_records
                .get_mut(&id)
                .map(|r| (&mut r.deleted_at, &mut r.updated_at)),
        }
    }
}

fn event_label(site_name: &str, event: &SurveyEvent) -> String {
    format!("{}_{}", site_name, event.survey_date.format("%Y-%m-%d"))
}

fn invalid(operation: &str, entity: EntityKind, message: String) -> RepositoryError {
    RepositoryError::validation_with_context(
        message,
        ErrorContext::new(operation).with_entity(entity.as_str()),
    )
}

fn missing_parent(operation: &str, entity: EntityKind, id: i64) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("{} {} does not exist or is deleted", entity, id),
        ErrorContext::new(operation)
            .with_entity(entity.as_str())
            .with_entity_id(id),
    )
}

fn no_row(operation: &str, kind: EntityKind, id: i64, state: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("no {} {} with id {}", state, kind, id),
        ErrorContext::new(operation)
            .with_entity(kind.as_str())
            .with_entity_id(id),
    )
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Simulates losing (or regaining) the connection to the store.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Drops every row and resets id allocation.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SurveyRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read();
        data.ensure_healthy("health_check")?;
        Ok(true)
    }

    async fn create_parent_site(&self, site: &NewParentSite) -> RepositoryResult<ParentSite> {
        const OP: &str = "create_parent_site";
        let mut data = self.data.write();
        data.ensure_healthy(OP)?;
        site.validate()
            .map_err(|m| invalid(OP, EntityKind::ParentSite, m))?;
        if data.parent_sites.values().any(|p| p.name == site.name) {
            return Err(invalid(
                OP,
                EntityKind::ParentSite,
                format!("parent site name '{}' already exists", site.name),
            ));
        }

        let now = Utc::now();
        let row = ParentSite {
            id: ParentSiteId(data.next_id()),
            name: site.name.clone(),
            latitude: site.latitude,
            longitude: site.longitude,
            altitude: site.altitude,
            area: site.area,
            remarks: site.remarks.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.parent_sites.insert(row.id.value(), row.clone());
        log::debug!("Created parent site {} ({})", row.id, row.name);
        Ok(row)
    }

    async fn create_survey_site(&self, site: &NewSurveySite) -> RepositoryResult<SurveySite> {
        const OP: &str = "create_survey_site";
        let mut data = self.data.write();
        data.ensure_healthy(OP)?;
        site.validate()
            .map_err(|m| invalid(OP, EntityKind::SurveySite, m))?;
        if data.live_parent_site(site.parent_site_id).is_none() {
            return Err(missing_parent(
                OP,
                EntityKind::ParentSite,
                site.parent_site_id.value(),
            ));
        }
        if data
            .survey_sites
            .values()
            .any(|s| s.parent_site_id == site.parent_site_id && s.name == site.name)
        {
            return Err(invalid(
                OP,
                EntityKind::SurveySite,
                format!(
                    "survey site '{}' already exists under parent site {}",
                    site.name, site.parent_site_id
                ),
            ));
        }

        let now = Utc::now();
        let row = SurveySite {
            id: SurveySiteId(data.next_id()),
            parent_site_id: site.parent_site_id,
            name: site.name.clone(),
            latitude: site.latitude,
            longitude: site.longitude,
            altitude: site.altitude,
            area: site.area,
            remarks: site.remarks.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.survey_sites.insert(row.id.value(), row.clone());
        log::debug!("Created survey site {} ({})", row.id, row.name);
        Ok(row)
    }

    async fn create_survey_event(&self, event: &NewSurveyEvent) -> RepositoryResult<SurveyEvent> {
        const OP: &str = "create_survey_event";
        let mut data = self.data.write();
        data.ensure_healthy(OP)?;
        event
            .validate()
            .map_err(|m| invalid(OP, EntityKind::SurveyEvent, m))?;
        if data.live_survey_site(event.survey_site_id).is_none() {
            return Err(missing_parent(
                OP,
                EntityKind::SurveySite,
                event.survey_site_id.value(),
            ));
        }
        if data
            .survey_events
            .values()
            .any(|e| e.survey_site_id == event.survey_site_id && e.survey_date == event.survey_date)
        {
            return Err(invalid(
                OP,
                EntityKind::SurveyEvent,
                format!(
                    "survey site {} already has an event on {}",
                    event.survey_site_id, event.survey_date
                ),
            ));
        }

        let now = Utc::now();
        let row = SurveyEvent {
            id: SurveyEventId(data.next_id()),
            survey_site_id: event.survey_site_id,
            survey_date: event.survey_date,
            surveyor_name: event.surveyor_name.clone(),
            weather: event.weather,
            temperature: event.temperature,
            remarks: event.remarks.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.survey_events.insert(row.id.value(), row.clone());
        log::debug!("Created survey event {} on {}", row.id, row.survey_date);
        Ok(row)
    }

    async fn create_species(&self, species: &NewSpecies) -> RepositoryResult<Species> {
        const OP: &str = "create_species";
        let mut data = self.data.write();
        data.ensure_healthy(OP)?;
        species
            .validate()
            .map_err(|m| invalid(OP, EntityKind::Species, m))?;
        if data
            .species
            .values()
            .any(|s| s.scientific_name == species.scientific_name)
        {
            return Err(invalid(
                OP,
                EntityKind::Species,
                format!("species '{}' already exists", species.scientific_name),
            ));
        }

        let now = Utc::now();
        let row = Species {
            id: SpeciesId(data.next_id()),
            scientific_name: species.scientific_name.clone(),
            genus: species.genus.clone(),
            subfamily: species.subfamily.clone(),
            ja_name: species.ja_name.clone(),
            ja_genus: species.ja_genus.clone(),
            ja_subfamily: species.ja_subfamily.clone(),
            remarks: species.remarks.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.species.insert(row.id.value(), row.clone());
        log::debug!("Created species {} ({})", row.id, row.scientific_name);
        Ok(row)
    }

    async fn create_ant_record(&self, record: &NewAntRecord) -> RepositoryResult<AntRecord> {
        const OP: &str = "create_ant_record";
        let mut data = self.data.write();
        data.ensure_healthy(OP)?;
        record
            .validate()
            .map_err(|m| invalid(OP, EntityKind::AntRecord, m))?;
        if data.live_survey_event(record.survey_event_id).is_none() {
            return Err(missing_parent(
                OP,
                EntityKind::SurveyEvent,
                record.survey_event_id.value(),
            ));
        }
        if data.live_species(record.species_id).is_none() {
            return Err(missing_parent(
                OP,
                EntityKind::Species,
                record.species_id.value(),
            ));
        }
        if data.ant_records.values().any(|r| {
            r.survey_event_id == record.survey_event_id && r.species_id == record.species_id
        }) {
            return Err(invalid(
                OP,
                EntityKind::AntRecord,
                format!(
                    "event {} already has a record for species {}",
                    record.survey_event_id, record.species_id
                ),
            ));
        }

        let now = Utc::now();
        let row = AntRecord {
            id: AntRecordId(data.next_id()),
            survey_event_id: record.survey_event_id,
            species_id: record.species_id,
            count: record.count,
            remarks: record.remarks.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.ant_records.insert(row.id.value(), row.clone());
        Ok(row)
    }

    async fn create_vegetation_record(
        &self,
        record: &NewVegetationRecord,
    ) -> RepositoryResult<VegetationRecord> {
        const OP: &str = "create_vegetation_record";
        let mut data = self.data.write();
        data.ensure_healthy(OP)?;
        record
            .validate()
            .map_err(|m| invalid(OP, EntityKind::VegetationRecord, m))?;
        if data.live_survey_event(record.survey_event_id).is_none() {
            return Err(missing_parent(
                OP,
                EntityKind::SurveyEvent,
                record.survey_event_id.value(),
            ));
        }

        let now = Utc::now();
        let row = VegetationRecord {
            id: VegetationRecordId(data.next_id()),
            survey_event_id: record.survey_event_id,
            measurements: record.measurements.clone(),
            remarks: record.remarks.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.vegetation_records.insert(row.id.value(), row.clone());
        Ok(row)
    }

    async fn list_parent_sites(&self, include_deleted: bool) -> RepositoryResult<Vec<ParentSite>> {
        let data = self.data.read();
        data.ensure_healthy("list_parent_sites")?;
        let mut rows: Vec<ParentSite> = data
            .parent_sites
            .values()
            .filter(|p| include_deleted || !p.is_deleted())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_survey_sites(&self, include_deleted: bool) -> RepositoryResult<Vec<SurveySite>> {
        let data = self.data.read();
        data.ensure_healthy("list_survey_sites")?;
        let mut rows: Vec<SurveySite> = data
            .survey_sites
            .values()
            .filter(|s| include_deleted || !s.is_deleted())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn list_survey_events(
        &self,
        include_deleted: bool,
    ) -> RepositoryResult<Vec<SurveyEvent>> {
        let data = self.data.read();
        data.ensure_healthy("list_survey_events")?;
        let mut rows: Vec<SurveyEvent> = data
            .survey_events
            .values()
            .filter(|e| include_deleted || !e.is_deleted())
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.survey_date, e.survey_site_id, e.id));
        Ok(rows)
    }

    async fn list_species(&self, include_deleted: bool) -> RepositoryResult<Vec<Species>> {
        let data = self.data.read();
        data.ensure_healthy("list_species")?;
        let mut rows: Vec<Species> = data
            .species
            .values()
            .filter(|s| include_deleted || !s.is_deleted())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.scientific_name.cmp(&b.scientific_name));
        Ok(rows)
    }

    async fn soft_delete(&self, kind: EntityKind, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.ensure_healthy("soft_delete")?;
        let Some((deleted_at, updated_at)) = data.deletion_marker(kind, id) else {
            return Err(no_row("soft_delete", kind, id, "live"));
        };
        if deleted_at.is_some() {
            return Err(no_row("soft_delete", kind, id, "live"));
        }
        let now = Utc::now();
        *deleted_at = Some(now);
        *updated_at = now;
        log::debug!("Soft-deleted {} {}", kind, id);
        Ok(())
    }

    async fn restore(&self, kind: EntityKind, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.ensure_healthy("restore")?;
        let Some((deleted_at, updated_at)) = data.deletion_marker(kind, id) else {
            return Err(no_row("restore", kind, id, "deleted"));
        };
        if deleted_at.is_none() {
            return Err(no_row("restore", kind, id, "deleted"));
        }
        *deleted_at = None;
        *updated_at = Utc::now();
        log::debug!("Restored {} {}", kind, id);
        Ok(())
    }

    async fn species_statistics(
        &self,
        species_id: SpeciesId,
    ) -> RepositoryResult<SpeciesStatistics> {
        let data = self.data.read();
        data.ensure_healthy("species_statistics")?;
        let species = data.species.get(&species_id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("species {} does not exist", species_id),
                ErrorContext::new("species_statistics")
                    .with_entity(EntityKind::Species.as_str())
                    .with_entity_id(species_id),
            )
        })?;

        let total_events = data
            .survey_events
            .values()
            .filter(|e| !e.is_deleted())
            .count() as i64;

        let mut seen_events = BTreeSet::new();
        let counts: Vec<i64> = data
            .ant_records
            .values()
            .filter(|r| r.species_id == species_id && !r.is_deleted())
            .filter(|r| data.live_survey_event(r.survey_event_id).is_some())
            .filter(|r| seen_events.insert(r.survey_event_id))
            .map(|r| r.count)
            .collect();

        Ok(SpeciesStatistics::from_counts(
            species_id,
            species.scientific_name.clone(),
            &counts,
            total_events,
        ))
    }
}

#[async_trait]
impl AnalyticsRepository for LocalRepository {
    async fn fetch_occurrences(
        &self,
        unit: AggregationUnit,
    ) -> RepositoryResult<Vec<OccurrenceTuple>> {
        let data = self.data.read();
        data.ensure_healthy("fetch_occurrences")?;

        let mut tuples = Vec::new();
        for row in data.unit_rows(unit) {
            let before = tuples.len();
            for event in &row.events {
                for record in data.live_records_of(event.id) {
                    let species = data
                        .species
                        .get(&record.species_id.value())
                        .map(|s| s.scientific_name.clone());
                    tuples.push(OccurrenceTuple::new(
                        row.id,
                        row.label.clone(),
                        species,
                        Some(record.count),
                    ));
                }
            }
            if tuples.len() == before {
                tuples.push(OccurrenceTuple::empty(row.id, row.label));
            }
        }
        log::debug!("Fetched {} occurrence tuples for unit {}", tuples.len(), unit);
        Ok(tuples)
    }

    async fn fetch_vegetation(
        &self,
        unit: AggregationUnit,
    ) -> RepositoryResult<Vec<VegetationObservation>> {
        let data = self.data.read();
        data.ensure_healthy("fetch_vegetation")?;

        let mut observations = Vec::new();
        for row in data.unit_rows(unit) {
            let before = observations.len();
            for event in &row.events {
                for record in data.live_vegetation_of(event.id) {
                    observations.push(VegetationObservation {
                        unit_id: row.id,
                        label: row.label.clone(),
                        measurements: Some(record.measurements.clone()),
                    });
                }
            }
            if observations.len() == before {
                observations.push(VegetationObservation {
                    unit_id: row.id,
                    label: row.label,
                    measurements: None,
                });
            }
        }
        log::debug!(
            "Fetched {} vegetation observations for unit {}",
            observations.len(),
            unit
        );
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_unhealthy_store_fails_with_connection_error() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        let err = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert!(err.is_retryable());
        repo.set_healthy(true);
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_event_labels_and_order() {
        let repo = LocalRepository::new();
        let parent = repo
            .create_parent_site(&NewParentSite::new("Mt. Tsukuba", 36.2, 140.1))
            .await
            .unwrap();
        let site = repo
            .create_survey_site(&NewSurveySite::new(parent.id, "Summit", 36.2, 140.1))
            .await
            .unwrap();
        repo.create_survey_event(&NewSurveyEvent::new(site.id, date(20)))
            .await
            .unwrap();
        repo.create_survey_event(&NewSurveyEvent::new(site.id, date(3)))
            .await
            .unwrap();

        let tuples = repo.fetch_occurrences(AggregationUnit::Event).await.unwrap();
        let labels: Vec<&str> = tuples.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Summit_2024-06-03", "Summit_2024-06-20"]);
        assert!(tuples.iter().all(|t| t.species.is_none() && t.count.is_none()));
    }

    #[tokio::test]
    async fn test_deleted_marker_round_trip() {
        let repo = LocalRepository::new();
        let species = repo
            .create_species(&NewSpecies::new("Formica japonica"))
            .await
            .unwrap();
        let id = species.id.value();
        assert!(repo.restore(EntityKind::Species, id).await.unwrap_err().is_not_found());
        repo.soft_delete(EntityKind::Species, id).await.unwrap();
        assert!(repo
            .soft_delete(EntityKind::Species, id)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo.list_species(false).await.unwrap().is_empty());
        assert_eq!(repo.list_species(true).await.unwrap().len(), 1);
        repo.restore(EntityKind::Species, id).await.unwrap();
        assert_eq!(repo.list_species(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_resets_store() {
        let repo = LocalRepository::new();
        repo.create_species(&NewSpecies::new("Lasius japonicus"))
            .await
            .unwrap();
        repo.clear();
        assert!(repo.list_species(true).await.unwrap().is_empty());
    }
}
