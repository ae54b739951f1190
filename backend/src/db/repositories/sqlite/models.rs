use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Nullable, Text};

use super::schema::{
    ant_records, parent_sites, species, survey_events, survey_sites, vegetation_records,
};
use crate::api::*;
use crate::db::repository::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parent_sites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ParentSiteRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub area: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parent_sites)]
pub struct NewParentSiteRow<'a> {
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub area: Option<f64>,
    pub remarks: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewParentSiteRow<'a> {
    pub fn new(site: &'a NewParentSite, now: NaiveDateTime) -> Self {
        Self {
            name: &site.name,
            latitude: site.latitude,
            longitude: site.longitude,
            altitude: site.altitude,
            area: site.area,
            remarks: site.remarks.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<ParentSiteRow> for ParentSite {
    fn from(row: ParentSiteRow) -> Self {
        ParentSite {
            id: ParentSiteId(row.id),
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            altitude: row.altitude,
            area: row.area,
            remarks: row.remarks,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            deleted_at: row.deleted_at.map(|t| t.and_utc()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = survey_sites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SurveySiteRow {
    pub id: i64,
    pub parent_site_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub area: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = survey_sites)]
pub struct NewSurveySiteRow<'a> {
    pub parent_site_id: i64,
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub area: Option<f64>,
    pub remarks: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewSurveySiteRow<'a> {
    pub fn new(site: &'a NewSurveySite, now: NaiveDateTime) -> Self {
        Self {
            parent_site_id: site.parent_site_id.value(),
            name: &site.name,
            latitude: site.latitude,
            longitude: site.longitude,
            altitude: site.altitude,
            area: site.area,
            remarks: site.remarks.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<SurveySiteRow> for SurveySite {
    fn from(row: SurveySiteRow) -> Self {
        SurveySite {
            id: SurveySiteId(row.id),
            parent_site_id: ParentSiteId(row.parent_site_id),
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            altitude: row.altitude,
            area: row.area,
            remarks: row.remarks,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            deleted_at: row.deleted_at.map(|t| t.and_utc()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = survey_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SurveyEventRow {
    pub id: i64,
    pub survey_site_id: i64,
    pub survey_date: NaiveDate,
    pub surveyor_name: Option<String>,
    pub weather: Option<String>,
    pub temperature: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = survey_events)]
pub struct NewSurveyEventRow<'a> {
    pub survey_site_id: i64,
    pub survey_date: NaiveDate,
    pub surveyor_name: Option<&'a str>,
    pub weather: Option<&'static str>,
    pub temperature: Option<f64>,
    pub remarks: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewSurveyEventRow<'a> {
    pub fn new(event: &'a NewSurveyEvent, now: NaiveDateTime) -> Self {
        Self {
            survey_site_id: event.survey_site_id.value(),
            survey_date: event.survey_date,
            surveyor_name: event.surveyor_name.as_deref(),
            weather: event.weather.map(|w| w.as_str()),
            temperature: event.temperature,
            remarks: event.remarks.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<SurveyEventRow> for SurveyEvent {
    type Error = RepositoryError;

    fn try_from(row: SurveyEventRow) -> RepositoryResult<Self> {
        let weather = row
            .weather
            .as_deref()
            .map(str::parse::<Weather>)
            .transpose()
            .map_err(|e| {
                RepositoryError::internal(format!("Corrupt weather in event {}: {}", row.id, e))
            })?;
        Ok(SurveyEvent {
            id: SurveyEventId(row.id),
            survey_site_id: SurveySiteId(row.survey_site_id),
            survey_date: row.survey_date,
            surveyor_name: row.surveyor_name,
            weather,
            temperature: row.temperature,
            remarks: row.remarks,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            deleted_at: row.deleted_at.map(|t| t.and_utc()),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = species)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SpeciesRow {
    pub id: i64,
    pub scientific_name: String,
    pub genus: Option<String>,
    pub subfamily: Option<String>,
    pub ja_name: Option<String>,
    pub ja_genus: Option<String>,
    pub ja_subfamily: Option<String>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = species)]
pub struct NewSpeciesRow<'a> {
    pub scientific_name: &'a str,
    pub genus: Option<&'a str>,
    pub subfamily: Option<&'a str>,
    pub ja_name: Option<&'a str>,
    pub ja_genus: Option<&'a str>,
    pub ja_subfamily: Option<&'a str>,
    pub remarks: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewSpeciesRow<'a> {
    pub fn new(species: &'a NewSpecies, now: NaiveDateTime) -> Self {
        Self {
            scientific_name: &species.scientific_name,
            genus: species.genus.as_deref(),
            subfamily: species.subfamily.as_deref(),
            ja_name: species.ja_name.as_deref(),
            ja_genus: species.ja_genus.as_deref(),
            ja_subfamily: species.ja_subfamily.as_deref(),
            remarks: species.remarks.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<SpeciesRow> for Species {
    fn from(row: SpeciesRow) -> Self {
        Species {
            id: SpeciesId(row.id),
            scientific_name: row.scientific_name,
            genus: row.genus,
            subfamily: row.subfamily,
            ja_name: row.ja_name,
            ja_genus: row.ja_genus,
            ja_subfamily: row.ja_subfamily,
            remarks: row.remarks,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            deleted_at: row.deleted_at.map(|t| t.and_utc()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ant_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AntRecordRow {
    pub id: i64,
    pub survey_event_id: i64,
    pub species_id: i64,
    pub count: i64,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ant_records)]
pub struct NewAntRecordRow<'a> {
    pub survey_event_id: i64,
    pub species_id: i64,
    pub count: i64,
    pub remarks: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewAntRecordRow<'a> {
    pub fn new(record: &'a NewAntRecord, now: NaiveDateTime) -> Self {
        Self {
            survey_event_id: record.survey_event_id.value(),
            species_id: record.species_id.value(),
            count: record.count,
            remarks: record.remarks.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<AntRecordRow> for AntRecord {
    fn from(row: AntRecordRow) -> Self {
        AntRecord {
            id: AntRecordId(row.id),
            survey_event_id: SurveyEventId(row.survey_event_id),
            species_id: SpeciesId(row.species_id),
            count: row.count,
            remarks: row.remarks,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            deleted_at: row.deleted_at.map(|t| t.and_utc()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vegetation_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VegetationRecordRow {
    pub id: i64,
    pub survey_event_id: i64,
    pub dominant_tree: Option<String>,
    pub dominant_pretree: Option<String>,
    pub dominant_sasa: Option<String>,
    pub dominant_herb: Option<String>,
    pub litter_type: Option<String>,
    pub avg_tree_height: Option<f64>,
    pub avg_pretree_height: Option<f64>,
    pub avg_sasa_height: Option<f64>,
    pub avg_herb_height: Option<f64>,
    pub avg_litter_height: Option<f64>,
    pub canopy_coverage: Option<f64>,
    pub precanopy_coverage: Option<f64>,
    pub sasa_coverage: Option<f64>,
    pub herb_coverage: Option<f64>,
    pub litter_coverage: Option<f64>,
    pub vegetation_rate: Option<f64>,
    pub light_condition: Option<i32>,
    pub soil_moisture: Option<i32>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vegetation_records)]
pub struct NewVegetationRecordRow<'a> {
    pub survey_event_id: i64,
    pub dominant_tree: Option<&'a str>,
    pub dominant_pretree: Option<&'a str>,
    pub dominant_sasa: Option<&'a str>,
    pub dominant_herb: Option<&'a str>,
    pub litter_type: Option<&'a str>,
    pub avg_tree_height: Option<f64>,
    pub avg_pretree_height: Option<f64>,
    pub avg_sasa_height: Option<f64>,
    pub avg_herb_height: Option<f64>,
    pub avg_litter_height: Option<f64>,
    pub canopy_coverage: Option<f64>,
    pub precanopy_coverage: Option<f64>,
    pub sasa_coverage: Option<f64>,
    pub herb_coverage: Option<f64>,
    pub litter_coverage: Option<f64>,
    pub vegetation_rate: Option<f64>,
    pub light_condition: Option<i32>,
    pub soil_moisture: Option<i32>,
    pub remarks: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewVegetationRecordRow<'a> {
    pub fn new(record: &'a NewVegetationRecord, now: NaiveDateTime) -> Self {
        let m = &record.measurements;
        Self {
            survey_event_id: record.survey_event_id.value(),
            dominant_tree: m.dominant_tree.as_deref(),
            dominant_pretree: m.dominant_pretree.as_deref(),
            dominant_sasa: m.dominant_sasa.as_deref(),
            dominant_herb: m.dominant_herb.as_deref(),
            litter_type: m.litter_type.as_deref(),
            avg_tree_height: m.avg_tree_height,
            avg_pretree_height: m.avg_pretree_height,
            avg_sasa_height: m.avg_sasa_height,
            avg_herb_height: m.avg_herb_height,
            avg_litter_height: m.avg_litter_height,
            canopy_coverage: m.canopy_coverage,
            precanopy_coverage: m.precanopy_coverage,
            sasa_coverage: m.sasa_coverage,
            herb_coverage: m.herb_coverage,
            litter_coverage: m.litter_coverage,
            vegetation_rate: m.vegetation_rate,
            light_condition: m.light_condition,
            soil_moisture: m.soil_moisture,
            remarks: record.remarks.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<VegetationRecordRow> for VegetationRecord {
    fn from(row: VegetationRecordRow) -> Self {
        VegetationRecord {
            id: VegetationRecordId(row.id),
            survey_event_id: SurveyEventId(row.survey_event_id),
            measurements: VegetationMeasurements {
                dominant_tree: row.dominant_tree,
                dominant_pretree: row.dominant_pretree,
                dominant_sasa: row.dominant_sasa,
                dominant_herb: row.dominant_herb,
                litter_type: row.litter_type,
                avg_tree_height: row.avg_tree_height,
                avg_pretree_height: row.avg_pretree_height,
                avg_sasa_height: row.avg_sasa_height,
                avg_herb_height: row.avg_herb_height,
                avg_litter_height: row.avg_litter_height,
                canopy_coverage: row.canopy_coverage,
                precanopy_coverage: row.precanopy_coverage,
                sasa_coverage: row.sasa_coverage,
                herb_coverage: row.herb_coverage,
                litter_coverage: row.litter_coverage,
                vegetation_rate: row.vegetation_rate,
                light_condition: row.light_condition,
                soil_moisture: row.soil_moisture,
            },
            remarks: row.remarks,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            deleted_at: row.deleted_at.map(|t| t.and_utc()),
        }
    }
}

/// Row of the occurrence join, read with `sql_query`.
#[derive(Debug, Clone, QueryableByName)]
pub struct OccurrenceJoinRow {
    #[diesel(sql_type = BigInt)]
    pub unit_id: i64,
    #[diesel(sql_type = Text)]
    pub label: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub species: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub count: Option<i64>,
}

impl From<OccurrenceJoinRow> for OccurrenceTuple {
    fn from(row: OccurrenceJoinRow) -> Self {
        OccurrenceTuple::new(row.unit_id, row.label, row.species, row.count)
    }
}

/// Row of the vegetation join; `record_id` is null when the unit has no
/// live vegetation record.
#[derive(Debug, Clone, QueryableByName)]
pub struct VegetationJoinRow {
    #[diesel(sql_type = BigInt)]
    pub unit_id: i64,
    #[diesel(sql_type = Text)]
    pub label: String,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub record_id: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub dominant_tree: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub dominant_pretree: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub dominant_sasa: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub dominant_herb: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub litter_type: Option<String>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_tree_height: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_pretree_height: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_sasa_height: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_herb_height: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_litter_height: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub canopy_coverage: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub precanopy_coverage: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub sasa_coverage: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub herb_coverage: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub litter_coverage: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub vegetation_rate: Option<f64>,
    #[diesel(sql_type = Nullable<Integer>)]
    pub light_condition: Option<i32>,
    #[diesel(sql_type = Nullable<Integer>)]
    pub soil_moisture: Option<i32>,
}

impl From<VegetationJoinRow> for VegetationObservation {
    fn from(row: VegetationJoinRow) -> Self {
        let measurements = row.record_id.map(|_| VegetationMeasurements {
            dominant_tree: row.dominant_tree,
            dominant_pretree: row.dominant_pretree,
            dominant_sasa: row.dominant_sasa,
            dominant_herb: row.dominant_herb,
            litter_type: row.litter_type,
            avg_tree_height: row.avg_tree_height,
            avg_pretree_height: row.avg_pretree_height,
            avg_sasa_height: row.avg_sasa_height,
            avg_herb_height: row.avg_herb_height,
            avg_litter_height: row.avg_litter_height,
            canopy_coverage: row.canopy_coverage,
            precanopy_coverage: row.precanopy_coverage,
            sasa_coverage: row.sasa_coverage,
            herb_coverage: row.herb_coverage,
            litter_coverage: row.litter_coverage,
            vegetation_rate: row.vegetation_rate,
            light_condition: row.light_condition,
            soil_moisture: row.soil_moisture,
        });
        VegetationObservation {
            unit_id: row.unit_id,
            label: row.label,
            measurements,
        }
    }
}
