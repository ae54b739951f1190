//! Record store entities.
//!
//! The survey hierarchy is parent site → survey site → survey event; ant
//! records and vegetation records hang off an event. Every entity carries
//! a `deleted_at` marker for logical deletion. `New*` structs are the
//! insert forms; their `validate` methods enforce the column ranges that
//! the SQL schema also declares as CHECK constraints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::distribution::round_half_even;
use crate::api::{
    AntRecordId, ParentSiteId, SpeciesId, SurveyEventId, SurveySiteId, VegetationRecordId,
};
use crate::models::VegetationField;

pub const LATITUDE_RANGE: (f64, f64) = (20.0, 46.0);
pub const LONGITUDE_RANGE: (f64, f64) = (122.0, 154.0);
pub const ALTITUDE_RANGE: (f64, f64) = (-500.0, 4000.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (-30.0, 50.0);
pub const COVERAGE_RANGE: (f64, f64) = (0.0, 100.0);
pub const ORDINAL_SCALE_RANGE: (i32, i32) = (1, 5);

const SITE_REMARKS_MAX: usize = 2000;
const RECORD_REMARKS_MAX: usize = 500;
const NAME_MAX: usize = 200;
const SURVEYOR_MAX: usize = 100;

/// Result of a field validation: the first offending field, described.
pub type FieldCheck = Result<(), String>;

/// Kind of entity addressed by logical deletion and restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ParentSite,
    SurveySite,
    SurveyEvent,
    Species,
    AntRecord,
    VegetationRecord,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::ParentSite => "parent_site",
            EntityKind::SurveySite => "survey_site",
            EntityKind::SurveyEvent => "survey_event",
            EntityKind::Species => "species",
            EntityKind::AntRecord => "ant_record",
            EntityKind::VegetationRecord => "vegetation_record",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather recorded for a survey event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rain,
    Snow,
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rain => "rain",
            Weather::Snow => "snow",
        }
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunny" => Ok(Weather::Sunny),
            "cloudy" => Ok(Weather::Cloudy),
            "rain" => Ok(Weather::Rain),
            "snow" => Ok(Weather::Snow),
            other => Err(format!("unknown weather: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentSite {
    pub id: ParentSiteId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub area: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ParentSite {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParentSite {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewParentSite {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            altitude: None,
            area: None,
            remarks: None,
        }
    }

    pub fn validate(&self) -> FieldCheck {
        check_name("name", &self.name, NAME_MAX)?;
        check_location(self.latitude, self.longitude, self.altitude, self.area)?;
        check_text_len("remarks", self.remarks.as_deref(), SITE_REMARKS_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySite {
    pub id: SurveySiteId,
    pub parent_site_id: ParentSiteId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub area: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SurveySite {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSurveySite {
    pub parent_site_id: ParentSiteId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewSurveySite {
    pub fn new(
        parent_site_id: ParentSiteId,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            parent_site_id,
            name: name.into(),
            latitude,
            longitude,
            altitude: None,
            area: None,
            remarks: None,
        }
    }

    pub fn validate(&self) -> FieldCheck {
        check_name("name", &self.name, NAME_MAX)?;
        check_location(self.latitude, self.longitude, self.altitude, self.area)?;
        check_text_len("remarks", self.remarks.as_deref(), SITE_REMARKS_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyEvent {
    pub id: SurveyEventId,
    pub survey_site_id: SurveySiteId,
    pub survey_date: NaiveDate,
    pub surveyor_name: Option<String>,
    pub weather: Option<Weather>,
    pub temperature: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SurveyEvent {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSurveyEvent {
    pub survey_site_id: SurveySiteId,
    pub survey_date: NaiveDate,
    #[serde(default)]
    pub surveyor_name: Option<String>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewSurveyEvent {
    pub fn new(survey_site_id: SurveySiteId, survey_date: NaiveDate) -> Self {
        Self {
            survey_site_id,
            survey_date,
            surveyor_name: None,
            weather: None,
            temperature: None,
            remarks: None,
        }
    }

    pub fn validate(&self) -> FieldCheck {
        check_text_len("surveyor_name", self.surveyor_name.as_deref(), SURVEYOR_MAX)?;
        check_range("temperature", self.temperature, TEMPERATURE_RANGE)?;
        check_text_len("remarks", self.remarks.as_deref(), SITE_REMARKS_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub scientific_name: String,
    pub genus: Option<String>,
    pub subfamily: Option<String>,
    pub ja_name: Option<String>,
    pub ja_genus: Option<String>,
    pub ja_subfamily: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Species {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewSpecies {
    pub scientific_name: String,
    #[serde(default)]
    pub genus: Option<String>,
    #[serde(default)]
    pub subfamily: Option<String>,
    #[serde(default)]
    pub ja_name: Option<String>,
    #[serde(default)]
    pub ja_genus: Option<String>,
    #[serde(default)]
    pub ja_subfamily: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewSpecies {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> FieldCheck {
        check_name("scientific_name", &self.scientific_name, NAME_MAX)?;
        if !is_scientific_name(&self.scientific_name) {
            return Err(format!(
                "scientific_name '{}' is not of the form 'Genus species [subspecies]'",
                self.scientific_name
            ));
        }
        for (field, value) in [
            ("genus", &self.genus),
            ("subfamily", &self.subfamily),
            ("ja_name", &self.ja_name),
            ("ja_genus", &self.ja_genus),
            ("ja_subfamily", &self.ja_subfamily),
        ] {
            check_text_len(field, value.as_deref(), NAME_MAX)?;
        }
        check_text_len("remarks", self.remarks.as_deref(), SITE_REMARKS_MAX)
    }
}

/// Whether `name` is a capitalised genus followed by one or two lowercase
/// epithets, separated by single whitespace characters.
pub fn is_scientific_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split(char::is_whitespace).collect();
    if !(2..=3).contains(&parts.len()) {
        return false;
    }
    let genus = parts[0];
    let mut chars = genus.chars();
    let genus_ok = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && genus.len() > 1
        && chars.all(|c| c.is_ascii_lowercase());
    genus_ok
        && parts[1..]
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntRecord {
    pub id: AntRecordId,
    pub survey_event_id: SurveyEventId,
    pub species_id: SpeciesId,
    pub count: i64,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AntRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAntRecord {
    pub survey_event_id: SurveyEventId,
    pub species_id: SpeciesId,
    pub count: i64,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewAntRecord {
    pub fn new(survey_event_id: SurveyEventId, species_id: SpeciesId, count: i64) -> Self {
        Self {
            survey_event_id,
            species_id,
            count,
            remarks: None,
        }
    }

    pub fn validate(&self) -> FieldCheck {
        if self.count < 0 {
            return Err(format!("count must be >= 0, got {}", self.count));
        }
        check_text_len("remarks", self.remarks.as_deref(), RECORD_REMARKS_MAX)
    }
}

/// The measured columns of a vegetation record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationMeasurements {
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
}

impl VegetationMeasurements {
    /// Text value of a descriptive column; `None` for numeric columns.
    pub fn text(&self, field: VegetationField) -> Option<&str> {
        let value = match field {
            VegetationField::DominantTree => &self.dominant_tree,
            VegetationField::DominantPretree => &self.dominant_pretree,
            VegetationField::DominantSasa => &self.dominant_sasa,
            VegetationField::DominantHerb => &self.dominant_herb,
            VegetationField::LitterType => &self.litter_type,
            _ => return None,
        };
        value.as_deref()
    }

    /// Numeric value of a measured column; `None` for text columns.
    pub fn numeric(&self, field: VegetationField) -> Option<f64> {
        match field {
            VegetationField::AvgTreeHeight => self.avg_tree_height,
            VegetationField::AvgPretreeHeight => self.avg_pretree_height,
            VegetationField::AvgSasaHeight => self.avg_sasa_height,
            VegetationField::AvgHerbHeight => self.avg_herb_height,
            VegetationField::AvgLitterHeight => self.avg_litter_height,
            VegetationField::CanopyCoverage => self.canopy_coverage,
            VegetationField::PrecanopyCoverage => self.precanopy_coverage,
            VegetationField::SasaCoverage => self.sasa_coverage,
            VegetationField::HerbCoverage => self.herb_coverage,
            VegetationField::LitterCoverage => self.litter_coverage,
            VegetationField::VegetationRate => self.vegetation_rate,
            VegetationField::LightCondition => self.light_condition.map(f64::from),
            VegetationField::SoilMoisture => self.soil_moisture.map(f64::from),
            _ => None,
        }
    }

    pub fn validate(&self) -> FieldCheck {
        for field in VegetationField::ALL {
            if !field.is_numeric() {
                check_text_len(field.as_str(), self.text(*field), NAME_MAX)?;
            }
        }
        for (field, value) in [
            ("avg_tree_height", self.avg_tree_height),
            ("avg_pretree_height", self.avg_pretree_height),
            ("avg_sasa_height", self.avg_sasa_height),
            ("avg_herb_height", self.avg_herb_height),
            ("avg_litter_height", self.avg_litter_height),
        ] {
            if let Some(v) = value {
                if !(v >= 0.0) {
                    return Err(format!("{} must be >= 0, got {}", field, v));
                }
            }
        }
        for (field, value) in [
            ("canopy_coverage", self.canopy_coverage),
            ("precanopy_coverage", self.precanopy_coverage),
            ("sasa_coverage", self.sasa_coverage),
            ("herb_coverage", self.herb_coverage),
            ("litter_coverage", self.litter_coverage),
            ("vegetation_rate", self.vegetation_rate),
        ] {
            check_range(field, value, COVERAGE_RANGE)?;
        }
        for (field, value) in [
            ("light_condition", self.light_condition),
            ("soil_moisture", self.soil_moisture),
        ] {
            if let Some(v) = value {
                let (lo, hi) = ORDINAL_SCALE_RANGE;
                if v < lo || v > hi {
                    return Err(format!("{} must be in [{}, {}], got {}", field, lo, hi, v));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationRecord {
    pub id: VegetationRecordId,
    pub survey_event_id: SurveyEventId,
    #[serde(flatten)]
    pub measurements: VegetationMeasurements,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VegetationRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVegetationRecord {
    pub survey_event_id: SurveyEventId,
    #[serde(flatten)]
    pub measurements: VegetationMeasurements,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewVegetationRecord {
    pub fn new(survey_event_id: SurveyEventId, measurements: VegetationMeasurements) -> Self {
        Self {
            survey_event_id,
            measurements,
            remarks: None,
        }
    }

    pub fn validate(&self) -> FieldCheck {
        self.measurements.validate()?;
        check_text_len("remarks", self.remarks.as_deref(), SITE_REMARKS_MAX)
    }
}

/// One row of the occurrence join: an aggregation-unit row and, when a
/// live ant record exists below it, the species and its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceTuple {
    pub unit_id: i64,
    pub label: String,
    pub species: Option<String>,
    pub count: Option<i64>,
}

impl OccurrenceTuple {
    pub fn new(
        unit_id: i64,
        label: impl Into<String>,
        species: Option<String>,
        count: Option<i64>,
    ) -> Self {
        Self {
            unit_id,
            label: label.into(),
            species,
            count,
        }
    }

    /// A unit row with nothing recorded beneath it.
    pub fn empty(unit_id: i64, label: impl Into<String>) -> Self {
        Self::new(unit_id, label, None, None)
    }
}

/// One row of the vegetation join: an aggregation-unit row and the
/// measurements of one live vegetation record below it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationObservation {
    pub unit_id: i64,
    pub label: String,
    pub measurements: Option<VegetationMeasurements>,
}

/// Occurrence summary of a single species across live survey events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStatistics {
    pub species_id: SpeciesId,
    pub scientific_name: String,
    pub occurrence_count: i64,
    pub total_events: i64,
    pub occurrence_rate: f64,
    pub avg_count: f64,
    pub max_count: i64,
    pub min_count: i64,
}

impl SpeciesStatistics {
    /// Builds the summary from the counts of live records of the species,
    /// one per distinct event, and the number of live events overall.
    pub fn from_counts(
        species_id: SpeciesId,
        scientific_name: impl Into<String>,
        counts: &[i64],
        total_events: i64,
    ) -> Self {
        let occurrence_count = counts.len() as i64;
        let occurrence_rate = if total_events > 0 {
            round2(100.0 * occurrence_count as f64 / total_events as f64)
        } else {
            0.0
        };
        let avg_count = if counts.is_empty() {
            0.0
        } else {
            round2(counts.iter().sum::<i64>() as f64 / counts.len() as f64)
        };
        Self {
            species_id,
            scientific_name: scientific_name.into(),
            occurrence_count,
            total_events,
            occurrence_rate,
            avg_count,
            max_count: counts.iter().copied().max().unwrap_or(0),
            min_count: counts.iter().copied().min().unwrap_or(0),
        }
    }
}

fn round2(value: f64) -> f64 {
    round_half_even(value, 2)
}

fn check_name(field: &str, value: &str, max: usize) -> FieldCheck {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    check_text_len(field, Some(value), max)
}

fn check_text_len(field: &str, value: Option<&str>, max: usize) -> FieldCheck {
    match value {
        Some(v) if v.chars().count() > max => Err(format!(
            "{} exceeds {} characters ({})",
            field,
            max,
            v.chars().count()
        )),
        _ => Ok(()),
    }
}

fn check_range(field: &str, value: Option<f64>, (lo, hi): (f64, f64)) -> FieldCheck {
    match value {
        Some(v) if !(lo..=hi).contains(&v) => {
            Err(format!("{} must be in [{}, {}], got {}", field, lo, hi, v))
        }
        _ => Ok(()),
    }
}

fn check_location(
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    area: Option<f64>,
) -> FieldCheck {
    check_range("latitude", Some(latitude), LATITUDE_RANGE)?;
    check_range("longitude", Some(longitude), LONGITUDE_RANGE)?;
    check_range("altitude", altitude, ALTITUDE_RANGE)?;
    match area {
        Some(a) if !(a > 0.0) => Err(format!("area must be > 0, got {}", a)),
        _ => Ok(()),
    }
}
