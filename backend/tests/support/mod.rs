//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use ant_survey::api::{
    NewAntRecord, NewParentSite, NewSpecies, NewSurveyEvent, NewSurveySite, NewVegetationRecord,
    Species, SurveyEvent, SurveySite, VegetationMeasurements,
};
use ant_survey::db::SurveyRepository;
use chrono::NaiveDate;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment across tests running in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

/// Entities created by [`seed_survey`].
pub struct SurveyFixture {
    pub ridge: SurveySite,
    pub valley: SurveySite,
    pub summit: SurveySite,
    pub ridge_june: SurveyEvent,
    pub ridge_july: SurveyEvent,
    pub valley_june: SurveyEvent,
    pub summit_june: SurveyEvent,
    pub formica: Species,
    pub lasius: Species,
    pub camponotus: Species,
}

/// Two parent sites with three survey sites.
///
/// | event              | ant counts                 | canopy | light |
/// |--------------------|----------------------------|--------|-------|
/// | Ridge 2024-06-03   | Formica 5, Lasius 3        | 80     | 3     |
/// | Ridge 2024-07-01   | Formica 2                  | 60     | -     |
/// | Valley 2024-06-10  | Camponotus 4               | 30     | 1     |
/// | Summit 2024-06-20  | -                          | -      | -     |
pub async fn seed_survey<R: SurveyRepository + ?Sized>(repo: &R) -> SurveyFixture {
    let takao = repo
        .create_parent_site(&NewParentSite::new("Mt. Takao", 35.62, 139.24))
        .await
        .unwrap();
    let tsukuba = repo
        .create_parent_site(&NewParentSite::new("Mt. Tsukuba", 36.22, 140.1))
        .await
        .unwrap();

    let ridge = repo
        .create_survey_site(&NewSurveySite::new(takao.id, "Ridge", 35.63, 139.25))
        .await
        .unwrap();
    let valley = repo
        .create_survey_site(&NewSurveySite::new(takao.id, "Valley", 35.61, 139.23))
        .await
        .unwrap();
    let summit = repo
        .create_survey_site(&NewSurveySite::new(tsukuba.id, "Summit", 36.23, 140.1))
        .await
        .unwrap();

    let formica = repo
        .create_species(&NewSpecies::new("Formica japonica"))
        .await
        .unwrap();
    let lasius = repo
        .create_species(&NewSpecies::new("Lasius japonicus"))
        .await
        .unwrap();
    let camponotus = repo
        .create_species(&NewSpecies::new("Camponotus japonicus"))
        .await
        .unwrap();

    let ridge_june = repo
        .create_survey_event(&NewSurveyEvent::new(ridge.id, date(6, 3)))
        .await
        .unwrap();
    let ridge_july = repo
        .create_survey_event(&NewSurveyEvent::new(ridge.id, date(7, 1)))
        .await
        .unwrap();
    let valley_june = repo
        .create_survey_event(&NewSurveyEvent::new(valley.id, date(6, 10)))
        .await
        .unwrap();
    let summit_june = repo
        .create_survey_event(&NewSurveyEvent::new(summit.id, date(6, 20)))
        .await
        .unwrap();

    for (event, species, count) in [
        (&ridge_june, &formica, 5),
        (&ridge_june, &lasius, 3),
        (&ridge_july, &formica, 2),
        (&valley_june, &camponotus, 4),
    ] {
        repo.create_ant_record(&NewAntRecord::new(event.id, species.id, count))
            .await
            .unwrap();
    }

    for (event, canopy, light) in [
        (&ridge_june, 80.0, Some(3)),
        (&ridge_july, 60.0, None),
        (&valley_june, 30.0, Some(1)),
    ] {
        let measurements = VegetationMeasurements {
            dominant_tree: Some("Quercus serrata".to_string()),
            canopy_coverage: Some(canopy),
            light_condition: light,
            ..Default::default()
        };
        repo.create_vegetation_record(&NewVegetationRecord::new(event.id, measurements))
            .await
            .unwrap();
    }

    SurveyFixture {
        ridge,
        valley,
        summit,
        ridge_june,
        ridge_july,
        valley_june,
        summit_june,
        formica,
        lasius,
        camponotus,
    }
}
