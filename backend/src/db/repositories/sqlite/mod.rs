//! SQLite repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Foreign keys and busy timeout enabled on every pooled connection
//! - Automatic retry for transient failures (locked database, pool exhaustion)
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `SQLITE_DATABASE_PATH`: Database file path, or `:memory:` (required)
//! - `SQLITE_POOL_MAX`: Maximum pool size (default: 4)
//! - `SQLITE_BUSY_TIMEOUT_MS`: Busy timeout in milliseconds (default: 5000)
//! - `SQLITE_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `SQLITE_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Timestamp};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task;

use crate::api::*;
use crate::db::repository::{
    AnalyticsRepository, ErrorContext, RepositoryError, RepositoryResult, SurveyRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/sqlite/migrations");

/// Configuration for opening the SQLite database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file path; `:memory:` for a private in-memory database
    pub database_path: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How long a connection waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: String::new(),
            max_connections: 4,
            busy_timeout_ms: 5000,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl SqliteConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_path = std::env::var("SQLITE_DATABASE_PATH")
            .map_err(|_| "SQLITE_DATABASE_PATH must be set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_path,
            max_connections: env_or("SQLITE_POOL_MAX", defaults.max_connections),
            busy_timeout_ms: env_or("SQLITE_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms),
            max_retries: env_or("SQLITE_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("SQLITE_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database path.
    pub fn with_path(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[derive(Debug)]
struct ConnectionPragmas {
    busy_timeout_ms: u64,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Diesel-backed record store over SQLite.
#[derive(Clone, Debug)]
pub struct SqliteRepository {
    pool: SqlitePool,
    config: SqliteConfig,
}

impl SqliteRepository {
    /// Open the database, build the pool and run pending migrations.
    pub fn new(config: SqliteConfig) -> RepositoryResult<Self> {
        if config.database_path.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "SQLite database path must not be empty",
            ));
        }

        // Each connection to `:memory:` opens its own database.
        let max_size = if config.is_in_memory() {
            1
        } else {
            config.max_connections.max(1)
        };

        let manager = ConnectionManager::<SqliteConnection>::new(&config.database_path);
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_customizer(Box::new(ConnectionPragmas {
                busy_timeout_ms: config.busy_timeout_ms,
            }))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool").with_details(format!(
                        "path={}, max_size={}",
                        config.database_path, max_size
                    )),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!("Opened SQLite record store at {}", config.database_path);
        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut SqliteConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    log::debug!("Retrying SQLite operation (attempt {})", attempt + 1);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn last_insert_id(conn: &mut SqliteConnection) -> RepositoryResult<i64> {
    diesel::select(diesel::dsl::sql::<BigInt>("last_insert_rowid()"))
        .get_result(conn)
        .map_err(RepositoryError::from)
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

fn table_of(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::ParentSite => "parent_sites",
        EntityKind::SurveySite => "survey_sites",
        EntityKind::SurveyEvent => "survey_events",
        EntityKind::Species => "species",
        EntityKind::AntRecord => "ant_records",
        EntityKind::VegetationRecord => "vegetation_records",
    }
}

/// Sets or clears `deleted_at` on the row in the opposite state.
fn mark_deleted(
    conn: &mut SqliteConnection,
    operation: &str,
    kind: EntityKind,
    id: i64,
    deleted: bool,
) -> RepositoryResult<()> {
    let (set, current, state) = if deleted {
        ("deleted_at = ?", "deleted_at IS NULL", "live")
    } else {
        ("deleted_at = NULL", "deleted_at IS NOT NULL", "deleted")
    };
    let sql = format!(
        "UPDATE {} SET {}, updated_at = ? WHERE id = ? AND {}",
        table_of(kind),
        set,
        current
    );
    let stamp = now();
    let affected = if deleted {
        sql_query(sql)
            .bind::<Timestamp, _>(stamp)
            .bind::<Timestamp, _>(stamp)
            .bind::<BigInt, _>(id)
            .execute(conn)?
    } else {
        sql_query(sql)
            .bind::<Timestamp, _>(stamp)
            .bind::<BigInt, _>(id)
            .execute(conn)?
    };

    if affected == 0 {
        return Err(RepositoryError::not_found_with_context(
            format!("no {} {} with id {}", state, kind, id),
            ErrorContext::new(operation)
                .with_entity(kind.as_str())
                .with_entity_id(id),
        ));
    }
    Ok(())
}

/// `SELECT` head, `FROM` clause, filter and ordering of a unit's rows. The
/// event alias is always `se`.
fn unit_source(unit: AggregationUnit) -> (&'static str, &'static str, &'static str, &'static str) {
    match unit {
        AggregationUnit::Event => (
            "se.id AS unit_id, ss.name || '_' || se.survey_date AS label",
            "survey_events se \
             JOIN survey_sites ss ON ss.id = se.survey_site_id AND ss.deleted_at IS NULL",
            "se.deleted_at IS NULL",
            "se.survey_date, ss.name, se.id",
        ),
        AggregationUnit::Site => (
            "ss.id AS unit_id, ss.name AS label",
            "survey_sites ss \
             LEFT JOIN survey_events se ON se.survey_site_id = ss.id AND se.deleted_at IS NULL",
            "ss.deleted_at IS NULL",
            "ss.name, ss.id, se.survey_date, se.id",
        ),
        AggregationUnit::ParentSite => (
            "ps.id AS unit_id, ps.name AS label",
            "parent_sites ps \
             LEFT JOIN survey_sites ss ON ss.parent_site_id = ps.id AND ss.deleted_at IS NULL \
             LEFT JOIN survey_events se ON se.survey_site_id = ss.id AND se.deleted_at IS NULL",
            "ps.deleted_at IS NULL",
            "ps.name, ps.id, ss.name, ss.id, se.survey_date, se.id",
        ),
    }
}

fn occurrence_sql(unit: AggregationUnit) -> String {
    let (head, from, filter, order) = unit_source(unit);
    format!(
        "SELECT {head}, sp.scientific_name AS species, ar.count AS count \
         FROM {from} \
         LEFT JOIN ant_records ar ON ar.survey_event_id = se.id AND ar.deleted_at IS NULL \
         LEFT JOIN species sp ON sp.id = ar.species_id \
         WHERE {filter} \
         ORDER BY {order}, ar.id"
    )
}

fn vegetation_sql(unit: AggregationUnit) -> String {
    let (head, from, filter, order) = unit_source(unit);
    format!(
        "SELECT {head}, vr.id AS record_id, \
         vr.dominant_tree, vr.dominant_pretree, vr.dominant_sasa, vr.dominant_herb, \
         vr.litter_type, vr.avg_tree_height, vr.avg_pretree_height, vr.avg_sasa_height, \
         vr.avg_herb_height, vr.avg_litter_height, vr.canopy_coverage, \
         vr.precanopy_coverage, vr.sasa_coverage, vr.herb_coverage, vr.litter_coverage, \
         vr.vegetation_rate, vr.light_condition, vr.soil_moisture \
         FROM {from} \
         LEFT JOIN vegetation_records vr ON vr.survey_event_id = se.id AND vr.deleted_at IS NULL \
         WHERE {filter} \
         ORDER BY {order}, vr.id"
    )
}

/// Keeps the rows of a unit that reached a record, or exactly one empty row
/// when none did. Input must be grouped by unit.
fn collapse_empty<T>(rows: Vec<T>, unit_of: fn(&T) -> i64, is_empty: fn(&T) -> bool) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    let mut group_start = 0;
    for row in rows {
        let new_group = out
            .last()
            .map_or(true, |prev| unit_of(prev) != unit_of(&row));
        if new_group {
            group_start = out.len();
            out.push(row);
            continue;
        }
        if is_empty(&row) {
            continue;
        }
        if is_empty(&out[group_start]) {
            out[group_start] = row;
        } else {
            out.push(row);
        }
    }
    out
}

#[async_trait]
impl SurveyRepository for SqliteRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn create_parent_site(&self, site: &NewParentSite) -> RepositoryResult<ParentSite> {
        const OP: &str = "create_parent_site";
        site.validate()
            .map_err(|m| invalid(OP, EntityKind::ParentSite, m))?;
        let site = site.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::insert_into(parent_sites::table)
                    .values(NewParentSiteRow::new(&site, now()))
                    .execute(tx)
                    .map_err(|e| RepositoryError::from(e).with_operation(OP))?;
                let id = last_insert_id(tx)?;
                let row = parent_sites::table
                    .find(id)
                    .select(ParentSiteRow::as_select())
                    .first::<ParentSiteRow>(tx)?;
                Ok(ParentSite::from(row))
            })
        })
        .await
    }

    async fn create_survey_site(&self, site: &NewSurveySite) -> RepositoryResult<SurveySite> {
        const OP: &str = "create_survey_site";
        site.validate()
            .map_err(|m| invalid(OP, EntityKind::SurveySite, m))?;
        let site = site.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let parent_live: i64 = parent_sites::table
                    .filter(parent_sites::id.eq(site.parent_site_id.value()))
                    .filter(parent_sites::deleted_at.is_null())
                    .count()
                    .get_result(tx)?;
                if parent_live == 0 {
                    return Err(missing_parent(
                        OP,
                        EntityKind::ParentSite,
                        site.parent_site_id.value(),
                    ));
                }
                diesel::insert_into(survey_sites::table)
                    .values(NewSurveySiteRow::new(&site, now()))
                    .execute(tx)
                    .map_err(|e| RepositoryError::from(e).with_operation(OP))?;
                let id = last_insert_id(tx)?;
                let row = survey_sites::table
                    .find(id)
                    .select(SurveySiteRow::as_select())
                    .first::<SurveySiteRow>(tx)?;
                Ok(SurveySite::from(row))
            })
        })
        .await
    }

    async fn create_survey_event(&self, event: &NewSurveyEvent) -> RepositoryResult<SurveyEvent> {
        const OP: &str = "create_survey_event";
        event
            .validate()
            .map_err(|m| invalid(OP, EntityKind::SurveyEvent, m))?;
        let event = event.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let site_live: i64 = survey_sites::table
                    .filter(survey_sites::id.eq(event.survey_site_id.value()))
                    .filter(survey_sites::deleted_at.is_null())
                    .count()
                    .get_result(tx)?;
                if site_live == 0 {
                    return Err(missing_parent(
                        OP,
                        EntityKind::SurveySite,
                        event.survey_site_id.value(),
                    ));
                }
                diesel::insert_into(survey_events::table)
                    .values(NewSurveyEventRow::new(&event, now()))
                    .execute(tx)
                    .map_err(|e| RepositoryError::from(e).with_operation(OP))?;
                let id = last_insert_id(tx)?;
                let row = survey_events::table
                    .find(id)
                    .select(SurveyEventRow::as_select())
                    .first::<SurveyEventRow>(tx)?;
                SurveyEvent::try_from(row)
            })
        })
        .await
    }

    async fn create_species(&self, species: &NewSpecies) -> RepositoryResult<Species> {
        const OP: &str = "create_species";
        species
            .validate()
            .map_err(|m| invalid(OP, EntityKind::Species, m))?;
        let new_species = species.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::insert_into(species::table)
                    .values(NewSpeciesRow::new(&new_species, now()))
                    .execute(tx)
                    .map_err(|e| RepositoryError::from(e).with_operation(OP))?;
                let id = last_insert_id(tx)?;
                let row = species::table
                    .find(id)
                    .select(SpeciesRow::as_select())
                    .first::<SpeciesRow>(tx)?;
                Ok(Species::from(row))
            })
        })
        .await
    }

    async fn create_ant_record(&self, record: &NewAntRecord) -> RepositoryResult<AntRecord> {
        const OP: &str = "create_ant_record";
        record
            .validate()
            .map_err(|m| invalid(OP, EntityKind::AntRecord, m))?;
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let event_live: i64 = survey_events::table
                    .filter(survey_events::id.eq(record.survey_event_id.value()))
                    .filter(survey_events::deleted_at.is_null())
                    .count()
                    .get_result(tx)?;
                if event_live == 0 {
                    return Err(missing_parent(
                        OP,
                        EntityKind::SurveyEvent,
                        record.survey_event_id.value(),
                    ));
                }
                let species_live: i64 = species::table
                    .filter(species::id.eq(record.species_id.value()))
                    .filter(species::deleted_at.is_null())
                    .count()
                    .get_result(tx)?;
                if species_live == 0 {
                    return Err(missing_parent(
                        OP,
                        EntityKind::Species,
                        record.species_id.value(),
                    ));
                }
                diesel::insert_into(ant_records::table)
                    .values(NewAntRecordRow::new(&record, now()))
                    .execute(tx)
                    .map_err(|e| RepositoryError::from(e).with_operation(OP))?;
                let id = last_insert_id(tx)?;
                let row = ant_records::table
                    .find(id)
                    .select(AntRecordRow::as_select())
                    .first::<AntRecordRow>(tx)?;
                Ok(AntRecord::from(row))
            })
        })
        .await
    }

    async fn create_vegetation_record(
        &self,
        record: &NewVegetationRecord,
    ) -> RepositoryResult<VegetationRecord> {
        const OP: &str = "create_vegetation_record";
        record
            .validate()
            .map_err(|m| invalid(OP, EntityKind::VegetationRecord, m))?;
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let event_live: i64 = survey_events::table
                    .filter(survey_events::id.eq(record.survey_event_id.value()))
                    .filter(survey_events::deleted_at.is_null())
                    .count()
                    .get_result(tx)?;
                if event_live == 0 {
                    return Err(missing_parent(
                        OP,
                        EntityKind::SurveyEvent,
                        record.survey_event_id.value(),
                    ));
                }
                diesel::insert_into(vegetation_records::table)
                    .values(NewVegetationRecordRow::new(&record, now()))
                    .execute(tx)
                    .map_err(|e| RepositoryError::from(e).with_operation(OP))?;
                let id = last_insert_id(tx)?;
                let row = vegetation_records::table
                    .find(id)
                    .select(VegetationRecordRow::as_select())
                    .first::<VegetationRecordRow>(tx)?;
                Ok(VegetationRecord::from(row))
            })
        })
        .await
    }

    async fn list_parent_sites(&self, include_deleted: bool) -> RepositoryResult<Vec<ParentSite>> {
        self.with_conn(move |conn| {
            let mut query = parent_sites::table
                .select(ParentSiteRow::as_select())
                .order(parent_sites::name.asc())
                .into_boxed();
            if !include_deleted {
                query = query.filter(parent_sites::deleted_at.is_null());
            }
            let rows = query.load::<ParentSiteRow>(conn)?;
            Ok(rows.into_iter().map(ParentSite::from).collect())
        })
        .await
    }

    async fn list_survey_sites(&self, include_deleted: bool) -> RepositoryResult<Vec<SurveySite>> {
        self.with_conn(move |conn| {
            let mut query = survey_sites::table
                .select(SurveySiteRow::as_select())
                .order((survey_sites::name.asc(), survey_sites::id.asc()))
                .into_boxed();
            if !include_deleted {
                query = query.filter(survey_sites::deleted_at.is_null());
            }
            let rows = query.load::<SurveySiteRow>(conn)?;
            Ok(rows.into_iter().map(SurveySite::from).collect())
        })
        .await
    }

    async fn list_survey_events(
        &self,
        include_deleted: bool,
    ) -> RepositoryResult<Vec<SurveyEvent>> {
        self.with_conn(move |conn| {
            let mut query = survey_events::table
                .select(SurveyEventRow::as_select())
                .order((
                    survey_events::survey_date.asc(),
                    survey_events::survey_site_id.asc(),
                    survey_events::id.asc(),
                ))
                .into_boxed();
            if !include_deleted {
                query = query.filter(survey_events::deleted_at.is_null());
            }
            query
                .load::<SurveyEventRow>(conn)?
                .into_iter()
                .map(SurveyEvent::try_from)
                .collect()
        })
        .await
    }

    async fn list_species(&self, include_deleted: bool) -> RepositoryResult<Vec<Species>> {
        self.with_conn(move |conn| {
            let mut query = species::table
                .select(SpeciesRow::as_select())
                .order(species::scientific_name.asc())
                .into_boxed();
            if !include_deleted {
                query = query.filter(species::deleted_at.is_null());
            }
            let rows = query.load::<SpeciesRow>(conn)?;
            Ok(rows.into_iter().map(Species::from).collect())
        })
        .await
    }

    async fn soft_delete(&self, kind: EntityKind, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| mark_deleted(conn, "soft_delete", kind, id, true))
            .await?;
        log::debug!("Soft-deleted {} {}", kind, id);
        Ok(())
    }

    async fn restore(&self, kind: EntityKind, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| mark_deleted(conn, "restore", kind, id, false))
            .await?;
        log::debug!("Restored {} {}", kind, id);
        Ok(())
    }

    async fn species_statistics(
        &self,
        species_id: SpeciesId,
    ) -> RepositoryResult<SpeciesStatistics> {
        self.with_conn(move |conn| {
            let name: String = species::table
                .find(species_id.value())
                .select(species::scientific_name)
                .first(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("species {} does not exist", species_id),
                        ErrorContext::new("species_statistics")
                            .with_entity(EntityKind::Species.as_str())
                            .with_entity_id(species_id),
                    )
                })?;

            let total_events: i64 = survey_events::table
                .filter(survey_events::deleted_at.is_null())
                .count()
                .get_result(conn)?;

            let counts: Vec<i64> = ant_records::table
                .inner_join(survey_events::table)
                .filter(ant_records::species_id.eq(species_id.value()))
                .filter(ant_records::deleted_at.is_null())
                .filter(survey_events::deleted_at.is_null())
                .order(ant_records::id.asc())
                .select(ant_records::count)
                .load(conn)?;

            Ok(SpeciesStatistics::from_counts(
                species_id,
                name,
                &counts,
                total_events,
            ))
        })
        .await
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteRepository {
    async fn fetch_occurrences(
        &self,
        unit: AggregationUnit,
    ) -> RepositoryResult<Vec<OccurrenceTuple>> {
        let rows = self
            .with_conn(move |conn| {
                sql_query(occurrence_sql(unit))
                    .load::<OccurrenceJoinRow>(conn)
                    .map_err(|e| RepositoryError::from(e).with_operation("fetch_occurrences"))
            })
            .await?;
        let tuples: Vec<OccurrenceTuple> = collapse_empty(
            rows.into_iter().map(OccurrenceTuple::from).collect(),
            |t| t.unit_id,
            |t| t.species.is_none(),
        );
        log::debug!("Fetched {} occurrence tuples for unit {}", tuples.len(), unit);
        Ok(tuples)
    }

    async fn fetch_vegetation(
        &self,
        unit: AggregationUnit,
    ) -> RepositoryResult<Vec<VegetationObservation>> {
        let rows = self
            .with_conn(move |conn| {
                sql_query(vegetation_sql(unit))
                    .load::<VegetationJoinRow>(conn)
                    .map_err(|e| RepositoryError::from(e).with_operation("fetch_vegetation"))
            })
            .await?;
        let observations: Vec<VegetationObservation> = collapse_empty(
            rows.into_iter().map(VegetationObservation::from).collect(),
            |o| o.unit_id,
            |o| o.measurements.is_none(),
        );
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

    fn repo() -> SqliteRepository {
        SqliteRepository::new(SqliteConfig::with_path(":memory:")).unwrap()
    }

    #[test]
    fn test_collapse_keeps_one_empty_row_per_unit() {
        let rows = vec![
            OccurrenceTuple::empty(1, "A"),
            OccurrenceTuple::new(1, "A", Some("Lasius japonicus".into()), Some(2)),
            OccurrenceTuple::empty(1, "A"),
            OccurrenceTuple::empty(2, "B"),
            OccurrenceTuple::empty(2, "B"),
        ];
        let out = collapse_empty(rows, |t| t.unit_id, |t| t.species.is_none());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].species.as_deref(), Some("Lasius japonicus"));
        assert_eq!(out[1], OccurrenceTuple::empty(2, "B"));
    }

    #[test]
    fn test_empty_path_is_configuration_error() {
        let err = SqliteRepository::new(SqliteConfig::default()).unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }

    #[tokio::test]
    async fn test_occurrence_join_and_soft_delete() {
        let repo = repo();
        assert!(repo.health_check().await.unwrap());

        let parent = repo
            .create_parent_site(&NewParentSite::new("Tsukuba", 36.1, 140.1))
            .await
            .unwrap();
        let site = repo
            .create_survey_site(&NewSurveySite::new(parent.id, "Forest", 36.1, 140.1))
            .await
            .unwrap();
        let empty_site = repo
            .create_survey_site(&NewSurveySite::new(parent.id, "Meadow", 36.1, 140.1))
            .await
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let event = repo
            .create_survey_event(&NewSurveyEvent::new(site.id, date))
            .await
            .unwrap();
        let species = repo
            .create_species(&NewSpecies::new("Lasius japonicus"))
            .await
            .unwrap();
        let record = repo
            .create_ant_record(&NewAntRecord::new(event.id, species.id, 5))
            .await
            .unwrap();

        let tuples = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap();
        assert_eq!(
            tuples,
            vec![
                OccurrenceTuple::new(
                    site.id.value(),
                    "Forest",
                    Some("Lasius japonicus".into()),
                    Some(5)
                ),
                OccurrenceTuple::empty(empty_site.id.value(), "Meadow"),
            ]
        );

        let events = repo.fetch_occurrences(AggregationUnit::Event).await.unwrap();
        assert_eq!(events[0].label, "Forest_2024-06-01");

        repo.soft_delete(EntityKind::AntRecord, record.id.value())
            .await
            .unwrap();
        let tuples = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap();
        assert!(tuples.iter().all(|t| t.species.is_none()));
        assert!(repo
            .soft_delete(EntityKind::AntRecord, record.id.value())
            .await
            .unwrap_err()
            .is_not_found());
        repo.restore(EntityKind::AntRecord, record.id.value())
            .await
            .unwrap();

        let stats = repo.species_statistics(species.id).await.unwrap();
        assert_eq!(stats.occurrence_count, 1);
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.occurrence_rate, 100.0);
    }

    #[tokio::test]
    async fn test_duplicate_and_orphan_writes_are_rejected() {
        let repo = repo();
        let parent = repo
            .create_parent_site(&NewParentSite::new("Tsukuba", 36.1, 140.1))
            .await
            .unwrap();
        let dup = repo
            .create_parent_site(&NewParentSite::new("Tsukuba", 36.1, 140.1))
            .await
            .unwrap_err();
        assert!(matches!(dup, RepositoryError::ValidationError { .. }));

        repo.soft_delete(EntityKind::ParentSite, parent.id.value())
            .await
            .unwrap();
        let orphan = repo
            .create_survey_site(&NewSurveySite::new(parent.id, "Forest", 36.1, 140.1))
            .await
            .unwrap_err();
        assert!(orphan.is_not_found());
    }
}
