//! Read-only joins consumed by the analysis engine.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{AggregationUnit, OccurrenceTuple, VegetationObservation};

/// Read handle injected into the analysis services.
///
/// Both joins start at the unit's table and left-join downwards, so a unit
/// with nothing recorded beneath it still yields one row. Only live rows
/// take part; species rows are joined regardless of their own deletion.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// `(unit id, unit label, species, count)` tuples for `unit`.
    async fn fetch_occurrences(&self, unit: AggregationUnit)
        -> RepositoryResult<Vec<OccurrenceTuple>>;

    /// One observation per live vegetation record below each unit row, in
    /// the unit's natural order.
    async fn fetch_vegetation(
        &self,
        unit: AggregationUnit,
    ) -> RepositoryResult<Vec<VegetationObservation>>;
}
