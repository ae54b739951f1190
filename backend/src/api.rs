//! Public API surface of the backend.
//!
//! Identifier newtypes for every record store entity plus re-exports of
//! the serializable types returned by the engine and the HTTP layer.

pub use crate::models::{
    Aggregation, AggregationUnit, AnalysisVariable, AntRecord, CorrelationMethod, EntityKind,
    MissingValue, NewAntRecord, NewParentSite, NewSpecies, NewSurveyEvent, NewSurveySite,
    NewVegetationRecord, OccurrenceTuple, ParentSite, RegressionDegree, Species,
    SpeciesStatistics, SurveyEvent, SurveySite, ValueType, VegetationField,
    VegetationMeasurements, VegetationObservation, VegetationRecord, Weather,
};
pub use crate::routes::diversity::DiversityRecord;
pub use crate::routes::matrix::{CommunityMatrix, MatrixCell, MatrixOptions};
pub use crate::routes::statistics::{
    CorrelationResult, CorrelationStrength, RegressionFailure, RegressionFit, RegressionResult,
};
pub use crate::routes::variables::{
    PairedSeries, VariableCorrelation, VariableRegression, VariableTable,
};
pub use crate::routes::vegetation::{VegetationMatrix, VegetationValue};

use crate::define_id_type;

define_id_type!(i64, ParentSiteId);
define_id_type!(i64, SurveySiteId);
define_id_type!(i64, SurveyEventId);
define_id_type!(i64, SpeciesId);
define_id_type!(i64, AntRecordId);
define_id_type!(i64, VegetationRecordId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_and_compare() {
        assert!(SurveySiteId::new(1) < SurveySiteId::new(2));
        assert_eq!(SpeciesId::from(9), SpeciesId(9));
        assert_ne!(ParentSiteId(1), ParentSiteId(2));
    }

    #[test]
    fn test_ids_deserialize_from_bare_integers() {
        let id: SurveyEventId = serde_json::from_str("17").unwrap();
        assert_eq!(id.value(), 17);
        assert_eq!(AntRecordId(3).to_string(), "3");
        assert_eq!(i64::from(VegetationRecordId(5)), 5);
    }
}
