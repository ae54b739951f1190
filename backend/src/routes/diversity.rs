use serde::{Deserialize, Serialize};

use crate::models::AnalysisVariable;

/// Diversity indices of one community matrix row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityRecord {
    pub label: String,
    pub species_richness: i64,
    pub shannon_index: f64,
    pub simpson_index: f64,
    pub evenness: f64,
    pub total_individuals: i64,
}

impl DiversityRecord {
    /// Record of a row in which no species was observed.
    pub fn zero(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            species_richness: 0,
            shannon_index: 0.0,
            simpson_index: 0.0,
            evenness: 0.0,
            total_individuals: 0,
        }
    }

    /// Value of a diversity variable; `None` for vegetation variables.
    pub fn value(&self, variable: AnalysisVariable) -> Option<f64> {
        match variable {
            AnalysisVariable::SpeciesRichness => Some(self.species_richness as f64),
            AnalysisVariable::ShannonIndex => Some(self.shannon_index),
            AnalysisVariable::SimpsonIndex => Some(self.simpson_index),
            AnalysisVariable::Evenness => Some(self.evenness),
            AnalysisVariable::TotalIndividuals => Some(self.total_individuals as f64),
            _ => None,
        }
    }
}

pub const GET_DIVERSITY: &str = "/v1/diversity";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_record() {
        let r = DiversityRecord::zero("Empty plot");
        assert_eq!(r.species_richness, 0);
        assert_eq!(r.total_individuals, 0);
        assert_eq!(r.value(AnalysisVariable::Evenness), Some(0.0));
        assert_eq!(r.value(AnalysisVariable::CanopyCoverage), None);
    }
}
