//! Per-row diversity indices of a community matrix.

use crate::analysis::distribution::round_half_even;
use crate::routes::diversity::DiversityRecord;
use crate::routes::matrix::CommunityMatrix;

/// One record per matrix row, in row order.
pub fn compute_diversity(matrix: &CommunityMatrix) -> Vec<DiversityRecord> {
    matrix
        .rows
        .iter()
        .zip(&matrix.values)
        .map(|(label, counts)| diversity_of_counts(label, counts))
        .collect()
}

/// Richness, Shannon, Simpson and Pielou evenness of one abundance vector.
///
/// Zero entries are non-occurrences and are dropped before any logarithm.
pub fn diversity_of_counts(label: &str, counts: &[f64]) -> DiversityRecord {
    let present: Vec<f64> = counts.iter().copied().filter(|c| *c > 0.0).collect();
    if present.is_empty() {
        return DiversityRecord::zero(label);
    }

    let richness = present.len();
    let total: f64 = present.iter().sum();

    let (shannon, sum_sq) = present.iter().fold((0.0, 0.0), |(h, d), c| {
        let p = c / total;
        (h - p * p.ln(), d + p * p)
    });
    let simpson = 1.0 - sum_sq;
    let evenness = if richness > 1 {
        shannon / (richness as f64).ln()
    } else {
        0.0
    };

    DiversityRecord {
        label: label.to_string(),
        species_richness: richness as i64,
        shannon_index: round4(shannon),
        simpson_index: round4(simpson),
        evenness: round4(evenness),
        total_individuals: total as i64,
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    round_half_even(value, 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AggregationUnit;
    use crate::routes::matrix::MatrixOptions;

    #[test]
    fn test_single_species_row() {
        let r = diversity_of_counts("A", &[0.0, 12.0, 0.0]);
        assert_eq!(r.species_richness, 1);
        assert_eq!(r.shannon_index, 0.0);
        assert_eq!(r.simpson_index, 0.0);
        assert_eq!(r.evenness, 0.0);
        assert_eq!(r.total_individuals, 12);
    }

    #[test]
    fn test_two_equal_species() {
        let r = diversity_of_counts("B", &[10.0, 10.0]);
        assert_eq!(r.shannon_index, 0.6931);
        assert_eq!(r.simpson_index, 0.5);
        assert_eq!(r.evenness, 1.0);
        assert_eq!(r.total_individuals, 20);
    }

    #[test]
    fn test_all_zero_row_is_zero_record() {
        assert_eq!(diversity_of_counts("C", &[0.0, 0.0]), DiversityRecord::zero("C"));
        assert_eq!(diversity_of_counts("D", &[]), DiversityRecord::zero("D"));
    }

    #[test]
    fn test_uneven_community() {
        let r = diversity_of_counts("E", &[8.0, 1.0, 1.0]);
        assert_eq!(r.species_richness, 3);
        // H' = -(0.8 ln 0.8 + 2 * 0.1 ln 0.1)
        assert_eq!(r.shannon_index, 0.6390);
        assert_eq!(r.simpson_index, 0.34);
        assert!(r.evenness > 0.0 && r.evenness < 1.0);
    }

    #[test]
    fn test_records_follow_row_order() {
        let matrix = CommunityMatrix {
            options: MatrixOptions::new(AggregationUnit::Event),
            rows: vec!["x".into(), "y".into()],
            columns: vec!["s1".into(), "s2".into()],
            values: vec![vec![0.0, 0.0], vec![3.0, 1.0]],
        };
        let records = compute_diversity(&matrix);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "x");
        assert_eq!(records[0].species_richness, 0);
        assert_eq!(records[1].total_individuals, 4);
    }
}
