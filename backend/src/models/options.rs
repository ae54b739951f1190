//! Closed option sets accepted by the analysis engine.
//!
//! Every parameter that selects an analysis behaviour is a tagged variant
//! parsed once at the call boundary. Unknown tokens are rejected with
//! [`AnalysisError::InvalidArgument`]; nothing falls back to a default.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;

/// Implements `as_str`, `ALL`, `Display` and case-insensitive `FromStr`
/// for an option enum from its `(variant, wire token)` table.
macro_rules! wire_tokens {
    ($name:ident, $what:literal, { $($variant:ident => $token:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire token of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = AnalysisError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_lowercase();
                $(
                    if lowered == $token.to_lowercase() $(|| lowered == $alias)* {
                        return Ok($name::$variant);
                    }
                )+
                Err(AnalysisError::invalid_argument(format!(
                    "unknown {}: '{}'",
                    $what, s
                )))
            }
        }
    };
}

/// Row granularity of a community or vegetation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationUnit {
    /// One row per survey event, labelled `{survey_site_name}_{survey_date}`.
    Event,
    /// One row per survey site, labelled with the site name.
    Site,
    /// One row per parent site, labelled with the parent site name.
    ParentSite,
}

wire_tokens!(AggregationUnit, "aggregation unit", {
    Event => "event",
    Site => "site",
    ParentSite => "parent_site" | "parent-site",
});

/// How several occurrence tuples collapsing onto one cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
    Max,
}

wire_tokens!(Aggregation, "aggregation", {
    Sum => "sum",
    Mean => "mean",
    Max => "max",
});

/// Encoding applied to aggregated cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Raw aggregated value.
    #[default]
    Count,
    /// `1` when the aggregated value is positive, else `0`.
    Presence,
    /// `100 × presence / row count` of the current matrix.
    Frequency,
}

wire_tokens!(ValueType, "value type", {
    Count => "count",
    Presence => "presence",
    Frequency => "frequency",
});

/// Display token substituted for zero cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MissingValue {
    #[default]
    #[serde(rename = "0", alias = "zero")]
    Zero,
    #[serde(rename = "", alias = "empty")]
    Empty,
    #[serde(rename = "NA", alias = "na")]
    Na,
}

wire_tokens!(MissingValue, "missing value", {
    Zero => "0" | "zero",
    Empty => "" | "empty",
    Na => "NA" | "na",
});

/// Correlation coefficient family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

wire_tokens!(CorrelationMethod, "correlation method", {
    Pearson => "pearson",
    Spearman => "spearman",
});

/// Polynomial degree of a regression fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RegressionDegree {
    #[default]
    Linear,
    Quadratic,
    Cubic,
}

impl RegressionDegree {
    /// Highest power of `x` in the fitted polynomial.
    pub fn power(&self) -> usize {
        match self {
            RegressionDegree::Linear => 1,
            RegressionDegree::Quadratic => 2,
            RegressionDegree::Cubic => 3,
        }
    }
}

impl TryFrom<u8> for RegressionDegree {
    type Error = AnalysisError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RegressionDegree::Linear),
            2 => Ok(RegressionDegree::Quadratic),
            3 => Ok(RegressionDegree::Cubic),
            other => Err(AnalysisError::invalid_argument(format!(
                "unsupported regression degree: {} (expected 1, 2 or 3)",
                other
            ))),
        }
    }
}

impl TryFrom<i64> for RegressionDegree {
    type Error = AnalysisError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| {
                AnalysisError::invalid_argument(format!(
                    "unsupported regression degree: {} (expected 1, 2 or 3)",
                    value
                ))
            })
            .and_then(RegressionDegree::try_from)
    }
}

impl From<RegressionDegree> for u8 {
    fn from(degree: RegressionDegree) -> Self {
        degree.power() as u8
    }
}

impl std::fmt::Display for RegressionDegree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.power())
    }
}

/// Numeric variable offered for correlation and regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisVariable {
    CanopyCoverage,
    SasaCoverage,
    LightCondition,
    SoilMoisture,
    SpeciesRichness,
    ShannonIndex,
    SimpsonIndex,
    Evenness,
    TotalIndividuals,
}

wire_tokens!(AnalysisVariable, "analysis variable", {
    CanopyCoverage => "canopy_coverage",
    SasaCoverage => "sasa_coverage",
    LightCondition => "light_condition",
    SoilMoisture => "soil_moisture",
    SpeciesRichness => "species_richness",
    ShannonIndex => "shannon_index",
    SimpsonIndex => "simpson_index",
    Evenness => "evenness",
    TotalIndividuals => "total_individuals",
});

impl AnalysisVariable {
    /// The vegetation column backing this variable, if it is a vegetation variable.
    pub fn vegetation_field(&self) -> Option<VegetationField> {
        match self {
            AnalysisVariable::CanopyCoverage => Some(VegetationField::CanopyCoverage),
            AnalysisVariable::SasaCoverage => Some(VegetationField::SasaCoverage),
            AnalysisVariable::LightCondition => Some(VegetationField::LightCondition),
            AnalysisVariable::SoilMoisture => Some(VegetationField::SoilMoisture),
            _ => None,
        }
    }

    pub fn is_diversity(&self) -> bool {
        self.vegetation_field().is_none()
    }
}

/// Column of the vegetation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VegetationField {
    DominantTree,
    DominantPretree,
    DominantSasa,
    DominantHerb,
    LitterType,
    AvgTreeHeight,
    AvgPretreeHeight,
    AvgSasaHeight,
    AvgHerbHeight,
    AvgLitterHeight,
    CanopyCoverage,
    PrecanopyCoverage,
    SasaCoverage,
    HerbCoverage,
    LitterCoverage,
    VegetationRate,
    LightCondition,
    SoilMoisture,
}

wire_tokens!(VegetationField, "vegetation field", {
    DominantTree => "dominant_tree",
    DominantPretree => "dominant_pretree",
    DominantSasa => "dominant_sasa",
    DominantHerb => "dominant_herb",
    LitterType => "litter_type",
    AvgTreeHeight => "avg_tree_height",
    AvgPretreeHeight => "avg_pretree_height",
    AvgSasaHeight => "avg_sasa_height",
    AvgHerbHeight => "avg_herb_height",
    AvgLitterHeight => "avg_litter_height",
    CanopyCoverage => "canopy_coverage",
    PrecanopyCoverage => "precanopy_coverage",
    SasaCoverage => "sasa_coverage",
    HerbCoverage => "herb_coverage",
    LitterCoverage => "litter_coverage",
    VegetationRate => "vegetation_rate",
    LightCondition => "light_condition",
    SoilMoisture => "soil_moisture",
});

impl VegetationField {
    /// Columns averaged when vegetation is summarised per site or parent site.
    pub const SITE_LEVEL: &'static [VegetationField] = &[
        VegetationField::CanopyCoverage,
        VegetationField::SasaCoverage,
        VegetationField::LightCondition,
        VegetationField::SoilMoisture,
    ];

    /// Columns reported for a given aggregation unit.
    pub fn columns_for(unit: AggregationUnit) -> &'static [VegetationField] {
        match unit {
            AggregationUnit::Event => VegetationField::ALL,
            AggregationUnit::Site | AggregationUnit::ParentSite => VegetationField::SITE_LEVEL,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            VegetationField::DominantTree
                | VegetationField::DominantPretree
                | VegetationField::DominantSasa
                | VegetationField::DominantHerb
                | VegetationField::LitterType
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parses_wire_tokens() {
        assert_eq!("event".parse::<AggregationUnit>().unwrap(), AggregationUnit::Event);
        assert_eq!("SITE".parse::<AggregationUnit>().unwrap(), AggregationUnit::Site);
        assert_eq!(
            "parent_site".parse::<AggregationUnit>().unwrap(),
            AggregationUnit::ParentSite
        );
    }

    #[test]
    fn test_unknown_unit_is_invalid_argument() {
        let err = "plot".parse::<AggregationUnit>().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidArgument(_)));
        assert!(err.to_string().contains("plot"));
    }

    #[test]
    fn test_missing_value_tokens_and_aliases() {
        assert_eq!("0".parse::<MissingValue>().unwrap(), MissingValue::Zero);
        assert_eq!("".parse::<MissingValue>().unwrap(), MissingValue::Empty);
        assert_eq!("NA".parse::<MissingValue>().unwrap(), MissingValue::Na);
        assert_eq!("empty".parse::<MissingValue>().unwrap(), MissingValue::Empty);
        assert!("null".parse::<MissingValue>().is_err());
        assert_eq!(MissingValue::Na.as_str(), "NA");
    }

    #[test]
    fn test_missing_value_serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&MissingValue::Na).unwrap(), "\"NA\"");
        let parsed: MissingValue = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, MissingValue::Empty);
    }

    #[test]
    fn test_regression_degree_bounds() {
        assert_eq!(RegressionDegree::try_from(2u8).unwrap(), RegressionDegree::Quadratic);
        assert!(RegressionDegree::try_from(0u8).is_err());
        assert!(RegressionDegree::try_from(4i64).is_err());
        assert!(RegressionDegree::try_from(-1i64).is_err());
        assert_eq!(serde_json::to_string(&RegressionDegree::Cubic).unwrap(), "3");
        assert!(serde_json::from_str::<RegressionDegree>("5").is_err());
    }

    #[test]
    fn test_vegetation_columns_per_unit() {
        assert_eq!(VegetationField::columns_for(AggregationUnit::Event).len(), 18);
        assert_eq!(VegetationField::columns_for(AggregationUnit::Site).len(), 4);
        assert!(!VegetationField::DominantTree.is_numeric());
        assert!(VegetationField::SoilMoisture.is_numeric());
    }

    #[test]
    fn test_analysis_variable_mapping() {
        assert_eq!(
            AnalysisVariable::LightCondition.vegetation_field(),
            Some(VegetationField::LightCondition)
        );
        assert!(AnalysisVariable::Evenness.is_diversity());
        assert_eq!(AnalysisVariable::ALL.len(), 9);
    }
}
