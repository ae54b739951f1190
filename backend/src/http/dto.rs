//! Request and response bodies of the REST API.
//!
//! Query strings carry option tokens as plain strings so that an
//! unrecognised token becomes a `400` with the engine's message instead of
//! an extractor rejection.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::models::{
    Aggregation, AggregationUnit, AnalysisVariable, CorrelationMethod, MissingValue,
    RegressionDegree, ValueType,
};
use crate::routes::matrix::{CommunityMatrix, MatrixCell, MatrixOptions};

fn parse_or<T>(token: Option<&str>, default: T) -> AnalysisResult<T>
where
    T: std::str::FromStr<Err = crate::analysis::AnalysisError>,
{
    match token {
        Some(token) => token.parse(),
        None => Ok(default),
    }
}

fn parse_unit(token: Option<&str>) -> AnalysisResult<AggregationUnit> {
    parse_or(token, AggregationUnit::Site)
}

/// `GET /v1/matrix` and `GET /v1/matrix.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MatrixQuery {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default, alias = "value_type")]
    pub value_type: Option<String>,
    #[serde(default, alias = "missing_value")]
    pub missing_value: Option<String>,
}

impl MatrixQuery {
    /// Unit `site`, `sum` of `count`, zero cells shown as `0` unless given.
    pub fn options(&self) -> AnalysisResult<MatrixOptions> {
        Ok(MatrixOptions::new(parse_unit(self.unit.as_deref())?)
            .with_aggregation(parse_or(self.aggregation.as_deref(), Aggregation::Sum)?)
            .with_value_type(parse_or(self.value_type.as_deref(), ValueType::Count)?)
            .with_missing_value(parse_or(
                self.missing_value.as_deref(),
                MissingValue::Zero,
            )?))
    }
}

/// `GET /v1/vegetation`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VegetationQuery {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, alias = "missing_value")]
    pub missing_value: Option<String>,
    /// `csv` for a delimited download; JSON otherwise.
    #[serde(default)]
    pub format: Option<String>,
}

impl VegetationQuery {
    pub fn unit(&self) -> AnalysisResult<AggregationUnit> {
        parse_unit(self.unit.as_deref())
    }

    pub fn missing_value(&self) -> AnalysisResult<MissingValue> {
        parse_or(self.missing_value.as_deref(), MissingValue::Na)
    }
}

/// `GET /v1/diversity`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiversityQuery {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl DiversityQuery {
    pub fn unit(&self) -> AnalysisResult<AggregationUnit> {
        parse_unit(self.unit.as_deref())
    }
}

pub(crate) fn wants_csv(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("csv"))
}

/// `GET /v1/variables/correlation` and `GET /v1/variables/regression`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VariablePairQuery {
    #[serde(default)]
    pub unit: Option<String>,
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub degree: Option<i64>,
}

impl VariablePairQuery {
    pub fn unit(&self) -> AnalysisResult<AggregationUnit> {
        parse_unit(self.unit.as_deref())
    }

    pub fn variables(&self) -> AnalysisResult<(AnalysisVariable, AnalysisVariable)> {
        Ok((self.x.parse()?, self.y.parse()?))
    }

    pub fn method(&self) -> AnalysisResult<CorrelationMethod> {
        parse_or(self.method.as_deref(), CorrelationMethod::Pearson)
    }

    pub fn degree(&self) -> AnalysisResult<RegressionDegree> {
        self.degree
            .map_or(Ok(RegressionDegree::Linear), RegressionDegree::try_from)
    }
}

/// Body of `POST /v1/statistics/correlation`. `null` entries are missing values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRequest {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    #[serde(default)]
    pub method: Option<String>,
}

impl CorrelationRequest {
    pub fn method(&self) -> AnalysisResult<CorrelationMethod> {
        parse_or(self.method.as_deref(), CorrelationMethod::Pearson)
    }
}

/// Body of `POST /v1/statistics/regression`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionRequest {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    #[serde(default)]
    pub degree: Option<i64>,
}

impl RegressionRequest {
    pub fn degree(&self) -> AnalysisResult<RegressionDegree> {
        self.degree
            .map_or(Ok(RegressionDegree::Linear), RegressionDegree::try_from)
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Record store status
    pub database: String,
}

/// Body of `GET /v1/matrix`: the matrix as displayed, zero cells replaced by
/// the requested missing-value token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityMatrixResponse {
    pub options: MatrixOptions,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<MatrixCell>>,
}

impl From<CommunityMatrix> for CommunityMatrixResponse {
    fn from(matrix: CommunityMatrix) -> Self {
        let values = matrix.display_rows();
        Self {
            options: matrix.options,
            rows: matrix.rows,
            columns: matrix.columns,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_query_defaults() {
        let options = MatrixQuery::default().options().unwrap();
        assert_eq!(options.unit, AggregationUnit::Site);
        assert_eq!(options.aggregation, Aggregation::Sum);
        assert_eq!(options.value_type, ValueType::Count);
        assert_eq!(options.missing_value, MissingValue::Zero);
    }

    #[test]
    fn test_matrix_query_rejects_unknown_token() {
        let query = MatrixQuery {
            aggregation: Some("median".into()),
            ..Default::default()
        };
        assert!(query.options().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_regression_request_degree() {
        let body: RegressionRequest =
            serde_json::from_str(r#"{"x":[1,2,null],"y":[2,4,6],"degree":2}"#).unwrap();
        assert_eq!(body.degree().unwrap(), RegressionDegree::Quadratic);
        assert_eq!(body.x[2], None);

        let body: RegressionRequest =
            serde_json::from_str(r#"{"x":[],"y":[],"degree":7}"#).unwrap();
        assert!(body.degree().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_wants_csv() {
        assert!(wants_csv(Some("CSV")));
        assert!(!wants_csv(Some("json")));
        assert!(!wants_csv(None));
    }

    #[test]
    fn test_matrix_response_substitutes_missing_token() {
        let matrix = CommunityMatrix {
            options: MatrixOptions::new(AggregationUnit::ParentSite)
                .with_missing_value(MissingValue::Na),
            rows: vec!["Mt. Takao".into(), "Mt. Tsukuba".into()],
            columns: vec!["Formica japonica".into()],
            values: vec![vec![7.0], vec![0.0]],
        };
        let response = CommunityMatrixResponse::from(matrix);
        assert_eq!(response.values[0], vec![MatrixCell::Number(7.0)]);
        assert_eq!(response.values[1], vec![MatrixCell::Text("NA".into())]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["values"][1][0], "NA");
        assert_eq!(json["options"]["missing_value"], "NA");
    }
}
