//! Analysis variables: vegetation and diversity measures joined per unit row.

use std::collections::HashMap;

use crate::analysis::{self, AnalysisResult};
use crate::db::AnalyticsRepository;
use crate::models::{
    AggregationUnit, AnalysisVariable, CorrelationMethod, MissingValue, RegressionDegree,
};
use crate::routes::diversity::DiversityRecord;
use crate::routes::variables::{
    PairedSeries, VariableCorrelation, VariableRegression, VariableTable,
};
use crate::routes::vegetation::VegetationMatrix;
use crate::services::diversity::diversity_records;
use crate::services::vegetation::vegetation_matrix;

/// Joins the vegetation matrix and the diversity records of `unit` on row
/// label. Rows follow the diversity order; labels only the vegetation join
/// produced are appended after them.
pub async fn variable_table<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
) -> AnalysisResult<VariableTable> {
    let (vegetation, diversity) = tokio::try_join!(
        vegetation_matrix(repo, unit, MissingValue::Na),
        diversity_records(repo, unit)
    )?;
    Ok(join_variables(unit, &vegetation, &diversity))
}

pub(crate) fn join_variables(
    unit: AggregationUnit,
    vegetation: &VegetationMatrix,
    diversity: &[DiversityRecord],
) -> VariableTable {
    let by_label: HashMap<&str, &DiversityRecord> =
        diversity.iter().map(|r| (r.label.as_str(), r)).collect();

    let mut rows: Vec<String> = diversity.iter().map(|r| r.label.clone()).collect();
    for label in &vegetation.rows {
        if !by_label.contains_key(label.as_str()) {
            rows.push(label.clone());
        }
    }

    let variables = AnalysisVariable::ALL.to_vec();
    let values = rows
        .iter()
        .map(|label| {
            variables
                .iter()
                .map(|variable| match variable.vegetation_field() {
                    Some(field) => vegetation.numeric(label, field),
                    None => by_label
                        .get(label.as_str())
                        .and_then(|record| record.value(*variable)),
                })
                .collect()
        })
        .collect();

    VariableTable {
        unit,
        variables,
        rows,
        values,
    }
}

/// Aligned `x`/`y` columns with `NaN` where a row lacks the measurement.
pub async fn paired_series<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
    x_variable: AnalysisVariable,
    y_variable: AnalysisVariable,
) -> AnalysisResult<PairedSeries> {
    let table = variable_table(repo, unit).await?;
    let x = table.series(x_variable);
    let y = table.series(y_variable);
    log::debug!(
        "Paired {} and {} over {} rows of unit {}",
        x_variable,
        y_variable,
        table.rows.len(),
        unit
    );
    Ok(PairedSeries {
        x_variable,
        y_variable,
        labels: table.rows,
        x,
        y,
    })
}

pub async fn correlate_variables<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
    x_variable: AnalysisVariable,
    y_variable: AnalysisVariable,
    method: CorrelationMethod,
) -> AnalysisResult<VariableCorrelation> {
    let series = paired_series(repo, unit, x_variable, y_variable).await?;
    let result = analysis::correlate(&series.x, &series.y, method)?;
    if let Some(error) = &result.error {
        log::warn!(
            "{} correlation of {} and {} not computed: {}",
            method,
            x_variable,
            y_variable,
            error
        );
    }
    Ok(VariableCorrelation {
        unit,
        x_variable,
        y_variable,
        strength: result.strength(),
        result,
    })
}

pub async fn regress_variables<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    unit: AggregationUnit,
    x_variable: AnalysisVariable,
    y_variable: AnalysisVariable,
    degree: RegressionDegree,
) -> AnalysisResult<VariableRegression> {
    let series = paired_series(repo, unit, x_variable, y_variable).await?;
    let result = analysis::regress(&series.x, &series.y, degree)?;
    if result.fit().is_none() {
        log::warn!(
            "Regression of {} on {} not fitted over {} rows",
            y_variable,
            x_variable,
            series.labels.len()
        );
    }
    Ok(VariableRegression {
        unit,
        x_variable,
        y_variable,
        result,
    })
}

#[cfg(test)]
#[path = "variables_tests.rs"]
mod variables_tests;
