//! Error type of the analysis engine.

use crate::db::RepositoryError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failure of an analysis operation.
///
/// Insufficient data is not an error: correlation and regression report it
/// as a structured result so callers can render it inline.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// An option token or argument the engine does not recognise.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The record store could not answer the query.
    #[error("Data access error: {0}")]
    DataAccess(#[from] RepositoryError),

    /// Rendering a result as delimited text failed.
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

impl AnalysisError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
