//! Record store traits.
//!
//! - [`error`]: error types
//! - [`survey`]: writes, listings, logical deletion
//! - [`analytics`]: the read-only joins behind the analysis engine
//!
//! ```ignore
//! async fn snapshot<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     repo.health_check().await?;
//!     let tuples = repo.fetch_occurrences(AggregationUnit::Site).await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod error;
pub mod survey;

pub use analytics::AnalyticsRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use survey::SurveyRepository;

/// Both repository traits; implemented for every type providing them.
pub trait FullRepository: SurveyRepository + AnalyticsRepository {}

impl<T> FullRepository for T where T: SurveyRepository + AnalyticsRepository {}
