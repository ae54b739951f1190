//! Record store for survey data.
//!
//! Storage is reached only through the repository traits, so backends can
//! be swapped without touching the services or the analysis engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / collaborators                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service layer (crate::services)                        │
//! │  - snapshot reads, engine calls, CSV export             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!          ┌──────────┴───────────┐
//! ┌────────▼────────┐    ┌────────▼────────┐
//! │ LocalRepository │    │ SqliteRepository│
//! │   (in-memory)   │    │ (diesel + r2d2) │
//! └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage
//! ```
//! use ant_survey::db::{AnalyticsRepository, RepositoryFactory, RepositoryType};
//! use ant_survey::models::AggregationUnit;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let repo = RepositoryFactory::create(RepositoryType::Local, None).await.unwrap();
//!     let tuples = repo.fetch_occurrences(AggregationUnit::Site).await.unwrap();
//!     assert!(tuples.is_empty());
//! });
//! ```

#[cfg(not(any(feature = "sqlite-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// SQLite config is colocated with the repository implementation.
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteConfig;
#[cfg(not(feature = "sqlite-repo"))]
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    _private: (),
}

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteRepository;
pub use repository::{
    AnalyticsRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    SurveyRepository,
};
