//! Service layer between the record store and the HTTP handlers.
//!
//! Each service takes one snapshot read from an injected repository, runs
//! the pure engine in [`crate::analysis`] over it and returns the result or
//! its CSV rendering. Repository failures surface as
//! [`AnalysisError::DataAccess`](crate::analysis::AnalysisError::DataAccess).

pub mod community_matrix;
pub mod diversity;
pub mod species;
pub mod statistics;
pub mod variables;
pub mod vegetation;

pub use community_matrix::{build_community_matrix, community_matrix_csv};
pub use diversity::{diversity_csv, diversity_matrix_options, diversity_records};
pub use species::species_statistics;
pub use statistics::{correlate, regress, to_series};
pub use variables::{correlate_variables, paired_series, regress_variables, variable_table};
pub use vegetation::{vegetation_csv, vegetation_matrix};
