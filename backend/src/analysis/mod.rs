//! Analysis engine.
//!
//! Pure, synchronous functions over snapshots read from the record store:
//!
//! - [`matrix`]: occurrence tuples → community matrix
//! - [`vegetation`]: vegetation observations → vegetation matrix
//! - [`diversity`]: community matrix → per-row diversity indices
//! - [`statistics`]: correlation and polynomial regression
//! - [`export`]: delimited-text rendering of the above
//!
//! Nothing here performs I/O against the store or logs; callers in
//! [`crate::services`] fetch the snapshot and decide what to report.

pub mod distribution;
pub mod diversity;
pub mod error;
pub mod export;
pub mod matrix;
pub mod statistics;
pub mod vegetation;

pub use diversity::{compute_diversity, diversity_of_counts};
pub use error::{AnalysisError, AnalysisResult};
pub use matrix::build_matrix;
pub use statistics::{correlate, regress};
pub use vegetation::build_vegetation_matrix;
