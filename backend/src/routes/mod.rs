//! Result types of the analysis engine and the paths they are served on.

pub mod diversity;
pub mod matrix;
pub mod statistics;
pub mod variables;
pub mod vegetation;

pub const HEALTH: &str = "/health";
pub const SPECIES_STATISTICS: &str = "/v1/species/{species_id}/statistics";
