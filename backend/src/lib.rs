//! # Ant Survey Backend
//!
//! Analysis engine and record store for field ecology surveys of ant species.
//!
//! Survey data is organised in a three-level site hierarchy (parent site →
//! survey site → survey event). Each event holds per-species ant counts and
//! vegetation observations. This crate turns that relational data into
//! community matrices (site × species), ecological diversity indices and
//! correlation / regression statistics, and exposes them over a REST API.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) and identifier types
//! - [`models`]: Record store entities and analysis option enums
//! - [`routes`]: Result types produced by the analysis engine
//! - [`analysis`]: Pure, synchronous analysis engine (matrix, diversity, statistics)
//! - [`db`]: Record store repositories and persistence layer
//! - [`services`]: Orchestration of repository reads and engine computations
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod analysis;
pub mod api;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
