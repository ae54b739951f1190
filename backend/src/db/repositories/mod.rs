//! Repository implementations.
//!
//! - `local`: in-memory store for unit tests, fixtures and local development
//! - `sqlite`: SQLite store with Diesel ORM (feature `sqlite-repo`)
pub mod local;
#[cfg(feature = "sqlite-repo")]
pub mod sqlite;

pub use local::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use sqlite::{SqliteConfig, SqliteRepository};
