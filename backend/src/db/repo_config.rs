//! Repository configuration file support.
//!
//! Reads `repository.toml`:
//!
//! ```toml
//! [repository]
//! type = "sqlite"
//!
//! [sqlite]
//! database_path = "data/ant_survey.db"
//! max_connections = 4
//! busy_timeout_ms = 5000
//! max_retries = 3
//! retry_delay_ms = 100
//! ```
//!
//! `REPOSITORY_TYPE` and `SQLITE_DATABASE_PATH` override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::db::SqliteConfig;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub sqlite: SqliteSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// SQLite connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSettings {
    #[serde(default)]
    pub database_path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            database_path: String::new(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_max_connections() -> u32 {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file, then apply
    /// environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a configuration document without touching the environment.
    pub fn parse(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading repository configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(repo_type) = std::env::var("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Ok(path) = std::env::var("SQLITE_DATABASE_PATH") {
            self.sqlite.database_path = path;
        }
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to a [`SqliteConfig`] if this is a SQLite configuration.
    #[cfg(feature = "sqlite-repo")]
    pub fn to_sqlite_config(&self) -> Result<Option<SqliteConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Sqlite {
            return Ok(None);
        }

        if self.sqlite.database_path.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "SQLite repository requires 'sqlite.database_path' setting",
            ));
        }

        Ok(Some(SqliteConfig {
            database_path: self.sqlite.database_path.clone(),
            max_connections: self.sqlite.max_connections,
            busy_timeout_ms: self.sqlite.busy_timeout_ms,
            max_retries: self.sqlite.max_retries,
            retry_delay_ms: self.sqlite.retry_delay_ms,
        }))
    }

    /// Convert to a [`SqliteConfig`] when the feature is disabled.
    #[cfg(not(feature = "sqlite-repo"))]
    pub fn to_sqlite_config(&self) -> Result<Option<SqliteConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type == RepositoryType::Sqlite {
            return Err(RepositoryError::configuration(
                "SQLite repository feature not enabled",
            ));
        }

        Ok(None)
    }
}
