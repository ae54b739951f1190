//! Repository factory for dependency injection.
//!
//! Picks a record store backend from runtime configuration and hands it out
//! as `Arc<dyn FullRepository>`.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::SqliteRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::SqliteConfig;

/// Record store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQLite + Diesel implementation
    Sqlite,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts `sqlite` (or `sqlite3`) and `local`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Reads `REPOSITORY_TYPE`. Without it, SQLite is chosen when
    /// `SQLITE_DATABASE_PATH` is set, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("SQLITE_DATABASE_PATH").is_ok() {
            Self::Sqlite
        } else {
            Self::Local
        }
    }
}

#[cfg(not(feature = "sqlite-repo"))]
fn sqlite_disabled() -> RepositoryError {
    RepositoryError::configuration("SQLite repository feature not enabled")
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use ant_survey::db::{RepositoryFactory, SurveyRepository};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = RepositoryFactory::create_local();
///     assert!(repo.health_check().await.unwrap());
/// });
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `sqlite_config` is required for [`RepositoryType::Sqlite`].
    pub async fn create(
        repo_type: RepositoryType,
        sqlite_config: Option<&SqliteConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let config = sqlite_config.ok_or_else(|| {
                        RepositoryError::configuration("SQLite repository requires SqliteConfig")
                    })?;
                    let repo = Self::create_sqlite(config).await?;
                    Ok(repo as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    let _ = sqlite_config;
                    Err(sqlite_disabled())
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Open a SQLite repository, running migrations.
    #[cfg(feature = "sqlite-repo")]
    pub async fn create_sqlite(config: &SqliteConfig) -> RepositoryResult<Arc<SqliteRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || SqliteRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    ///
    /// See [`RepositoryType::from_env`] for how the backend is chosen.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let config = SqliteConfig::from_env().map_err(RepositoryError::configuration)?;
                    let repo = Self::create_sqlite(&config).await?;
                    Ok(repo as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    Err(sqlite_disabled())
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create repository from a `repository.toml` file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from `repository.toml` in the standard locations.
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from a parsed configuration.
    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Sqlite => {
                let sqlite_config = config.to_sqlite_config()?;
                Self::create(RepositoryType::Sqlite, sqlite_config.as_ref()).await
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }
}

/// Builder for configuring repository creation.
///
/// ```
/// use ant_survey::db::{RepositoryBuilder, RepositoryType};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let repo = rt
///     .block_on(
///         RepositoryBuilder::new()
///             .repository_type(RepositoryType::Local)
///             .build(),
///     )
///     .unwrap();
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    sqlite_config: Option<SqliteConfig>,
}

impl RepositoryBuilder {
    /// Start from the backend selected by the environment.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            sqlite_config: None,
        }
    }

    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    pub fn sqlite_config(mut self, config: SqliteConfig) -> Self {
        self.sqlite_config = Some(config);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.repo_type = RepositoryType::from_env();

        if self.repo_type == RepositoryType::Sqlite {
            #[cfg(feature = "sqlite-repo")]
            {
                let config = SqliteConfig::from_env().map_err(RepositoryError::configuration)?;
                self.sqlite_config = Some(config);
            }
            #[cfg(not(feature = "sqlite-repo"))]
            {
                return Err(sqlite_disabled());
            }
        }

        Ok(self)
    }

    /// Load configuration from a TOML file.
    pub fn from_config_file<P: AsRef<Path>>(
        self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;
        self.with_repository_config(&repo_config)
    }

    /// Load configuration from `repository.toml` in the standard locations.
    pub fn from_default_config(self) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_default_location()?;
        self.with_repository_config(&repo_config)
    }

    fn with_repository_config(
        mut self,
        repo_config: &RepositoryConfig,
    ) -> Result<Self, RepositoryError> {
        self.repo_type = repo_config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        if self.repo_type == RepositoryType::Sqlite {
            self.sqlite_config = repo_config.to_sqlite_config()?;
        }
        Ok(self)
    }

    /// Build the repository instance.
    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        RepositoryFactory::create(self.repo_type, self.sqlite_config.as_ref()).await
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
