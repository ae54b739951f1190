//! Backend selection from the environment and from `repository.toml`.

mod support;

use std::io::Write;
use std::str::FromStr;

use ant_survey::db::{
    RepositoryBuilder, RepositoryConfig, RepositoryError, RepositoryFactory, RepositoryType,
};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("sqlite3").unwrap(), RepositoryType::Sqlite);

    let err = RepositoryType::from_str("postgres").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[("REPOSITORY_TYPE", None), ("SQLITE_DATABASE_PATH", None)],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_path() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("SQLITE_DATABASE_PATH", Some("/tmp/survey.db")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Sqlite),
    );
}

#[test]
fn test_explicit_type_wins_over_database_path() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("SQLITE_DATABASE_PATH", Some("/tmp/survey.db")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_config_file_with_env_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[repository]\ntype = \"sqlite\"\n\n[sqlite]\ndatabase_path = \"from_file.db\"\nmax_connections = 2"
    )
    .unwrap();

    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("SQLITE_DATABASE_PATH", None),
        ],
        || {
            let config = RepositoryConfig::from_file(file.path()).unwrap();
            assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
            assert_eq!(config.sqlite.database_path, "from_file.db");
            assert_eq!(config.sqlite.max_connections, 2);
            assert_eq!(config.sqlite.busy_timeout_ms, 5000);
        },
    );
}

#[test]
fn test_missing_config_file_is_configuration_error() {
    let err = RepositoryConfig::from_file("/nonexistent/repository.toml").unwrap_err();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_factory_from_local_config() {
    let config = RepositoryConfig::parse("[repository]\ntype = \"local\"\n").unwrap();
    let repo = RepositoryFactory::from_repository_config(&config)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_factory_rejects_unknown_type() {
    let config = RepositoryConfig::parse("[repository]\ntype = \"oracle\"\n").unwrap();
    let err = RepositoryFactory::from_repository_config(&config)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}

#[tokio::test]
async fn test_builder_local() {
    let repo = RepositoryBuilder::new()
        .repository_type(RepositoryType::Local)
        .build()
        .await
        .unwrap();
    assert!(repo.list_species(true).await.unwrap().is_empty());
}

#[cfg(feature = "sqlite-repo")]
#[tokio::test]
async fn test_sqlite_file_store_persists_between_opens() {
    use ant_survey::api::NewSpecies;
    use ant_survey::db::SqliteConfig;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.db");
    let config = SqliteConfig::with_path(path.to_string_lossy());

    {
        let repo = RepositoryFactory::create(RepositoryType::Sqlite, Some(&config))
            .await
            .unwrap();
        repo.create_species(&NewSpecies::new("Formica japonica"))
            .await
            .unwrap();
    }

    let reopened = RepositoryFactory::create(RepositoryType::Sqlite, Some(&config))
        .await
        .unwrap();
    let species = reopened.list_species(false).await.unwrap();
    assert_eq!(species.len(), 1);
    assert_eq!(species[0].scientific_name, "Formica japonica");
}
