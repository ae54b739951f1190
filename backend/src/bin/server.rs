//! Ant survey HTTP server.
//!
//! Opens the record store, builds the router and serves the analysis API.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store (default)
//! cargo run --bin ant-survey-server
//!
//! # SQLite store
//! SQLITE_DATABASE_PATH=data/ant_survey.db \
//!   cargo run --bin ant-survey-server --features sqlite-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `local` or `sqlite`
//! - `SQLITE_DATABASE_PATH`: SQLite file, selects the SQLite store when set
//! - `RUST_LOG`: Log level (default: info)
//!
//! Without `REPOSITORY_TYPE` or `SQLITE_DATABASE_PATH`, a `repository.toml`
//! in the standard locations is used when present.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ant_survey::db::{FullRepository, RepositoryFactory};
use ant_survey::http::{create_router, AppState};

async fn open_repository() -> anyhow::Result<Arc<dyn FullRepository>> {
    let configured_by_env =
        env::var("REPOSITORY_TYPE").is_ok() || env::var("SQLITE_DATABASE_PATH").is_ok();
    if !configured_by_env {
        match RepositoryFactory::from_default_config().await {
            Ok(repo) => return Ok(repo),
            Err(e) => warn!("No usable repository.toml ({}), using environment", e),
        }
    }
    RepositoryFactory::from_env()
        .await
        .context("failed to open the record store")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting ant survey HTTP server");

    let repository = open_repository().await?;
    if !repository.health_check().await? {
        anyhow::bail!("record store failed its health check");
    }
    info!("Repository initialized successfully");

    let app = create_router(AppState::new(repository));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", host, port))?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
