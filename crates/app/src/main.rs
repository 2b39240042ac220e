mod cli;
mod config;
mod http;
mod jobs;
mod service;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{ConfigError, StoreKind};
use crate::http::HttpError;
use crate::jobs::JobError;
use crate::wiring::WiringError;
use envie_infra::db::run_migrations;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("db error: {0}")]
    Db(#[from] envie_infra::db::DbPoolError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("job error: {0}")]
    Jobs(#[from] JobError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let mut config = config::AppConfig::from_env()?;
    if let Some(store) = cli.store {
        config.store = store;
    }
    if cli.migrate && config.store != StoreKind::Postgres {
        return Err(AppError::InvalidCli(
            "--migrate requires the postgres store".to_string(),
        ));
    }

    let state = wiring::build_state(config).await?;
    if cli.migrate {
        if let Some(pool) = state.db.as_ref() {
            info!("applying migrations");
            run_migrations(pool).await?;
        }
    }
    info!(
        store = state.store.kind(),
        geocoder = state.geocoder.is_some(),
        "state ready"
    );

    let addr = state.config.http_addr;
    let http_state = state.clone();
    let api = tokio::spawn(async move { http::serve(addr, http_state).await });
    let refresh = jobs::snapshot_refresh_target(&state).map(|snapshot| {
        let job_state = state.clone();
        tokio::spawn(async move { jobs::start(job_state, snapshot).await })
    });

    let shutdown = shutdown_signal();
    match refresh {
        Some(refresh) => {
            tokio::select! {
                _ = shutdown => {
                    info!("shutdown signal received");
                }
                res = api => {
                    res??;
                }
                res = refresh => {
                    res??;
                }
            }
        }
        None => {
            tokio::select! {
                _ = shutdown => {
                    info!("shutdown signal received");
                }
                res = api => {
                    res??;
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
