mod cli;
mod telemetry;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use burrow_core::{KeyPolicy, Repository, Shortener};
use burrow_gateway::{App, AppState};
use burrow_idgen::IdGenerator;
use burrow_shortener::ShortenerService;
use burrow_storage::{ConnectOptions, InMemoryRepository, MySqlRepository};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    telemetry::init(config.log_format)?;

    let key_policy = KeyPolicy::from(config.key_policy);
    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        %key_policy,
        "starting gateway server"
    );

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => shortener(InMemoryRepository::new(key_policy))?,
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let options = ConnectOptions::builder()
                .max_attempts(config.connect_attempts)
                .query_timeout(Duration::from_millis(config.query_timeout_ms))
                .build();
            let repository = MySqlRepository::connect_with(mysql_dsn, key_policy, options)
                .await
                .context("failed to connect to mysql")?;
            if config.create_schema {
                repository
                    .create_schema()
                    .await
                    .context("failed to create mysql schema")?;
            }
            shortener(repository)?
        }
    };

    let state = AppState::new(shortener, config.public_base_url);
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server failed")?;

    info!("gateway stopped");
    Ok(())
}

fn shortener<R: Repository>(repository: R) -> anyhow::Result<Arc<dyn Shortener>> {
    let generator = IdGenerator::new().context("failed to start identifier generator")?;
    Ok(Arc::new(ShortenerService::new(repository, generator)))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
