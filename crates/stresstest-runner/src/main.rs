#![doc = include_str!("../README.md")]

mod runner;

use anyhow::Context;
use clap::Parser;
use runner::config::{CliArgs, RunnerConfig};
use runner::telemetry::init_telemetry;
use std::sync::Arc;
use stresstest::{
    ConnectionPool, FileSource, Fleet, IdentifierSource, Nato, TcpConnector, ThreadRandom,
};
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunnerConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let res = run(config).await;
    if let Err(e) = &res {
        tracing::error!("{e:#}");
    }
    providers.shutdown();
    res
}

async fn run(config: RunnerConfig) -> anyhow::Result<()> {
    let connector = TcpConnector::new(config.server.clone(), config.port);
    let pool = ConnectionPool::new(config.pool, connector)
        .await
        .with_context(|| {
            format!(
                "failed to create connection pool for {}:{}",
                config.server, config.port
            )
        })?;

    let mut source: Box<dyn IdentifierSource> = match &config.identifier_path {
        Some(path) => Box::new(
            FileSource::open(path)
                .with_context(|| format!("failed to read identifiers from {}", path.display()))?,
        ),
        None => Box::new(Nato::default()),
    };

    let mut fleet = Fleet::new(Arc::new(pool), config.fleet);
    if let Err(e) = fleet.spawn(&mut *source, ThreadRandom) {
        fleet.shutdown();
        fleet.wait().await;
        return Err(e).context("not enough distinct identifiers");
    }

    tokio::select! {
        () = fleet.wait() => {
            tracing::info!("Every application stopped, exiting");
        },
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping applications...");
            fleet.shutdown();
            if tokio::time::timeout(config.shutdown_timeout, fleet.wait()).await.is_err() {
                tracing::warn!(
                    outstanding = fleet.outstanding(),
                    timeout = ?config.shutdown_timeout,
                    "Applications did not stop in time"
                );
                fleet.pool().close();
            }
        },
    }

    Ok(())
}

fn log_startup_info(config: &RunnerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Sending to {}:{} with full config: {:#?}",
            config.server,
            config.port,
            config
        );
    } else {
        tracing::info!(
            "Sending to {}:{} with {} applications every {:?}",
            config.server,
            config.port,
            config.fleet.application_count,
            config.fleet.send_period
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            core::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
