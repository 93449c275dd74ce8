//! formationd — the formation daemon.
//!
//! Single binary that assembles the formation subsystems:
//! - State store (redb) holding apps and releases
//! - Local stack engine applying formation patches
//! - Formation reconciler
//! - Event bus + event logger
//! - REST API
//!
//! # Usage
//!
//! ```text
//! formationd serve --config /etc/formationd.toml --port 8443
//! ```

mod config;
mod events;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use crate::config::DaemonConfig;
use crate::events::BroadcastEventSink;

/// Buffered events per subscriber before the logger starts lagging.
const EVENT_BUFFER: usize = 256;

#[derive(Parser)]
#[command(name = "formationd", about = "Formation daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the formation API backed by the local state store.
    Serve {
        /// Path to a formationd.toml config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for persistent state.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// CPU units offered by a single instance.
        #[arg(long)]
        instance_cpu: Option<i64>,

        /// Memory offered by a single instance.
        #[arg(long)]
        instance_memory: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,formationd=debug,formation=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            data_dir,
            instance_cpu,
            instance_memory,
        } => {
            let file_config = match config {
                Some(path) => DaemonConfig::from_file(&path)?,
                None => DaemonConfig::default(),
            };
            let config =
                file_config.with_overrides(port, data_dir, instance_cpu, instance_memory);
            run_serve(config).await
        }
    }
}

async fn run_serve(config: DaemonConfig) -> anyhow::Result<()> {
    info!("formation daemon starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("formation.redb");

    // ── Initialize subsystems ──────────────────────────────────

    let store = formation_state::StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let capacity = config.capacity();
    let event_bus = BroadcastEventSink::new(EVENT_BUFFER);
    let formations =
        formation_api::standalone_reconciler(store.clone(), capacity, Arc::new(event_bus.clone()));
    info!(
        instance_cpu = capacity.instance_cpu,
        instance_memory = capacity.instance_memory,
        "formation reconciler initialized"
    );

    // ── Background tasks ───────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let events_handle = tokio::spawn(events::log_events(event_bus.subscribe(), shutdown_rx));

    // ── API server ─────────────────────────────────────────────

    let router = formation_api::build_router(store, formations);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    let _ = events_handle.await;

    info!("formation daemon stopped");
    Ok(())
}
