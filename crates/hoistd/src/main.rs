//! hoistd — the hoist daemon.
//!
//! Admin sidecar for one supervised service. Assembles the artifact
//! store, the active pointer, the health prober, the supervisor
//! boundary, and the promotion workflow behind the REST API.
//!
//! # Usage
//!
//! ```text
//! hoistd serve --config /etc/hoist/hoist.toml
//! hoistd serve --port 4860 --builds-dir /usr/local/bin/feather-builds
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use hoist_api::{ApiState, build_router};
use hoist_core::HoistConfig;
use hoist_health::{HealthProber, PollPolicy, Probe};
use hoist_promote::{DeletionGuard, PromotionController};
use hoist_store::{ActivePointer, ArtifactStore};
use hoist_supervise::{Supervisor, SupervisorCtl};

#[derive(Parser)]
#[command(name = "hoistd", about = "hoist build-promotion daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the admin API server.
    Serve {
        /// Configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Builds directory (overrides the config file).
        #[arg(long)]
        builds_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hoistd=debug,hoist=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            builds_dir,
        } => run_serve(config, port, builds_dir).await,
    }
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    builds_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = match &config_path {
        Some(path) => HoistConfig::from_file(path)?,
        None => HoistConfig::default(),
    };
    if let Some(port) = port {
        config.api.port = port;
    }
    if let Some(dir) = builds_dir {
        config.store.builds_dir = dir;
    }

    info!(service = %config.service.name, "hoist daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let store = ArtifactStore::new(&config.store.builds_dir);
    store.ensure_dir()?;
    let pointer = ActivePointer::in_dir(&config.store.builds_dir);
    info!(builds_dir = %config.store.builds_dir.display(), "artifact store ready");

    let prober = HealthProber::new(
        config.health.address.clone(),
        config.health.endpoint.clone(),
        Duration::from_secs(config.health.timeout_secs),
    );
    let probe: Arc<dyn Probe> = Arc::new(prober);
    info!(address = %config.health.address, endpoint = %config.health.endpoint, "health prober ready");

    let supervisorctl = SupervisorCtl::new(
        config.service.name.clone(),
        config.service.supervisor_socket.clone(),
    );
    let supervisor: Arc<dyn Supervisor> = Arc::new(supervisorctl.clone());
    info!(socket = %config.service.supervisor_socket, "supervisor boundary ready");

    let policy = PollPolicy {
        interval: Duration::from_secs(config.health.poll_interval_secs),
        max_attempts: config.health.poll_attempts,
    };
    let controller = PromotionController::new(
        store.clone(),
        pointer.clone(),
        config.service.binary_path.clone(),
        supervisor.clone(),
        probe.clone(),
        policy,
    );
    let guard = DeletionGuard::new(store.clone(), pointer.clone());
    info!(
        binary = %config.service.binary_path.display(),
        attempts = policy.max_attempts,
        "promotion workflow ready"
    );

    // ── Start API server ───────────────────────────────────────

    let state = ApiState {
        store,
        pointer,
        controller,
        guard,
        probe,
        supervisor,
        supervisorctl,
        retain: config.store.retain,
        restart_settle: Duration::from_secs(config.health.restart_settle_secs),
    };
    let router = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    });

    server.await?;

    info!("hoist daemon stopped");
    Ok(())
}
