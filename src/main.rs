// main.rs
use smart_home_server::{config, handlers, metrics, models::AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: smart-home-server [1|2]
  1 - Start server instance 1 (port 50051)
  2 - Start server instance 2 (port 50052)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_home_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let instance_arg = match std::env::args().nth(1).as_deref() {
        None => None,
        Some("1") => Some(1),
        Some("2") => Some(2),
        Some(_) => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let settings = config::Settings::load(instance_arg)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    if settings.metrics.enabled {
        metrics::setup_metrics(settings.metrics.port)
            .map_err(|e| anyhow::anyhow!("Failed to setup metrics: {}", e))?;
        tracing::info!(port = settings.metrics.port, "Metrics exporter listening");
    }

    let shutdown = CancellationToken::new();
    let instance = settings.server.instance;
    let state = Arc::new(
        AppState::new(instance, settings.server.max_workers, shutdown.clone())
            .map_err(|e| anyhow::anyhow!("Failed to provision devices: {}", e))?,
    );

    let app = handlers::router(state.clone());

    let address = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind address: {}", e))?;

    tracing::info!(
        %instance,
        devices = state.device_count,
        max_workers = settings.server.max_workers,
        "Server {} started on {}",
        instance,
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    tracing::info!(%instance, "Server {} stopped", instance);
    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    let open = state.streams.entries();
    tracing::info!(monitor_streams = open.len(), "Shutting down, cancelling monitor streams");
    for (stream_id, entry) in open {
        tracing::debug!(%stream_id, device_id = %entry.device_id, "Cancelling monitor stream");
    }
    state.shutdown.cancel();
}
