//! LineRelay gateway binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use relay_common::config::AppConfig;
use relay_common::db::create_pool;
use relay_common::settings::{FileSettingsSource, SettingsSource};
use relay_delivery::TelegramClient;
use relay_lines::{LineRegistry, StaticTelephonySource, TelephonySource, UnavailableTelephonySource};
use relay_pipeline::EventPipeline;
use relay_queue::{DispatchWorker, JobStore, network};

use relay_gateway::routes::create_router;
use relay_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("relay_gateway=info,relay_pipeline=info,relay_queue=info,relay_delivery=info,tower_http=info")
        }))
        .init();

    tracing::info!("LineRelay gateway starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Durable queue storage
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Line metadata comes from the host bridge when it grants access;
    // otherwise every lookup degrades to the registry's fallback lines.
    let source: Arc<dyn TelephonySource> = match &config.lines_path {
        Some(path) => Arc::new(StaticTelephonySource::from_file(path)?),
        None => {
            tracing::warn!("No line metadata configured, using fallback lines");
            Arc::new(UnavailableTelephonySource)
        }
    };
    let registry = Arc::new(LineRegistry::new(source));

    let store = JobStore::new(pool);
    let pipeline = Arc::new(EventPipeline::new(registry.clone(), store.clone()));

    let settings: Arc<dyn SettingsSource> = Arc::new(FileSettingsSource::new(&config.settings_path));
    let client = TelegramClient::new(&config.telegram_api_base)?;

    // Assume connectivity until the host reports otherwise.
    let (network_handle, network_watch) = network::channel(true);

    let worker = DispatchWorker::new(
        store.clone(),
        client,
        settings,
        network_watch,
        Duration::from_millis(config.dispatch_poll_interval_ms),
        config.dispatch_concurrency,
        config.max_delivery_attempts,
    );
    let worker_task = tokio::spawn(worker.run());

    // Build router
    let state = AppState::new(pipeline, registry, store, Arc::new(network_handle));
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway_port));
    tracing::info!("Gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        result = worker_task => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Dispatch worker exited with error");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Dispatch worker task failed");
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("LineRelay gateway stopped.");
    Ok(())
}
