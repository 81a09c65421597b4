//! Station Relay server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use station_relay::adapters::{app_router, RouterOptions};
use station_relay::application::SessionCoordinator;
use station_relay::config::{AppConfig, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let settings = config.station.coordinator_settings()?;
    info!(
        admission_policy = ?settings.admission_policy,
        binary_relay = settings.binary_relay,
        strict_signaling = settings.strict_signaling,
        "Station configured"
    );
    let coordinator = Arc::new(SessionCoordinator::new(settings));

    let options = RouterOptions {
        outbound_buffer: config.station.outbound_buffer,
        heartbeat: config.station.heartbeat(),
        cors_origins: config.server.cors_origins_list(),
        api_rate_limit: config.server.api_rate_limit(),
    };
    info!(
        heartbeat_interval_secs = options.heartbeat.interval.as_secs(),
        heartbeat_timeout_secs = options.heartbeat.timeout.as_secs(),
        api_rate_limit = ?options.api_rate_limit,
        "Transport configured"
    );
    let app = app_router(coordinator.clone(), &options);

    let addr = config.server.resolve_addr().await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, host = %config.server.host, "Station relay listening");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!("HTTP server error: {}", e);
    }

    coordinator.shutdown().await;
    info!("Station relay stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level; JSON output in production.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C"); }
        () = terminate => { info!("Received SIGTERM"); }
    }
}
