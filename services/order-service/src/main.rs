use anyhow::Result;
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use common::AppConfig;
use messaging::OrderEventLogger;
use std::net::SocketAddr;
use tokio::signal;

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    init_telemetry(&TelemetryConfig::from_app_config("order-service", &config))?;

    tracing::info!("Starting order service...");
    tracing::info!(
        "Distributed tracing: {}",
        if config.enable_jaeger { "enabled" } else { "disabled" }
    );
    tracing::info!("Configuration:");
    tracing::info!("  Product service: {}", config.product_service.base_url);
    tracing::info!("  Redis URL: {}", config.cache.redis_url);
    tracing::info!("  Kafka brokers: {}", config.kafka.brokers);
    tracing::info!("  Order listing TTL: {} seconds", config.cache.order_listing_ttl_seconds);
    tracing::info!("  Local product memo: {}", config.product_service.local_memo);

    let state = AppState::connect(&config).await?;

    if config.kafka.enable_event_logger {
        let logger = OrderEventLogger::new(
            &config.kafka.brokers,
            &config.kafka.consumer_group,
            &config.kafka.topic,
        )?;
        tokio::spawn(logger.run());
    }

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Order service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    shutdown_telemetry();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
