use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to install Jaeger pipeline: {0}")]
    Jaeger(#[from] opentelemetry::trace::TraceError),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_level: String,
    /// `json` for structured output, anything else for human-readable lines
    pub log_format: String,
    pub jaeger_endpoint: Option<String>,
    pub enable_jaeger: bool,
}

impl TelemetryConfig {
    pub fn from_app_config(service_name: &str, config: &AppConfig) -> Self {
        Self {
            service_name: service_name.to_string(),
            log_level: config.log_level.clone(),
            log_format: config.log_format.clone(),
            jaeger_endpoint: config.jaeger_endpoint.clone(),
            enable_jaeger: config.enable_jaeger,
        }
    }

    fn json(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "order-service".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            jaeger_endpoint: None,
            enable_jaeger: false,
        }
    }
}

/// Install the global tracing subscriber, with Jaeger export when enabled
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = if config.json() {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    let otel_layer = if config.enable_jaeger {
        let endpoint = config
            .jaeger_endpoint
            .clone()
            .unwrap_or_else(|| "localhost:6831".to_string());
        let tracer = opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(&config.service_name)
            .with_endpoint(endpoint)
            .install_batch(opentelemetry_sdk::runtime::Tokio)?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        jaeger = config.enable_jaeger,
        "Telemetry initialized"
    );

    Ok(())
}

/// Flush pending spans before exit
pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}
