use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::metrics;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "order-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(metrics) => (StatusCode::OK, metrics),
        Err(e) => {
            tracing::error!("Failed to gather metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::from("Failed to gather metrics"))
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))

        // Orders
        .route("/api/v1/orders", post(handlers::create_order::handle))
        .route(
            "/api/v1/orders/product/:product_id",
            get(handlers::list_orders::list_orders_by_product_handler),
        )

        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
