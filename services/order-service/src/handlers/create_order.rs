use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use domain::{CreateOrderRequest, Order};
use tracing::{error, info, warn};
use validator::Validate;

use super::{bad_request, order_error, ApiError};
use crate::state::AppState;

/// Handle create order command
pub async fn handle(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected create order body: {}", e);
        bad_request(e.body_text())
    })?;

    info!(
        "Received create order for product {} (quantity {})",
        req.product_id, req.quantity
    );

    if let Err(e) = req.validate() {
        error!("Validation error: {}", e);
        return Err(bad_request(format!("Validation error: {}", e)));
    }

    let order = state.orders.create_order(&req).await.map_err(|e| {
        error!("Failed to create order for product {}: {}", req.product_id, e);
        order_error(e)
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}
