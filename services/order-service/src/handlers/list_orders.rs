use axum::{
    extract::{Path, State},
    Json,
};
use domain::Order;
use tracing::{error, info};
use uuid::Uuid;

use super::{bad_request, order_error, ApiError};
use crate::state::AppState;

/// List all orders placed for a product
pub async fn list_orders_by_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let product_id = Uuid::parse_str(&product_id)
        .map_err(|_| bad_request(format!("Invalid product id: {}", product_id)))?;

    info!("Listing orders for product: {}", product_id);

    let orders = state
        .orders
        .get_orders_by_product_id(product_id)
        .await
        .map_err(|e| {
            error!("Failed to list orders for product {}: {}", product_id, e);
            order_error(e)
        })?;

    Ok(Json(orders))
}
