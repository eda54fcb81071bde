use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request to place an order for a single product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

impl CreateOrderRequest {
    pub fn new(product_id: Uuid, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}
