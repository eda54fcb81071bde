use super::{DomainEvent, ORDER_CREATED};
use crate::models::order::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Announcement that an order was persisted. Never stored, only published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity_ordered: u32,
    pub timestamp: DateTime<Utc>,
}

impl OrderCreatedEvent {
    pub fn from_order(order: &Order, quantity_ordered: u32) -> Self {
        Self {
            order_id: order.id,
            product_id: order.product_id,
            quantity_ordered,
            timestamp: Utc::now(),
        }
    }
}

impl DomainEvent for OrderCreatedEvent {
    fn routing_key() -> &'static str {
        ORDER_CREATED
    }
}
