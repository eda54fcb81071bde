pub mod order_events;

use serde::Serialize;

/// Routing key for order creation announcements
pub const ORDER_CREATED: &str = "order.created";

/// Trait for events announced to subscribers
pub trait DomainEvent: Serialize {
    /// Routing key the event is published under
    fn routing_key() -> &'static str;

    /// JSON body as sent over the broker
    fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
